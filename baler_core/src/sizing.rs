//! Output-buffer sizing policy.
//!
//! Compression is the easy direction: the codec publishes an exact upper
//! bound for any input length, so one allocation always suffices.
//!
//! Decompression has no such bound without looking at the frame. The policy
//! here reads the frame header first: a declared content size becomes an
//! exact capacity; a frame written without one starts from a guess derived
//! from the input length and doubles on [`Error::InsufficientBuffer`] until
//! [`MAX_AUTO_CAPACITY`]. An unparseable header also gets the guess path so
//! the decoder, not the sizing layer, produces the real diagnostic.

use crate::codec;
use crate::error::{Error, Result};
use crate::frame::{self, ContentSize};

/// Starting guess: `input_len * GUESS_FACTOR`, at least [`MIN_GUESS`].
const GUESS_FACTOR: usize = 4;

/// Floor for the starting guess, so tiny inputs don't thrash the loop.
const MIN_GUESS: usize = 64 * 1024;

/// Ceiling for automatic capacity growth. Past this, the operation fails
/// with [`Error::InsufficientBuffer`] and the caller escalates to
/// [`decompress_with_capacity`](crate::decompress_with_capacity).
pub const MAX_AUTO_CAPACITY: usize = 1 << 30;

/// Capacity plan for decoding one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecodeCapacity {
    /// The frame declares its decompressed size; allocate exactly that.
    Exact(usize),
    /// No declared size; start here and grow.
    Guess(usize),
}

pub(crate) fn plan(input: &[u8]) -> DecodeCapacity {
    match frame::parse(input) {
        Ok(header) => match header.content_size {
            ContentSize::Known(n) => {
                // A hostile header can declare an absurd size; automatic
                // sizing never allocates past the ceiling, and the resulting
                // InsufficientBuffer tells the caller to size explicitly.
                let capacity = usize::try_from(n).unwrap_or(usize::MAX).min(MAX_AUTO_CAPACITY);
                DecodeCapacity::Exact(capacity)
            }
            ContentSize::Unknown => DecodeCapacity::Guess(initial_guess(input.len())),
        },
        Err(_) => DecodeCapacity::Guess(initial_guess(input.len())),
    }
}

fn initial_guess(input_len: usize) -> usize {
    input_len
        .saturating_mul(GUESS_FACTOR)
        .clamp(MIN_GUESS, MAX_AUTO_CAPACITY)
}

/// Decode `input` with automatically-sized output.
///
/// Exact plans make a single attempt: with a truthful header the capacity
/// cannot be short, so a failure is a real decode error. Guess plans retry
/// with doubled capacity while the codec keeps reporting the destination
/// too small.
pub(crate) fn decompress_auto(input: &[u8]) -> Result<Vec<u8>> {
    match plan(input) {
        DecodeCapacity::Exact(capacity) => codec::decompress(input, capacity),
        DecodeCapacity::Guess(mut capacity) => loop {
            match codec::decompress(input, capacity) {
                Err(Error::InsufficientBuffer { .. }) if capacity < MAX_AUTO_CAPACITY => {
                    capacity = capacity.saturating_mul(2).min(MAX_AUTO_CAPACITY);
                }
                other => break other,
            }
        },
    }
}
