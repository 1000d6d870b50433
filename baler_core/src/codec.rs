use std::str::FromStr;

use zstd::zstd_safe;

use crate::error::{Error, Result};

/// Default compression level when the caller does not pick one.
pub const DEFAULT_LEVEL: i32 = 3;

/// Zstandard compression level: higher levels spend more CPU for smaller
/// output, and negative levels trade ratio for raw speed.
///
/// Any `i32` is accepted at construction; whether a level is actually
/// supported is the codec's call, and [`compress`] rejects unsupported
/// values against the range the codec advertises. Conversions from wider
/// integers or strings fail with [`Error::InvalidArgument`] when the value
/// is not representable as an `i32` at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(i32);

impl CompressionLevel {
    pub const DEFAULT: Self = CompressionLevel(DEFAULT_LEVEL);

    pub fn new(level: i32) -> Self {
        Self(level)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for CompressionLevel {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self> {
        i32::try_from(raw).map(Self).map_err(|_| {
            Error::InvalidArgument(format!(
                "compression level {raw} is not representable as a 32-bit integer"
            ))
        })
    }
}

impl FromStr for CompressionLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw: i64 = s
            .parse()
            .map_err(|_| Error::InvalidArgument(format!("compression level '{s}' is not numeric")))?;
        Self::try_from(raw)
    }
}

/// Exact upper bound on compressed size for any input of `input_len` bytes,
/// at any level. Never exceeded by the real result.
pub fn compress_bound(input_len: usize) -> usize {
    zstd_safe::compress_bound(input_len)
}

/// Compress `input` into a single self-contained Zstandard frame.
///
/// Out-of-range levels fail here rather than at the raw codec call: current
/// zstd silently clamps a level like 999999 to its maximum instead of
/// rejecting it.
pub fn compress(input: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    let supported = zstd::compression_level_range();
    if !supported.contains(&level.get()) {
        return Err(Error::Compression(format!(
            "compression level {} outside supported range {}..={}",
            level.get(),
            supported.start(),
            supported.end()
        )));
    }
    zstd::bulk::compress(input, level.get()).map_err(|e| Error::Compression(e.to_string()))
}

/// Decompress a single frame into a buffer of at most `capacity` bytes.
///
/// The returned vector holds exactly the bytes produced, which may be fewer
/// than `capacity`. A destination-too-small failure comes back as
/// [`Error::InsufficientBuffer`] so sizing policy (or the caller) can retry
/// with more room; every other codec failure is [`Error::Decompression`].
pub fn decompress(input: &[u8], capacity: usize) -> Result<Vec<u8>> {
    zstd::bulk::decompress(input, capacity).map_err(|e| {
        let msg = e.to_string();
        if msg.contains("too small") {
            Error::InsufficientBuffer { capacity }
        } else {
            Error::Decompression(msg)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_at_default_level() {
        let input = b"the quick brown fox jumps over the lazy dog. ".repeat(50);
        let frame = compress(&input, CompressionLevel::DEFAULT).unwrap();
        assert!(frame.len() < input.len());
        let back = decompress(&frame, input.len()).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn empty_input_produces_nonempty_frame() {
        let frame = compress(&[], CompressionLevel::new(1)).unwrap();
        assert!(!frame.is_empty(), "format overhead alone should be present");
        assert!(decompress(&frame, 0).unwrap().is_empty());
    }

    #[test]
    fn bound_is_sufficient() {
        let input = vec![0xABu8; 10_000];
        let frame = compress(&input, CompressionLevel::new(19)).unwrap();
        assert!(frame.len() <= compress_bound(input.len()));
    }

    #[test]
    fn far_out_of_range_level_is_rejected() {
        let err = compress(b"data", CompressionLevel::new(999_999)).unwrap_err();
        assert!(matches!(err, Error::Compression(_)), "got {err:?}");
        assert!(err.to_string().contains("999999"));
    }

    #[test]
    fn short_capacity_is_distinguishable() {
        let input = vec![7u8; 4096];
        let frame = compress(&input, CompressionLevel::DEFAULT).unwrap();
        let err = decompress(&frame, input.len() - 1).unwrap_err();
        assert!(matches!(err, Error::InsufficientBuffer { capacity } if capacity == 4095));
    }

    #[test]
    fn garbage_input_is_a_decompression_error() {
        let err = decompress(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x11, 0x22, 0x33], 1024).unwrap_err();
        assert!(matches!(err, Error::Decompression(_)), "got {err:?}");
    }

    #[test]
    fn level_conversions() {
        assert_eq!(CompressionLevel::try_from(5i64).unwrap().get(), 5);
        assert!(matches!(
            CompressionLevel::try_from(i64::MAX),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!("9".parse::<CompressionLevel>().unwrap().get(), 9);
        assert!(matches!(
            "fast".parse::<CompressionLevel>(),
            Err(Error::InvalidArgument(_))
        ));
    }
}
