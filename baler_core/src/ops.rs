//! The public operations, over a shared process-wide pool.
//!
//! These are plain exported functions, no handle to thread through caller
//! code, backed by a [`WorkerPool`] built lazily on first use and sized to
//! the machine. Callers that want their own pool (a different size, or an
//! isolated queue) use the same methods on [`WorkerPool`] directly.
//!
//! Validation happens here, synchronously, before any task exists: an
//! invalid argument is an immediate `Err`, never a settled future. Header
//! parsing is also synchronous: it reads a few dozen bytes at most, which
//! is not worth a trip through the pool.

use std::sync::OnceLock;

use crate::codec::CompressionLevel;
use crate::error::Result;
use crate::frame::{self, FrameHeader};
use crate::pool::{Submission, WorkerPool};

static DEFAULT_POOL: OnceLock<WorkerPool> = OnceLock::new();

fn default_pool() -> &'static WorkerPool {
    DEFAULT_POOL.get_or_init(WorkerPool::with_default_size)
}

/// Compress `data` at `level` on the shared pool.
///
/// The slice is copied once into the task, so the caller's buffer can be
/// dropped or mutated immediately. Use [`CompressionLevel::DEFAULT`] (3)
/// when in doubt; the codec rejects unsupported levels through the future.
pub fn compress(data: &[u8], level: CompressionLevel) -> Submission {
    default_pool().compress(data, level)
}

/// Decompress `data` on the shared pool, sizing the output automatically:
/// the frame's declared content size when present, a doubling growth loop
/// otherwise.
pub fn decompress(data: &[u8]) -> Submission {
    default_pool().decompress(data)
}

/// Decompress `data` into at most `capacity` bytes on the shared pool.
///
/// No automatic growth: a capacity short of the true size settles the
/// future with [`Error::InsufficientBuffer`](crate::Error::InsufficientBuffer),
/// never a truncated result.
pub fn decompress_with_capacity(data: &[u8], capacity: usize) -> Submission {
    default_pool().decompress_with_capacity(data, capacity)
}

/// Decode the frame header at the start of `data` without decompressing.
///
/// Synchronous; returns the record directly, not a future.
pub fn parse_frame_header(data: &[u8]) -> Result<FrameHeader> {
    frame::parse(data)
}
