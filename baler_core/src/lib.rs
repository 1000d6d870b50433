//! Pooled asynchronous Zstandard codec.
//!
//! Three operations: [`compress`] and [`decompress`] run on a worker pool
//! and hand back a one-shot [`Submission`] future; [`parse_frame_header`]
//! decodes a frame's metadata synchronously without decompressing it.

pub mod codec;
pub mod error;
pub mod frame;
pub mod ops;
pub mod pool;
pub mod sizing;

pub use codec::{CompressionLevel, DEFAULT_LEVEL};
pub use error::{Error, Result};
pub use frame::{ContentSize, FrameHeader, FrameType};
pub use ops::{compress, decompress, decompress_with_capacity, parse_frame_header};
pub use pool::{Submission, WorkerPool};
