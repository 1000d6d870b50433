use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong across the public surface.
///
/// Codec failures carry the collaborator's diagnostic string verbatim so a
/// caller sees the same message the library itself produced.
/// [`Error::InsufficientBuffer`] is its own variant, not a message, so a
/// caller can match on it and retry with a larger capacity.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A caller-supplied value failed validation before any work was
    /// dispatched. Never delivered through a [`Submission`](crate::Submission).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The input does not start with a decodable Zstandard frame header.
    #[error("malformed frame header: {0}")]
    MalformedHeader(String),

    /// The codec reported a failure while compressing.
    #[error("compression failed: {0}")]
    Compression(String),

    /// The codec reported a failure while decompressing.
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// The destination capacity was too small for the decompressed frame.
    /// Retry with a larger capacity via
    /// [`decompress_with_capacity`](crate::decompress_with_capacity).
    #[error("destination capacity {capacity} too small for decompressed frame")]
    InsufficientBuffer { capacity: usize },

    /// The worker pool could not settle the task (queue closed mid-submit or
    /// a worker died before replying).
    #[error("worker pool failure: {0}")]
    Pool(String),
}
