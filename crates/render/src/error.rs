//! Render Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A render error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The source image could not be decoded; the stored cover is corrupt or
    /// in a format this build cannot read.
    #[display("source image could not be decoded")]
    Decode,
    /// The requested size would produce a render larger than the configured
    /// maximum dimension; ask for something smaller.
    #[display("render of {width}x{height} exceeds the maximum dimension of {max}")]
    TooLarge { width: u64, height: u64, max: u32 },
    #[display("could not encode {_0} output")]
    Encode(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
