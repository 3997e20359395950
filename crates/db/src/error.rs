//! Store Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// An entity with the same id has already been created.
    #[display("entity already exists: {_0}")]
    AlreadyExists(#[error(not(source))] String),
    /// A stored value could not be converted to or from its model.
    #[display("invalid stored data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
    /// The store refused the write outright (used by test doubles).
    #[display("store unavailable")]
    Unavailable,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database | Self::Unavailable)
    }
}
