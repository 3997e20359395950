//! Library Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use folio_model::EntityKind;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a failed operation.
///
/// ### Outcomes surfaced to the caller
/// - [`ErrorKind::PermissionDenied`]
/// - [`ErrorKind::NotFound`]
/// - [`ErrorKind::MalformedReference`]
/// - [`ErrorKind::TooLarge`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Persistence`]
/// - [`ErrorKind::Cache`]
/// - [`ErrorKind::Storage`]
/// - [`ErrorKind::Render`]
/// - [`ErrorKind::Notify`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The actor lacks the capability for the requested operation. Raised
    /// before any side effect.
    #[display("permission denied")]
    PermissionDenied,
    /// The item, or the cover it should have, does not exist.
    #[display("not found")]
    NotFound,
    /// An inline creation request lacks the attributes needed to build the
    /// entity.
    #[display("malformed {_0} reference")]
    MalformedReference(#[error(not(source))] EntityKind),
    /// The requested cover size exceeds the renderer's maximum dimension.
    #[display("requested cover size is too large")]
    TooLarge,
    /// The catalog store rejected a read or write.
    #[display("persistence failure")]
    Persistence,
    /// The derived cover cache could not be read, written or purged.
    #[display("cover cache failure")]
    Cache,
    /// The authoritative cover image could not be read.
    #[display("cover storage failure")]
    Storage,
    #[display("cover render failure")]
    Render,
    /// A change notification could not be published.
    #[display("notification failure")]
    Notify,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence | Self::Cache | Self::Storage | Self::Notify)
    }
}
