//! Byte storage for cover images.
//!
//! Two roots are involved when serving covers: the authoritative source images
//! referenced by each item's `coverPath`, and the cache of derived renders.
//! Both are accessed through the same [`StorageBackend`] interface so that the
//! engine can be tested against the in-memory
//! [`MockBackend`](backend::MockBackend) (behind the `mock` feature).

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::FileInfo;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
