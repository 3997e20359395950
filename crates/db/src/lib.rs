//! Catalog store for library items and the author/series entities their
//! metadata references.
//!
//! The store is key-addressed: items are written whole (upsert by id) and
//! entities are inserted in batches, never updated. Callers talk to it through
//! the [`CatalogStore`] trait so that the engine can be exercised against the
//! in-memory [`MockStore`] (behind the `mock` feature) in tests.
//!
//! # Layout
//! - `library_items`: one row per item, with its media and metadata flattened
//!   into columns. List-valued metadata (authors, series, tags, ...) is stored
//!   as compact JSON.
//! - `authors`, `series`: durable entities keyed by their generated id.

mod db;
pub mod error;
#[cfg(feature = "mock")]
mod mock;
mod models;
mod repo;
mod store;

pub use crate::db::Database;
#[cfg(feature = "mock")]
pub use crate::mock::MockStore;
pub use crate::repo::Repository;
pub use crate::store::CatalogStore;
use std::sync::Arc;

pub type StoreHandle = Arc<dyn CatalogStore + Send + Sync>;
