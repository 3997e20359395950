//! Persistence seam consumed by the update engine.

use crate::error::Result;
use async_trait::async_trait;
use folio_model::{Author, LibraryItem, Series};

/// Key-addressed persistence for catalog entries.
///
/// Implementations must make each batch insert all-or-nothing: either every
/// entity in the slice becomes durable, or none does.
///
/// # Examples
///
/// ```no_run
/// use folio_db::{CatalogStore, error::Result};
///
/// async fn title_of(store: &dyn CatalogStore, id: &str) -> Result<Option<String>> {
///     Ok(store.get_item(id).await?.map(|item| item.media.metadata.title))
/// }
/// ```
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch a single item by id.
    async fn get_item(&self, id: &str) -> Result<Option<LibraryItem>>;

    /// Write the full item, replacing any existing record with the same id.
    async fn upsert_item(&self, item: &LibraryItem) -> Result<()>;

    /// Insert new author entities in one batch.
    ///
    /// Returns [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) if any
    /// id is already taken, in which case nothing from the batch is written.
    async fn insert_authors(&self, authors: &[Author]) -> Result<()>;

    /// Insert new series entities in one batch, with the same guarantees as
    /// [`insert_authors()`](Self::insert_authors).
    async fn insert_series(&self, series: &[Series]) -> Result<()>;

    /// Fetch the authors with the given ids. Unknown ids are skipped, and the
    /// result order is unspecified.
    async fn get_authors(&self, ids: &[String]) -> Result<Vec<Author>>;

    /// Fetch the series with the given ids. Unknown ids are skipped, and the
    /// result order is unspecified.
    async fn get_series(&self, ids: &[String]) -> Result<Vec<Series>>;
}
