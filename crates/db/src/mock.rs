//! In-memory catalog store for testing.

use crate::error::{ErrorKind, Result};
use crate::store::CatalogStore;
use async_trait::async_trait;
use folio_model::{Author, LibraryItem, Series};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory [`CatalogStore`] for testing.
///
/// Keeps everything in maps behind [`RwLock`]s and counts writes, so tests can
/// assert not only on the resulting state but also on how many round trips
/// the engine made (for example, that an unchanged item was never written).
///
/// # Examples
///
/// ```
/// use folio_db::{CatalogStore, MockStore};
/// use folio_model::{LibraryItem, Media};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MockStore::with_items([LibraryItem::new("it1", "lib1", "/books/one", Media::default())]);
/// assert!(store.get_item("it1").await?.is_some());
/// assert_eq!(store.upsert_count(), 0);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MockStore {
    items: RwLock<HashMap<String, LibraryItem>>,
    authors: RwLock<HashMap<String, Author>>,
    series: RwLock<HashMap<String, Series>>,
    upserts: AtomicUsize,
    author_batches: AtomicUsize,
    series_batches: AtomicUsize,
    fail_upserts: AtomicBool,
}

impl MockStore {
    /// Create a mock store pre-populated with items.
    pub fn with_items(items: impl IntoIterator<Item = LibraryItem>) -> Self {
        let items = items.into_iter().map(|item| (item.id.clone(), item)).collect();
        Self {
            items: RwLock::new(items),
            ..Self::default()
        }
    }

    /// Pre-populate existing author entities.
    pub fn with_authors(mut self, authors: impl IntoIterator<Item = Author>) -> Self {
        self.authors
            .get_mut()
            .extend(authors.into_iter().map(|author| (author.id.clone(), author)));
        self
    }

    /// Pre-populate existing series entities.
    pub fn with_series(mut self, series: impl IntoIterator<Item = Series>) -> Self {
        self.series
            .get_mut()
            .extend(series.into_iter().map(|entry| (entry.id.clone(), entry)));
        self
    }

    /// Make every subsequent [`upsert_item()`](CatalogStore::upsert_item) fail
    /// with [`ErrorKind::Unavailable`].
    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    /// Number of successful item writes.
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    /// Number of successful author batch inserts.
    pub fn author_batches(&self) -> usize {
        self.author_batches.load(Ordering::SeqCst)
    }

    /// Number of successful series batch inserts.
    pub fn series_batches(&self) -> usize {
        self.series_batches.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored author.
    pub async fn authors(&self) -> Vec<Author> {
        self.authors.read().await.values().cloned().collect()
    }

    /// Snapshot of every stored series.
    pub async fn series(&self) -> Vec<Series> {
        self.series.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl CatalogStore for MockStore {
    async fn get_item(&self, id: &str) -> Result<Option<LibraryItem>> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn upsert_item(&self, item: &LibraryItem) -> Result<()> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::Unavailable);
        }
        self.items.write().await.insert(item.id.clone(), item.clone());
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_authors(&self, authors: &[Author]) -> Result<()> {
        if authors.is_empty() {
            return Ok(());
        }
        let mut guard = self.authors.write().await;
        if let Some(taken) = authors.iter().find(|author| guard.contains_key(&author.id)) {
            exn::bail!(ErrorKind::AlreadyExists(taken.id.clone()));
        }
        guard.extend(authors.iter().map(|author| (author.id.clone(), author.clone())));
        self.author_batches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_series(&self, series: &[Series]) -> Result<()> {
        if series.is_empty() {
            return Ok(());
        }
        let mut guard = self.series.write().await;
        if let Some(taken) = series.iter().find(|entry| guard.contains_key(&entry.id)) {
            exn::bail!(ErrorKind::AlreadyExists(taken.id.clone()));
        }
        guard.extend(series.iter().map(|entry| (entry.id.clone(), entry.clone())));
        self.series_batches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_authors(&self, ids: &[String]) -> Result<Vec<Author>> {
        let guard = self.authors.read().await;
        Ok(ids.iter().filter_map(|id| guard.get(id).cloned()).collect())
    }

    async fn get_series(&self, ids: &[String]) -> Result<Vec<Series>> {
        let guard = self.series.read().await;
        Ok(ids.iter().filter_map(|id| guard.get(id).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{Media, timestamp};

    #[tokio::test]
    async fn test_counts_writes() {
        let store = MockStore::default();
        store
            .upsert_item(&LibraryItem::new("it1", "lib1", "/a", Media::default()))
            .await
            .unwrap();
        assert_eq!(store.upsert_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_upserts() {
        let store = MockStore::default();
        store.fail_upserts(true);
        let err = store
            .upsert_item(&LibraryItem::new("it1", "lib1", "/a", Media::default()))
            .await
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unavailable));
        assert_eq!(store.upsert_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_batch_is_rejected_whole() {
        let now = timestamp::now();
        let store = MockStore::default().with_authors([Author::new("aut_1", "A", now)]);
        let err = store
            .insert_authors(&[Author::new("aut_2", "B", now), Author::new("aut_1", "C", now)])
            .await
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        assert_eq!(store.authors().await.len(), 1);
        assert_eq!(store.author_batches(), 0);
    }
}
