use crate::cover::CacheHandle;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use folio_model::{LibraryItem, MediaPatch};
use tracing::instrument;

/// Purges derived renders when an update removes an item's cover.
pub struct CacheInvalidator {
    cache: CacheHandle,
}
impl CacheInvalidator {
    pub fn new(cache: CacheHandle) -> Self {
        Self { cache }
    }

    /// Purge the item's renders iff it currently has a cover and `patch`
    /// explicitly clears it. Returns whether a purge happened.
    ///
    /// Must complete before the cleared `coverPath` is persisted, so readers
    /// never see a cover-less item whose old renders are still served.
    #[instrument(skip_all, fields(item = %item.id))]
    pub async fn maybe_invalidate<A, S>(&self, item: &LibraryItem, patch: Option<&MediaPatch<A, S>>) -> Result<bool> {
        let removes = patch.is_some_and(MediaPatch::removes_cover);
        if !removes || !item.media.has_cover() {
            return Ok(false);
        }
        let removed = self.cache.purge(&item.id).await.or_raise(|| ErrorKind::Cache)?;
        tracing::info!(removed, "cover removed, purged cached renders");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::tests::CountingCache;
    use folio_model::{Media, Metadata};
    use rstest::rstest;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn item(cover_path: Option<&str>) -> LibraryItem {
        let media = Media {
            cover_path: cover_path.map(str::to_string),
            tags: vec![],
            metadata: Metadata::new("Title"),
        };
        LibraryItem::new("it1", "lib1", "/books/title", media)
    }

    #[rstest]
    #[case::null_clears(Some("/covers/it1.jpg"), r#"{"coverPath":null}"#, true)]
    #[case::empty_clears(Some("/covers/it1.jpg"), r#"{"coverPath":""}"#, true)]
    #[case::omitted(Some("/covers/it1.jpg"), r#"{"tags":["x"]}"#, false)]
    #[case::replaced(Some("/covers/it1.jpg"), r#"{"coverPath":"/covers/other.jpg"}"#, false)]
    #[case::already_empty(None, r#"{"coverPath":null}"#, false)]
    #[case::already_blank(Some(""), r#"{"coverPath":""}"#, false)]
    #[tokio::test]
    async fn test_maybe_invalidate(#[case] current: Option<&str>, #[case] payload: &str, #[case] expected: bool) {
        let cache = Arc::new(CountingCache::default());
        let invalidator = CacheInvalidator::new(cache.clone());
        let patch: MediaPatch = serde_json::from_str(payload).unwrap();
        let purged = invalidator.maybe_invalidate(&item(current), Some(&patch)).await.unwrap();
        assert_eq!(purged, expected);
        assert_eq!(cache.purges.load(Ordering::SeqCst), usize::from(expected));
    }

    #[tokio::test]
    async fn test_no_media_patch() {
        let cache = Arc::new(CountingCache::default());
        let invalidator = CacheInvalidator::new(cache.clone());
        let purged = invalidator
            .maybe_invalidate::<(), ()>(&item(Some("/covers/it1.jpg")), None)
            .await
            .unwrap();
        assert!(!purged);
        assert_eq!(cache.purges.load(Ordering::SeqCst), 0);
    }
}
