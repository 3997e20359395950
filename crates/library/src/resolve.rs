//! Reference reconciliation.
//!
//! Payload metadata may reference authors and series that don't exist yet by
//! giving them a placeholder id. Resolution turns every such entry into a new
//! durable entity with a generated id and rewrites the list to point at it,
//! preserving order. Existing references pass through untouched.

use crate::error::{ErrorKind, Result};
use crate::notify::{Notification, NotifierHandle, publish_best_effort};
use exn::ResultExt;
use folio_db::StoreHandle;
use folio_model::{AuthorRef, MetadataPatch, Reference, Referent, ResolvedMetadataPatch, SeriesRef, timestamp};
use std::collections::HashMap;
use time::UtcDateTime;
use tracing::instrument;

/// The outcome of planning one reference list.
#[derive(Debug, Clone)]
pub struct Resolution<R: Referent> {
    /// The rewritten list, same length and order as the input.
    pub refs: Vec<R>,
    /// Entities to create, one per distinct placeholder.
    pub created: Vec<R::Entity>,
}

/// Plan the resolution of a reference list without touching any store.
///
/// A placeholder repeated within the list maps to a single new entity, and
/// every repetition must carry the same attributes. Fails with
/// [`MalformedReference`](ErrorKind::MalformedReference) if any pending entry
/// lacks the attributes to build its entity or contradicts an earlier entry
/// for the same placeholder, in which case nothing should be created.
///
/// ```
/// use folio_library::resolve::plan;
/// use folio_model::{AuthorRef, Reference, Referent, timestamp};
///
/// let refs = vec![
///     AuthorRef::classify("auth1".into(), Some("A".into()), None),
///     AuthorRef::classify("new-1".into(), Some("B".into()), None),
/// ];
/// let resolution = plan(refs, timestamp::now()).unwrap();
/// assert_eq!(resolution.created.len(), 1);
/// assert_eq!(resolution.refs[0].id, "auth1");
/// assert_eq!(resolution.refs[1].id, resolution.created[0].id);
/// ```
pub fn plan<R: Referent>(references: Vec<Reference<R>>, now: UtcDateTime) -> Result<Resolution<R>> {
    let mut generated: HashMap<String, (String, R::Draft)> = HashMap::new();
    let mut refs = Vec::with_capacity(references.len());
    let mut created = Vec::new();
    for reference in references {
        let pending = match reference {
            Reference::Existing(existing) => {
                refs.push(existing);
                continue;
            },
            Reference::Pending(pending) => pending,
        };
        let (id, fresh) = match generated.get(&pending.placeholder) {
            Some((_, draft)) if *draft != pending.draft => {
                tracing::debug!(kind = %R::KIND, placeholder = %pending.placeholder, "placeholder repeated with conflicting attributes");
                exn::bail!(ErrorKind::MalformedReference(R::KIND));
            },
            Some((id, _)) => (id.clone(), false),
            None => {
                let id = R::KIND.generate_id();
                generated.insert(pending.placeholder.clone(), (id.clone(), pending.draft.clone()));
                (id, true)
            },
        };
        let Some((entity, resolved)) = R::materialize(&pending.draft, id, now) else {
            tracing::debug!(kind = %R::KIND, placeholder = %pending.placeholder, "placeholder lacks a name");
            exn::bail!(ErrorKind::MalformedReference(R::KIND));
        };
        if fresh {
            created.push(entity);
        }
        refs.push(resolved);
    }
    Ok(Resolution { refs, created })
}

fn plan_list<R: Referent>(list: Option<Vec<Reference<R>>>, now: UtcDateTime) -> Result<Option<Resolution<R>>> {
    list.map(|references| plan(references, now)).transpose()
}

/// Materializes placeholder references in metadata payloads.
pub struct ReferenceResolver {
    store: StoreHandle,
    notifier: NotifierHandle,
}
impl ReferenceResolver {
    pub fn new(store: StoreHandle, notifier: NotifierHandle) -> Self {
        Self { store, notifier }
    }

    /// Resolve both reference lists of `patch`.
    ///
    /// Both lists are planned before anything is written, so a malformed
    /// placeholder in either creates nothing. New authors are inserted in one
    /// batch and announced, then new series likewise. A series insert failure
    /// leaves the authors of the same request in place; that is logged.
    #[instrument(skip_all)]
    pub async fn resolve(&self, mut patch: MetadataPatch) -> Result<ResolvedMetadataPatch> {
        let now = timestamp::now();
        let authors = plan_list::<AuthorRef>(patch.authors.take(), now)?;
        let series = plan_list::<SeriesRef>(patch.series.take(), now)?;

        let new_authors = authors.as_ref().map_or(0, |resolution| resolution.created.len());
        if let Some(resolution) = &authors
            && !resolution.created.is_empty()
        {
            self.store.insert_authors(&resolution.created).await.or_raise(|| ErrorKind::Persistence)?;
            tracing::info!(count = new_authors, "created authors from placeholders");
            publish_best_effort(&self.notifier, Notification::AuthorsAdded(resolution.created.clone())).await;
        }
        if let Some(resolution) = &series
            && !resolution.created.is_empty()
        {
            if let Err(err) = self.store.insert_series(&resolution.created).await {
                if new_authors > 0 {
                    tracing::warn!(
                        authors = new_authors,
                        error = %err,
                        "series creation failed after authors were created; authors are kept"
                    );
                }
                return Err(err).or_raise(|| ErrorKind::Persistence);
            }
            tracing::info!(count = resolution.created.len(), "created series from placeholders");
            publish_best_effort(&self.notifier, Notification::SeriesAdded(resolution.created.clone())).await;
        }

        Ok(patch.with_references(authors.map(|r| r.refs), series.map(|r| r.refs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use async_trait::async_trait;
    use folio_db::error::{ErrorKind as DbErrorKind, Result as DbResult};
    use folio_db::{CatalogStore, MockStore};
    use folio_model::{Author, EntityKind, LibraryItem, Series, is_placeholder};
    use std::sync::Arc;

    fn author(id: &str, name: Option<&str>) -> Reference<AuthorRef> {
        AuthorRef::classify(id.to_string(), name.map(str::to_string), None)
    }

    fn series(id: &str, name: Option<&str>, sequence: Option<&str>) -> Reference<SeriesRef> {
        SeriesRef::classify(id.to_string(), name.map(str::to_string), sequence.map(str::to_string))
    }

    fn resolver(store: Arc<MockStore>) -> (ReferenceResolver, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (ReferenceResolver::new(store, notifier.clone()), notifier)
    }

    #[test]
    fn test_plan_preserves_order_and_existing() {
        let resolution = plan(
            vec![author("new-a", Some("First")), author("auth1", Some("A")), author("new-b", Some("Last"))],
            timestamp::now(),
        )
        .unwrap();
        let names: Vec<_> = resolution.refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First", "A", "Last"]);
        assert_eq!(resolution.refs[1], AuthorRef::new("auth1", "A"));
        assert_eq!(resolution.created.len(), 2);
        assert!(resolution.refs.iter().all(|r| !is_placeholder(&r.id)));
    }

    #[test]
    fn test_plan_repeated_placeholder_creates_once() {
        let resolution = plan(vec![author("new-1", Some("B")), author("new-1", Some("B"))], timestamp::now()).unwrap();
        assert_eq!(resolution.created.len(), 1);
        assert_eq!(resolution.refs[0].id, resolution.refs[1].id);
    }

    #[test]
    fn test_plan_rejects_conflicting_repeats() {
        let err = plan(vec![author("new-1", Some("B")), author("new-1", Some("C"))], timestamp::now()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedReference(EntityKind::Author)));

        let err = plan(
            vec![series("new-s", Some("Saga"), Some("1")), series("new-s", Some("Saga"), Some("2"))],
            timestamp::now(),
        )
        .unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedReference(EntityKind::Series)));
    }

    #[test]
    fn test_plan_series_sequence_stays_on_reference() {
        let resolution = plan(vec![series("new-s", Some("Saga"), Some("3"))], timestamp::now()).unwrap();
        assert_eq!(resolution.refs[0].sequence.as_deref(), Some("3"));
        assert_eq!(resolution.created[0].name, "Saga");
        assert!(resolution.created[0].id.starts_with("ser_"));
    }

    #[test]
    fn test_plan_rejects_nameless_placeholder() {
        let err = plan(vec![author("new-1", Some("B")), author("new-2", None)], timestamp::now()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedReference(EntityKind::Author)));
    }

    #[tokio::test]
    async fn test_resolve_creates_and_notifies() {
        let store = Arc::new(MockStore::default());
        let (resolver, notifier) = resolver(store.clone());
        let patch = MetadataPatch {
            title: Some("Title".to_string()),
            authors: Some(vec![author("auth1", Some("A")), author("new-1", Some("B"))]),
            series: Some(vec![series("new-s", Some("Saga"), Some("1"))]),
            ..Default::default()
        };
        let resolved = resolver.resolve(patch).await.unwrap();

        assert_eq!(resolved.title.as_deref(), Some("Title"));
        let authors = resolved.authors.unwrap();
        assert_eq!(authors.len(), 2);
        assert!(authors.iter().all(|a| a.id != "new-1"));
        let stored = store.authors().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "B");
        assert_eq!(authors[1].id, stored[0].id);
        assert_eq!(store.series().await.len(), 1);
        assert_eq!(store.author_batches(), 1);
        assert_eq!(notifier.names(), vec!["authors_added", "series_added"]);
    }

    #[tokio::test]
    async fn test_resolve_without_placeholders_touches_nothing() {
        let store = Arc::new(MockStore::default());
        let (resolver, notifier) = resolver(store.clone());
        let patch = MetadataPatch {
            authors: Some(vec![author("auth1", Some("A"))]),
            ..Default::default()
        };
        let resolved = resolver.resolve(patch).await.unwrap();
        assert_eq!(resolved.authors, Some(vec![AuthorRef::new("auth1", "A")]));
        assert_eq!(resolved.series, None);
        assert_eq!(store.author_batches(), 0);
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_series_creates_no_authors() {
        let store = Arc::new(MockStore::default());
        let (resolver, notifier) = resolver(store.clone());
        let patch = MetadataPatch {
            authors: Some(vec![author("new-1", Some("B"))]),
            series: Some(vec![series("new-s", None, Some("1"))]),
            ..Default::default()
        };
        let err = resolver.resolve(patch).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedReference(EntityKind::Series)));
        assert!(store.authors().await.is_empty());
        assert!(notifier.events().is_empty());
    }

    /// Store whose series inserts always fail.
    struct SeriesDown(MockStore);
    #[async_trait]
    impl CatalogStore for SeriesDown {
        async fn get_item(&self, id: &str) -> DbResult<Option<LibraryItem>> {
            self.0.get_item(id).await
        }
        async fn upsert_item(&self, item: &LibraryItem) -> DbResult<()> {
            self.0.upsert_item(item).await
        }
        async fn insert_authors(&self, authors: &[Author]) -> DbResult<()> {
            self.0.insert_authors(authors).await
        }
        async fn insert_series(&self, _series: &[Series]) -> DbResult<()> {
            exn::bail!(DbErrorKind::Unavailable)
        }
        async fn get_authors(&self, ids: &[String]) -> DbResult<Vec<Author>> {
            self.0.get_authors(ids).await
        }
        async fn get_series(&self, ids: &[String]) -> DbResult<Vec<Series>> {
            self.0.get_series(ids).await
        }
    }

    #[tokio::test]
    async fn test_series_failure_keeps_authors() {
        let store = Arc::new(SeriesDown(MockStore::default()));
        let notifier = Arc::new(RecordingNotifier::default());
        let resolver = ReferenceResolver::new(store.clone(), notifier.clone());
        let patch = MetadataPatch {
            authors: Some(vec![author("new-1", Some("B"))]),
            series: Some(vec![series("new-s", Some("Saga"), None)]),
            ..Default::default()
        };
        let err = resolver.resolve(patch).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Persistence));
        assert_eq!(store.0.authors().await.len(), 1);
        assert_eq!(notifier.names(), vec!["authors_added"]);
    }

    #[tokio::test]
    async fn test_resubmitting_resolved_ids_is_a_no_op() {
        let store = Arc::new(MockStore::default());
        let (resolver, _) = resolver(store.clone());
        let first = resolver
            .resolve(MetadataPatch {
                authors: Some(vec![author("new-1", Some("B"))]),
                ..Default::default()
            })
            .await
            .unwrap();
        let id = first.authors.unwrap()[0].id.clone();
        let second = resolver
            .resolve(MetadataPatch {
                authors: Some(vec![author(&id, Some("B"))]),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(second.authors.unwrap()[0].id, id);
        assert_eq!(store.authors().await.len(), 1);
        assert_eq!(store.author_batches(), 1);
    }
}
