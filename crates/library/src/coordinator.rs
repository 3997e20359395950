//! The update and read flows over a single library item.
//!
//! Every mutation runs the same fixed sequence within the caller's task:
//! authorize, purge derived covers if the cover is being removed, resolve
//! placeholder references, merge, persist (only if something changed), then
//! announce the change. Nothing is retried here; callers may resubmit, and a
//! resubmission carrying already-durable ids is a no-op for those references.

use crate::cover::{CacheHandle, Cover, CoverCacheService};
use crate::error::{ErrorKind, Result};
use crate::guard::{Actor, Operation, authorize};
use crate::invalidate::CacheInvalidator;
use crate::notify::{Notification, NotifierHandle, publish_best_effort};
use crate::resolve::ReferenceResolver;
use exn::ResultExt;
use folio_db::StoreHandle;
use folio_model::{ExpandedItem, ItemPatch, LibraryItem, MediaPatch, Merge, ResolvedMediaPatch};
use folio_render::{CoverRenderer, RenderOptions};
use folio_storage::BackendHandle;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// An item as returned to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ItemView {
    Plain(LibraryItem),
    /// References replaced by the entities they point at.
    Expanded(ExpandedItem),
}

pub struct Coordinator {
    store: StoreHandle,
    resolver: ReferenceResolver,
    invalidator: CacheInvalidator,
    covers: CoverCacheService,
    notifier: NotifierHandle,
}

impl Coordinator {
    pub fn new(
        store: StoreHandle,
        cache: CacheHandle,
        sources: BackendHandle,
        renderer: Arc<dyn CoverRenderer>,
        notifier: NotifierHandle,
    ) -> Self {
        Self {
            resolver: ReferenceResolver::new(Arc::clone(&store), Arc::clone(&notifier)),
            invalidator: CacheInvalidator::new(Arc::clone(&cache)),
            covers: CoverCacheService::new(cache, sources, renderer),
            store,
            notifier,
        }
    }

    /// Fetch an item the actor may read.
    ///
    /// A missing item is [`NotFound`](ErrorKind::NotFound) regardless of the
    /// actor; an item in a library the actor can't read is
    /// [`PermissionDenied`](ErrorKind::PermissionDenied).
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn load_for(&self, actor: &Actor, item_id: &str) -> Result<LibraryItem> {
        let Some(item) = self.store.get_item(item_id).await.or_raise(|| ErrorKind::Persistence)? else {
            exn::bail!(ErrorKind::NotFound);
        };
        if !authorize(actor, &Operation::Read { library_id: &item.library_id }) {
            tracing::warn!(library = item.library_id, "actor cannot read library");
            exn::bail!(ErrorKind::PermissionDenied);
        }
        Ok(item)
    }

    /// Denormalize author and series references.
    pub async fn expand(&self, item: &LibraryItem) -> Result<ExpandedItem> {
        let metadata = &item.media.metadata;
        let authors = self.store.get_authors(&metadata.author_ids()).await.or_raise(|| ErrorKind::Persistence)?;
        let series = self.store.get_series(&metadata.series_ids()).await.or_raise(|| ErrorKind::Persistence)?;
        Ok(item.expand(&authors, &series))
    }

    pub async fn view(&self, item: LibraryItem, expanded: bool) -> Result<ItemView> {
        if expanded {
            Ok(ItemView::Expanded(self.expand(&item).await?))
        } else {
            Ok(ItemView::Plain(item))
        }
    }

    pub async fn find(&self, actor: &Actor, item_id: &str, expanded: bool) -> Result<ItemView> {
        let item = self.load_for(actor, item_id).await?;
        self.view(item, expanded).await
    }

    /// Apply a whole-item patch.
    #[instrument(skip_all, fields(actor = %actor.id, item = %item.id))]
    pub async fn update_item(&self, actor: &Actor, item: &LibraryItem, mut patch: ItemPatch) -> Result<LibraryItem> {
        Self::authorize_update(actor)?;
        self.invalidator.maybe_invalidate(item, patch.media.as_ref()).await?;
        let media = match patch.media.take() {
            Some(media) => Some(self.resolve_media(media).await?),
            None => None,
        };
        let merge = item.merged(patch.with_media(media));
        self.commit(merge).await
    }

    /// Apply a patch to the item's media only.
    #[instrument(skip_all, fields(actor = %actor.id, item = %item.id))]
    pub async fn update_media(&self, actor: &Actor, item: &LibraryItem, patch: MediaPatch) -> Result<LibraryItem> {
        Self::authorize_update(actor)?;
        self.invalidator.maybe_invalidate(item, Some(&patch)).await?;
        let patch = self.resolve_media(patch).await?;
        let merge = item.merged_media(patch);
        self.commit(merge).await
    }

    /// Serve the item's cover rendered with `options`.
    pub async fn cover(&self, item: &LibraryItem, options: &RenderOptions) -> Result<Cover> {
        self.covers.serve(item, options).await
    }

    fn authorize_update(actor: &Actor) -> Result<()> {
        if !authorize(actor, &Operation::Update) {
            tracing::warn!("actor is not allowed to update items");
            exn::bail!(ErrorKind::PermissionDenied);
        }
        Ok(())
    }

    async fn resolve_media(&self, mut media: MediaPatch) -> Result<ResolvedMediaPatch> {
        let metadata = match media.metadata.take() {
            Some(metadata) => Some(self.resolver.resolve(metadata).await?),
            None => None,
        };
        Ok(media.with_metadata(metadata))
    }

    async fn commit(&self, merge: Merge<LibraryItem>) -> Result<LibraryItem> {
        if !merge.has_changes() {
            tracing::debug!("nothing changed, skipping write");
            return Ok(merge.into_value());
        }
        self.store.upsert_item(&merge.value).await.or_raise(|| ErrorKind::Persistence)?;
        tracing::info!(changed = ?merge.changed, "item updated");

        // The write is durable; from here on nothing may fail the request.
        match self.expand(&merge.value).await {
            Ok(expanded) => publish_best_effort(&self.notifier, Notification::ItemUpdated(expanded)).await,
            Err(err) => tracing::warn!(error = %err, "could not expand item for notification"),
        }
        Ok(merge.into_value())
    }
}
