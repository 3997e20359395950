//! Derived cover renders and the cache that holds them.
//!
//! The cache is never authoritative: an entry can be dropped at any time and
//! is regenerated from the item's `coverPath` on the next request. Entries are
//! keyed by `(item id, render options)` and laid out as
//! `<item_id>/w<width>_h<height>.<ext>`, so purging an item is a prefix delete.

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use folio_model::LibraryItem;
use folio_render::error::ErrorKind as RenderErrorKind;
use folio_render::{CoverRenderer, ImageFormat, RenderOptions};
use folio_storage::error::ErrorKind as StorageErrorKind;
use folio_storage::{BackendHandle, validate_path};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

/// Storage for derived renders.
#[async_trait]
pub trait RenderCache: Send + Sync {
    async fn get(&self, item_id: &str, options: &RenderOptions) -> Result<Option<Vec<u8>>>;

    /// Store a render, overwriting any previous entry for the same key.
    async fn put(&self, item_id: &str, options: &RenderOptions, bytes: &[u8]) -> Result<()>;

    /// Remove every render of the item, returning how many were removed.
    async fn purge(&self, item_id: &str) -> Result<usize>;
}

pub type CacheHandle = Arc<dyn RenderCache + Send + Sync>;

/// [`RenderCache`] over a storage backend.
pub struct CoverCache {
    backend: BackendHandle,
}
impl CoverCache {
    pub fn new(backend: BackendHandle) -> Self {
        Self { backend }
    }

    /// The item's cache directory. Ids must map onto exactly one path
    /// component, otherwise a purge could reach another item's renders.
    fn item_dir(item_id: &str) -> Result<PathBuf> {
        let dir = validate_path(item_id).or_raise(|| ErrorKind::Cache)?;
        let mut components = dir.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if dir.as_os_str() == item_id => Ok(dir),
            _ => exn::bail!(ErrorKind::Cache),
        }
    }

    fn entry_path(item_id: &str, options: &RenderOptions) -> Result<PathBuf> {
        Ok(Self::item_dir(item_id)?.join(options.file_name()))
    }
}

#[async_trait]
impl RenderCache for CoverCache {
    async fn get(&self, item_id: &str, options: &RenderOptions) -> Result<Option<Vec<u8>>> {
        let path = Self::entry_path(item_id, options)?;
        match self.backend.read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if matches!(&*err, StorageErrorKind::NotFound(_)) => Ok(None),
            Err(err) => Err(err).or_raise(|| ErrorKind::Cache),
        }
    }

    async fn put(&self, item_id: &str, options: &RenderOptions, bytes: &[u8]) -> Result<()> {
        let path = Self::entry_path(item_id, options)?;
        self.backend.write(&path, bytes).await.or_raise(|| ErrorKind::Cache)
    }

    #[instrument(skip(self), fields(backend = self.backend.name()))]
    async fn purge(&self, item_id: &str) -> Result<usize> {
        let dir = Self::item_dir(item_id)?;
        let removed = self.backend.delete_prefix(&dir).await.or_raise(|| ErrorKind::Cache)?;
        tracing::debug!(removed, "purged cover renders");
        Ok(removed)
    }
}

/// A rendered cover ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    /// BLAKE3 hex digest of `bytes`.
    pub etag: String,
}
impl Cover {
    fn new(bytes: Vec<u8>, format: ImageFormat) -> Self {
        let etag = blake3::hash(&bytes).to_hex().to_string();
        Self { bytes, format, etag }
    }
}

/// Serves covers from the cache, rendering from the authoritative source on a
/// miss.
pub struct CoverCacheService {
    cache: CacheHandle,
    sources: BackendHandle,
    renderer: Arc<dyn CoverRenderer>,
}
impl CoverCacheService {
    pub fn new(cache: CacheHandle, sources: BackendHandle, renderer: Arc<dyn CoverRenderer>) -> Self {
        Self { cache, sources, renderer }
    }

    pub fn cache(&self) -> &CacheHandle {
        &self.cache
    }

    /// Return the cover of `item` rendered with `options`.
    ///
    /// An item without a cover is [`NotFound`](ErrorKind::NotFound) and the
    /// cache is not consulted. A failed cache write is logged and the fresh
    /// render is served anyway.
    #[instrument(skip_all, fields(item = %item.id, options = %options.file_name()))]
    pub async fn serve(&self, item: &LibraryItem, options: &RenderOptions) -> Result<Cover> {
        let Some(cover_path) = item.media.cover_path.as_deref().filter(|path| !path.is_empty()) else {
            exn::bail!(ErrorKind::NotFound);
        };
        if let Some(bytes) = self.cache.get(&item.id, options).await? {
            tracing::debug!(size = bytes.len(), "cover cache hit");
            return Ok(Cover::new(bytes, options.format));
        }

        let source = match self.sources.read(Path::new(cover_path)).await {
            Ok(source) => source,
            Err(err) if matches!(&*err, StorageErrorKind::NotFound(_)) => {
                tracing::warn!(cover_path, "item references a missing cover image");
                return Err(err).or_raise(|| ErrorKind::NotFound);
            },
            Err(err) => return Err(err).or_raise(|| ErrorKind::Storage),
        };
        let renderer = Arc::clone(&self.renderer);
        let render_options = *options;
        let rendered = tokio::task::spawn_blocking(move || renderer.render(&source, &render_options))
            .await
            .or_raise(|| ErrorKind::Render)?;
        let bytes = match rendered {
            Ok(bytes) => bytes,
            Err(err) if matches!(&*err, RenderErrorKind::TooLarge { .. }) => {
                return Err(err).or_raise(|| ErrorKind::TooLarge);
            },
            Err(err) => return Err(err).or_raise(|| ErrorKind::Render),
        };
        tracing::debug!(size = bytes.len(), "rendered cover");

        if let Err(err) = self.cache.put(&item.id, options, &bytes).await {
            tracing::warn!(error = %err, "failed to cache cover render");
        }
        Ok(Cover::new(bytes, options.format))
    }
}
