//! Storage backend trait and implementations.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::FileInfo;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::pin::Pin;

pub(crate) type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

/// Unified interface for cover storage.
///
/// # Path Handling
/// All paths are relative to the storage root and are validated using
/// [`validate_path`](crate::validate_path) before use. Implementations must
/// enforce this validation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use folio_storage::{backend::StorageBackend, error::Result};
///
/// async fn replace_render(backend: &dyn StorageBackend, source: &str, render: &str) -> Result<()> {
///     let bytes = backend.read(Path::new(source)).await?;
///     backend.delete_prefix(Path::new("it1")).await?;
///     backend.write(Path::new(render), &bytes).await
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend, used for logging only.
    fn name(&self) -> &str;

    /// List all files matching an optional prefix.
    ///
    /// Collects [`list_stream()`](Self::list_stream) into a [`Vec`].
    async fn list(&self, prefix: Option<&Path>) -> Result<Vec<FileInfo>> {
        self.list_stream(prefix).try_collect().await
    }

    /// Stream file metadata matching an optional prefix.
    ///
    /// Prefix matching is component-based: the prefix `it1` matches
    /// `it1/cover.webp` but not `it10/cover.webp`.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::TryStreamExt;
    /// use std::path::Path;
    /// # use folio_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut stream = backend.list_stream(Some(Path::new("it1")));
    /// while let Some(info) = stream.try_next().await? {
    ///     println!("{}", info.path.display());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a>;

    /// Read file contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write file contents, creating or overwriting the file.
    ///
    /// Implementations create parent directories as needed.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Delete a file.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn delete(&self, path: &Path) -> Result<()>;

    /// Delete every file under `prefix`, returning how many were removed.
    ///
    /// Files that disappear between listing and deletion (a concurrent purge
    /// got there first) are not an error and are not counted.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// # use folio_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let removed = backend.delete_prefix(Path::new("it1")).await?;
    /// println!("purged {removed} renders");
    /// # Ok(())
    /// # }
    /// ```
    async fn delete_prefix(&self, prefix: &Path) -> Result<usize> {
        let files = self.list(Some(prefix)).await?;
        let mut removed = 0;
        for file in files {
            match self.delete(&file.path).await {
                Ok(()) => removed += 1,
                Err(err) if matches!(&*err, ErrorKind::NotFound(_)) => {
                    tracing::debug!(backend = self.name(), path = %file.path.display(), "already removed during purge");
                },
                Err(err) => return Err(err),
            }
        }
        Ok(removed)
    }
}
