//! Local filesystem storage backend.

use crate::backend::FileInfoStream;
use crate::error::ErrorKind;
use crate::{FileInfo, StorageBackend, error::Result, path::validate as validate_path};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::fs::create_dir_all as sync_create_dir;
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

enum WalkEntry {
    File(FileInfo),
    Descend(PathBuf),
    Skip,
}

/// Local filesystem storage backend.
///
/// All paths are relative to the configured root directory, which is created
/// on construction if it doesn't exist yet.
///
/// # Examples
///
/// ```no_run
/// use folio_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sources = LocalBackend::new("covers", "/srv/folio/covers")?;
/// let renders = LocalBackend::new("cover-cache", "/var/cache/folio/covers")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if `root` is relative
    /// or points at something other than a directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            // Only happens once at startup; not worth an async constructor.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn relative_path(&self, absolute: impl AsRef<Path>) -> Result<PathBuf> {
        let absolute = absolute.as_ref();
        let relative = absolute.strip_prefix(&self.root).or_raise(|| {
            ErrorKind::BackendError(format!("path `{:?}` is not within root `{:?}`", absolute, self.root))
        })?;
        validate_path(relative)
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    async fn process_entry(&self, entry: DirEntry, prefix: Option<&Path>) -> Result<WalkEntry> {
        let path = entry.path();
        let metadata = entry.metadata().await.map_err(|e| Self::map_io_error(e, &path))?;
        let relative = self.relative_path(&path)?;
        if let Some(pfx) = prefix
            && !relative.starts_with(pfx)
            && !pfx.starts_with(&relative)
        {
            return Ok(WalkEntry::Skip);
        }
        if metadata.is_dir() {
            return Ok(WalkEntry::Descend(path));
        }
        if metadata.is_file() && prefix.is_none_or(|pfx| relative.starts_with(pfx)) {
            return Ok(WalkEntry::File(FileInfo::new(relative)));
        }
        // Broken symlinks and the like.
        Ok(WalkEntry::Skip)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        let validated_prefix = match prefix.map(validate_path).transpose() {
            Ok(pfx) => pfx,
            Err(e) => return Box::pin(futures::stream::once(async { Result::Err(e) })),
        };
        // Walk from the parent of the prefix so that a prefix naming a file,
        // or a directory that doesn't exist yet, is not an error.
        let start_dir = validated_prefix
            .as_ref()
            .map(|prefix| self.root.join(prefix).parent().unwrap_or(&self.root).to_path_buf())
            .unwrap_or_else(|| self.root.clone());
        let mut stack = vec![start_dir];

        Box::pin(stream! {
            'dirs: while let Some(current) = stack.pop() {
                let mut entries = match fs::read_dir(&current).await {
                    Ok(entries) => entries,
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(err) => {
                        yield Err(exn::Exn::from(Self::map_io_error(err, &current)));
                        continue 'dirs;
                    }
                };
                'entries: loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break 'entries,
                        Err(e) => { yield Err(exn::Exn::from(Self::map_io_error(e, &current))); continue 'entries; },
                    };
                    match self.process_entry(entry, validated_prefix.as_deref()).await {
                        Ok(WalkEntry::File(f)) => yield Ok(f),
                        Ok(WalkEntry::Descend(d)) => stack.push(d),
                        Ok(WalkEntry::Skip) => {},
                        Err(e) => yield Err(e),
                    };
                }
            }
        })
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, path))?;
        }
        Ok(fs::write(&abs_path, data).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::remove_file(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (tempfile::TempDir, LocalBackend) {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("covers", temp_dir.path()).unwrap();
        (temp_dir, backend)
    }

    #[test]
    fn test_new_requires_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("covers", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("covers", "relative/path").is_err());
    }

    #[test]
    fn test_new_creates_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("cache/covers");
        LocalBackend::new("covers", &root).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_absolute_path_is_confined() {
        let (temp_dir, backend) = backend();
        assert_eq!(backend.absolute_path("it1/cover.jpg").unwrap(), temp_dir.path().join("it1/cover.jpg"));
        assert!(backend.absolute_path("../etc/passwd").is_err());
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("it1/w200.webp"), b"RIFF").await.unwrap();
        assert_eq!(backend.read(Path::new("it1/w200.webp")).await.unwrap(), b"RIFF");
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let (_temp_dir, backend) = backend();
        let err = backend.read(Path::new("it1/cover.jpg")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("it1/a.jpg"), b"data").await.unwrap();
        backend.delete(Path::new("it1/a.jpg")).await.unwrap();
        assert!(backend.list(None).await.unwrap().is_empty());
        let err = backend.delete(Path::new("it1/a.jpg")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_prefix_is_component_based() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("it1/a.webp"), b"a").await.unwrap();
        backend.write(Path::new("it1/b.jpeg"), b"b").await.unwrap();
        backend.write(Path::new("it10/a.webp"), b"c").await.unwrap();
        let mut files = backend.list(Some(Path::new("it1"))).await.unwrap();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("it1/a.webp"), PathBuf::from("it1/b.jpeg")]);
        assert_eq!(backend.list(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_list_nonexistent_prefix() {
        let (_temp_dir, backend) = backend();
        assert!(backend.list(Some(Path::new("nope"))).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_prefix() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("it1/a.webp"), b"a").await.unwrap();
        backend.write(Path::new("it1/b.jpeg"), b"b").await.unwrap();
        backend.write(Path::new("it2/a.webp"), b"c").await.unwrap();
        assert_eq!(backend.delete_prefix(Path::new("it1")).await.unwrap(), 2);
        assert!(backend.list(Some(Path::new("it1"))).await.unwrap().is_empty());
        assert_eq!(backend.read(Path::new("it2/a.webp")).await.unwrap(), b"c");
        assert_eq!(backend.delete_prefix(Path::new("it1")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_path_security() {
        let (_temp_dir, backend) = backend();
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.write(Path::new("../escape"), b"data").await.is_err());
        assert!(backend.delete(Path::new("../../file")).await.is_err());
    }
}
