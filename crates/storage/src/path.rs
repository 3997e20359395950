//! Path validation.
//!
//! Cover paths arrive from clients (`coverPath`) and item ids end up as cache
//! directory names, so every path is normalized and confined to the backend
//! root before it touches storage.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates and normalizes a storage path.
///
/// Leading slashes are dropped, `.` components are removed and `..`
/// components are resolved; a path that would climb above the root, or that
/// normalizes to nothing, is rejected.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use folio_storage::validate_path;
/// assert!(validate_path("it1/cover.jpg").is_ok());
/// assert!(validate_path("it1/../it2/cover.jpg").is_ok());
/// assert!(validate_path("../secrets").is_err());
/// assert!(validate_path("it1/../../secrets").is_err());
/// assert!(validate_path("it1\0cover").is_err());
/// assert_eq!(
///     validate_path("/covers//it1/./cover.jpg").unwrap(),
///     Path::new("covers/it1/cover.jpg")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || exn::Exn::from(ErrorKind::InvalidPath(original.to_path_buf()));
    let mut components = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes survive Path::components() on Unix but truncate
                // the path in syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    return Err(invalid());
                }
                components.push(s);
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => return Err(invalid()),
            Component::ParentDir => {
                if components.pop().is_none() {
                    return Err(invalid());
                }
            },
        }
    }
    if components.is_empty() {
        return Err(invalid());
    }
    Ok(components.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert_eq!(validate("it1/cover.jpg").unwrap(), Path::new("it1/cover.jpg"));
        assert_eq!(validate("cover.png").unwrap(), Path::new("cover.png"));
    }

    #[test]
    fn test_absolute_paths_are_rooted() {
        assert_eq!(validate("/it1/cover.jpg").unwrap(), Path::new("it1/cover.jpg"));
    }

    #[test]
    fn test_normalization() {
        assert_eq!(validate("a//b/./c/").unwrap(), Path::new("a/b/c"));
        assert_eq!(validate("a/b/..").unwrap(), Path::new("a"));
    }

    #[test]
    fn test_traversal_attempts() {
        assert!(validate("../etc/passwd").is_err());
        assert!(validate("a/../../b").is_err());
        assert!(validate("..").is_err());
    }

    #[test]
    fn test_empty_and_degenerate_paths() {
        assert!(validate("").is_err());
        assert!(validate(".").is_err());
        assert!(validate("//").is_err());
        assert!(validate("a\0b").is_err());
    }
}
