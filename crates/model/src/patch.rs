//! Partial update payloads and the merge bookkeeping shared by every patch.
//!
//! Patches are generic over the element type of their reference lists: a
//! freshly parsed payload holds [`Reference`]s (some of which may still be
//! pending creation), while a resolved patch holds plain [`AuthorRef`] and
//! [`SeriesRef`] values and is the only kind that can be merged.

use crate::{AuthorRef, Reference, SeriesRef};
use serde::{Deserialize, Deserializer};

pub type ResolvedMetadataPatch = MetadataPatch<AuthorRef, SeriesRef>;
pub type ResolvedMediaPatch = MediaPatch<AuthorRef, SeriesRef>;
pub type ResolvedItemPatch = ItemPatch<AuthorRef, SeriesRef>;

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// The outcome of merging a patch into a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge<T> {
    /// The merged value. Equal to the original if nothing changed.
    pub value: T,
    /// Wire names of the fields whose value actually changed, in merge order.
    pub changed: Vec<String>,
}
impl<T> Merge<T> {
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Field-level overwrite tracking.
#[derive(Debug, Default)]
pub(crate) struct Changes(Vec<String>);
impl Changes {
    /// Overwrite `slot` if the payload carried a value for it and that value
    /// differs from the current one.
    pub(crate) fn assign<T: PartialEq>(&mut self, field: &str, slot: &mut T, incoming: Option<T>) {
        if let Some(value) = incoming
            && *slot != value
        {
            *slot = value;
            self.0.push(field.to_string());
        }
    }

    pub(crate) fn nest(&mut self, prefix: &str, inner: Changes) {
        self.0.extend(inner.0.into_iter().map(|field| format!("{prefix}.{field}")));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn finish<T>(self, value: T) -> Merge<T> {
        Merge { value, changed: self.0 }
    }
}

/// Partial [`Metadata`](crate::Metadata).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "A: Deserialize<'de>, S: Deserialize<'de>"))]
pub struct MetadataPatch<A = Reference<AuthorRef>, S = Reference<SeriesRef>> {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub subtitle: Option<Option<String>>,
    #[serde(default)]
    pub authors: Option<Vec<A>>,
    #[serde(default)]
    pub series: Option<Vec<S>>,
    #[serde(default)]
    pub narrators: Option<Vec<String>>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub published_year: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub publisher: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub isbn: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub asin: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub language: Option<Option<String>>,
    #[serde(default)]
    pub explicit: Option<bool>,
}
impl<A, S> Default for MetadataPatch<A, S> {
    fn default() -> Self {
        Self {
            title: None,
            subtitle: None,
            authors: None,
            series: None,
            narrators: None,
            genres: None,
            published_year: None,
            publisher: None,
            description: None,
            isbn: None,
            asin: None,
            language: None,
            explicit: None,
        }
    }
}
impl<A, S> MetadataPatch<A, S> {
    /// Swap the reference lists for their resolved counterparts, keeping every
    /// other field as-is.
    ///
    /// The lists currently held by `self` are discarded; callers are expected
    /// to have taken them out first.
    pub fn with_references<A2, S2>(self, authors: Option<Vec<A2>>, series: Option<Vec<S2>>) -> MetadataPatch<A2, S2> {
        MetadataPatch {
            title: self.title,
            subtitle: self.subtitle,
            authors,
            series,
            narrators: self.narrators,
            genres: self.genres,
            published_year: self.published_year,
            publisher: self.publisher,
            description: self.description,
            isbn: self.isbn,
            asin: self.asin,
            language: self.language,
            explicit: self.explicit,
        }
    }
}

/// Partial [`Media`](crate::Media).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "A: Deserialize<'de>, S: Deserialize<'de>"))]
pub struct MediaPatch<A = Reference<AuthorRef>, S = Reference<SeriesRef>> {
    /// `Some(None)` and `Some(Some(""))` both request removal of the cover.
    #[serde(default, deserialize_with = "nullable")]
    pub cover_path: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<MetadataPatch<A, S>>,
}
impl<A, S> Default for MediaPatch<A, S> {
    fn default() -> Self {
        Self { cover_path: None, tags: None, metadata: None }
    }
}
impl<A, S> MediaPatch<A, S> {
    /// Returns `true` if the payload explicitly clears the cover (an empty
    /// string or `null`). An absent field is not a removal.
    pub fn removes_cover(&self) -> bool {
        matches!(&self.cover_path, Some(None)) || matches!(&self.cover_path, Some(Some(path)) if path.is_empty())
    }

    pub fn with_metadata<A2, S2>(self, metadata: Option<MetadataPatch<A2, S2>>) -> MediaPatch<A2, S2> {
        MediaPatch {
            cover_path: self.cover_path,
            tags: self.tags,
            metadata,
        }
    }
}

/// Partial [`LibraryItem`](crate::LibraryItem).
///
/// Identity and ownership (`id`, `libraryId`) are not updatable and are
/// ignored if present in the payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "A: Deserialize<'de>, S: Deserialize<'de>"))]
pub struct ItemPatch<A = Reference<AuthorRef>, S = Reference<SeriesRef>> {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub is_missing: Option<bool>,
    #[serde(default)]
    pub is_invalid: Option<bool>,
    #[serde(default)]
    pub media: Option<MediaPatch<A, S>>,
}
impl<A, S> Default for ItemPatch<A, S> {
    fn default() -> Self {
        Self {
            path: None,
            is_missing: None,
            is_invalid: None,
            media: None,
        }
    }
}
impl<A, S> ItemPatch<A, S> {
    pub fn with_media<A2, S2>(self, media: Option<MediaPatch<A2, S2>>) -> ItemPatch<A2, S2> {
        ItemPatch {
            path: self.path,
            is_missing: self.is_missing,
            is_invalid: self.is_invalid,
            media,
        }
    }
}
