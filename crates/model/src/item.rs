use crate::expanded::ExpandedItem;
use crate::patch::{Changes, Merge, ResolvedItemPatch, ResolvedMediaPatch};
use crate::timestamp::{self, millis};
use crate::{Author, Media, Series};
use serde::{Deserialize, Serialize};
use time::UtcDateTime;

/// A catalog entry representing one piece of media content.
///
/// Items are created by ingestion and only ever mutated through the update
/// flows; this crate never deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub id: String,
    /// The owning library, used for read access checks.
    pub library_id: String,
    pub path: String,
    pub is_missing: bool,
    pub is_invalid: bool,
    pub media: Media,
    #[serde(with = "millis")]
    pub added_at: UtcDateTime,
    #[serde(with = "millis")]
    pub updated_at: UtcDateTime,
}
impl LibraryItem {
    pub fn new(id: impl Into<String>, library_id: impl Into<String>, path: impl Into<String>, media: Media) -> Self {
        let now = timestamp::now();
        Self {
            id: id.into(),
            library_id: library_id.into(),
            path: path.into(),
            is_missing: false,
            is_invalid: false,
            media,
            added_at: now,
            updated_at: now,
        }
    }

    /// Merge a resolved whole-item patch.
    ///
    /// `updated_at` is bumped only when at least one field changed, and is not
    /// itself reported as a change.
    pub fn merged(&self, patch: ResolvedItemPatch) -> Merge<Self> {
        let mut value = self.clone();
        let mut changes = Changes::default();
        changes.assign("path", &mut value.path, patch.path);
        changes.assign("isMissing", &mut value.is_missing, patch.is_missing);
        changes.assign("isInvalid", &mut value.is_invalid, patch.is_invalid);
        if let Some(media) = patch.media {
            let nested = value.media.apply(media);
            changes.nest("media", nested);
        }
        value.touch(&changes);
        changes.finish(value)
    }

    /// Merge a resolved patch into this item's media only.
    pub fn merged_media(&self, patch: ResolvedMediaPatch) -> Merge<Self> {
        let mut value = self.clone();
        let changes = value.media.apply(patch);
        value.touch(&changes);
        changes.finish(value)
    }

    fn touch(&mut self, changes: &Changes) {
        if !changes.is_empty() {
            self.updated_at = timestamp::now().max(self.updated_at);
        }
    }

    /// Denormalize author and series references using the supplied entities.
    ///
    /// References without a matching entity are expanded from the embedded
    /// record alone.
    pub fn expand(&self, authors: &[Author], series: &[Series]) -> ExpandedItem {
        ExpandedItem::build(self, authors, series)
    }
}
