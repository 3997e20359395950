use crate::Metadata;
use crate::patch::{Changes, Merge, ResolvedMediaPatch};
use serde::{Deserialize, Serialize};

/// Content descriptor exclusively owned by a [`LibraryItem`](crate::LibraryItem).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    /// Location of the authoritative cover image, relative to the cover
    /// source root. Derived renders are cached separately, keyed by item.
    pub cover_path: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Metadata,
}
impl Media {
    pub fn has_cover(&self) -> bool {
        self.cover_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Merge a resolved patch, including nested metadata.
    pub fn merged(&self, patch: ResolvedMediaPatch) -> Merge<Self> {
        let mut value = self.clone();
        let changes = value.apply(patch);
        changes.finish(value)
    }

    pub(crate) fn apply(&mut self, patch: ResolvedMediaPatch) -> Changes {
        let mut changes = Changes::default();
        // An empty string is a removal, stored the same way as `null`.
        let cover_path = patch.cover_path.map(|path| path.filter(|p| !p.is_empty()));
        changes.assign("coverPath", &mut self.cover_path, cover_path);
        changes.assign("tags", &mut self.tags, patch.tags);
        if let Some(metadata) = patch.metadata {
            let nested = self.metadata.apply(metadata);
            changes.nest("metadata", nested);
        }
        changes
    }
}
