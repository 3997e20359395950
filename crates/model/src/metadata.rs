use crate::patch::{Changes, Merge, ResolvedMetadataPatch};
use crate::{AuthorRef, SeriesRef};
use serde::{Deserialize, Serialize};

/// Descriptive metadata owned by a [`Media`](crate::Media).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    pub subtitle: Option<String>,
    /// Ordered author credits; never contains a placeholder id once stored.
    pub authors: Vec<AuthorRef>,
    /// Ordered series memberships; never contains a placeholder id once stored.
    pub series: Vec<SeriesRef>,
    pub narrators: Vec<String>,
    pub genres: Vec<String>,
    pub published_year: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub asin: Option<String>,
    pub language: Option<String>,
    pub explicit: bool,
}
impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Merge a resolved patch, overwriting every field the patch carries.
    pub fn merged(&self, patch: ResolvedMetadataPatch) -> Merge<Self> {
        let mut value = self.clone();
        let changes = value.apply(patch);
        changes.finish(value)
    }

    pub(crate) fn apply(&mut self, patch: ResolvedMetadataPatch) -> Changes {
        let mut changes = Changes::default();
        changes.assign("title", &mut self.title, patch.title);
        changes.assign("subtitle", &mut self.subtitle, patch.subtitle);
        changes.assign("authors", &mut self.authors, patch.authors);
        changes.assign("series", &mut self.series, patch.series);
        changes.assign("narrators", &mut self.narrators, patch.narrators);
        changes.assign("genres", &mut self.genres, patch.genres);
        changes.assign("publishedYear", &mut self.published_year, patch.published_year);
        changes.assign("publisher", &mut self.publisher, patch.publisher);
        changes.assign("description", &mut self.description, patch.description);
        changes.assign("isbn", &mut self.isbn, patch.isbn);
        changes.assign("asin", &mut self.asin, patch.asin);
        changes.assign("language", &mut self.language, patch.language);
        changes.assign("explicit", &mut self.explicit, patch.explicit);
        changes
    }

    pub fn author_ids(&self) -> Vec<String> {
        self.authors.iter().map(|a| a.id.clone()).collect()
    }

    pub fn series_ids(&self) -> Vec<String> {
        self.series.iter().map(|s| s.id.clone()).collect()
    }
}
