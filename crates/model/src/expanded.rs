use crate::timestamp::millis;
use crate::{Author, LibraryItem, Series};
use serde::Serialize;
use time::UtcDateTime;

/// Denormalized representation of a [`LibraryItem`], with author and series
/// references replaced by the entities they point at.
///
/// This is what `item_updated` subscribers and `?expanded=1` readers receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedItem {
    pub id: String,
    pub library_id: String,
    pub path: String,
    pub is_missing: bool,
    pub is_invalid: bool,
    pub media: ExpandedMedia,
    #[serde(with = "millis")]
    pub added_at: UtcDateTime,
    #[serde(with = "millis")]
    pub updated_at: UtcDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedMedia {
    pub cover_path: Option<String>,
    pub has_cover: bool,
    pub tags: Vec<String>,
    pub metadata: ExpandedMetadata,
    pub num_authors: usize,
    pub num_series: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedMetadata {
    pub title: String,
    pub subtitle: Option<String>,
    pub authors: Vec<ExpandedAuthor>,
    pub series: Vec<ExpandedSeries>,
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedAuthor {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    #[serde(with = "millis::option")]
    pub added_at: Option<UtcDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedSeries {
    pub id: String,
    pub name: String,
    pub sequence: Option<String>,
    pub description: Option<String>,
    #[serde(with = "millis::option")]
    pub added_at: Option<UtcDateTime>,
}

impl ExpandedItem {
    pub(crate) fn build(item: &LibraryItem, authors: &[Author], series: &[Series]) -> Self {
        let metadata = &item.media.metadata;
        let expanded_authors: Vec<ExpandedAuthor> = metadata
            .authors
            .iter()
            .map(|reference| match authors.iter().find(|a| a.id == reference.id) {
                Some(author) => ExpandedAuthor {
                    id: author.id.clone(),
                    name: author.name.clone(),
                    description: author.description.clone(),
                    image_path: author.image_path.clone(),
                    added_at: Some(author.added_at),
                },
                None => ExpandedAuthor {
                    id: reference.id.clone(),
                    name: reference.name.clone(),
                    description: None,
                    image_path: None,
                    added_at: None,
                },
            })
            .collect();
        let expanded_series: Vec<ExpandedSeries> = metadata
            .series
            .iter()
            .map(|reference| {
                let entity = series.iter().find(|s| s.id == reference.id);
                ExpandedSeries {
                    id: reference.id.clone(),
                    name: entity.map_or_else(|| reference.name.clone(), |s| s.name.clone()),
                    sequence: reference.sequence.clone(),
                    description: entity.and_then(|s| s.description.clone()),
                    added_at: entity.map(|s| s.added_at),
                }
            })
            .collect();
        Self {
            id: item.id.clone(),
            library_id: item.library_id.clone(),
            path: item.path.clone(),
            is_missing: item.is_missing,
            is_invalid: item.is_invalid,
            media: ExpandedMedia {
                cover_path: item.media.cover_path.clone(),
                has_cover: item.media.has_cover(),
                tags: item.media.tags.clone(),
                num_authors: expanded_authors.len(),
                num_series: expanded_series.len(),
                metadata: ExpandedMetadata {
                    title: metadata.title.clone(),
                    subtitle: metadata.subtitle.clone(),
                    authors: expanded_authors,
                    series: expanded_series,
                    narrators: metadata.narrators.clone(),
                    genres: metadata.genres.clone(),
                    published_year: metadata.published_year.clone(),
                    publisher: metadata.publisher.clone(),
                    description: metadata.description.clone(),
                    isbn: metadata.isbn.clone(),
                    asin: metadata.asin.clone(),
                    language: metadata.language.clone(),
                    explicit: metadata.explicit,
                },
            },
            added_at: item.added_at,
            updated_at: item.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::timestamp::from_millis;
    use crate::{Author, AuthorRef, LibraryItem, Media, Metadata, Series, SeriesRef};

    #[test]
    fn test_expand_prefers_entities_and_falls_back_to_references() {
        let metadata = Metadata {
            authors: vec![AuthorRef::new("aut_1", "Stale Name"), AuthorRef::new("aut_gone", "Ghost")],
            series: vec![SeriesRef::new("ser_1", "Saga", Some("3".to_string()))],
            ..Metadata::new("Title")
        };
        let item = LibraryItem::new("it1", "lib1", "/books/t", Media { metadata, ..Default::default() });
        let now = from_millis(5_000).unwrap();
        let authors = [Author::new("aut_1", "Canonical Name", now)];
        let series = [Series::new("ser_1", "Saga", now)];

        let expanded = item.expand(&authors, &series);
        let names: Vec<_> = expanded.media.metadata.authors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Canonical Name", "Ghost"]);
        assert_eq!(expanded.media.metadata.authors[0].added_at, Some(now));
        assert_eq!(expanded.media.metadata.authors[1].added_at, None);
        assert_eq!(expanded.media.metadata.series[0].sequence.as_deref(), Some("3"));
        assert_eq!(expanded.media.num_authors, 2);
        assert!(!expanded.media.has_cover);
    }
}
