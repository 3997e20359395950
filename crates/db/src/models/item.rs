use crate::error::{Error, ErrorKind};
use crate::models::facet::{AuthorRefProxy, SeriesRefProxy};
use exn::ResultExt;
use facet_json::{from_str as from_json, to_string as to_json};
use folio_model::timestamp::{from_millis, to_millis};
use folio_model::{AuthorRef, LibraryItem, Media, Metadata, SeriesRef};

#[derive(sqlx::FromRow)]
pub(crate) struct ItemRow {
    pub(crate) id: String,
    pub(crate) library_id: String,
    pub(crate) path: String,
    pub(crate) is_missing: bool,
    pub(crate) is_invalid: bool,
    pub(crate) cover_path: Option<String>,
    pub(crate) tags: String,
    pub(crate) title: String,
    pub(crate) subtitle: Option<String>,
    pub(crate) authors: String,
    pub(crate) series: String,
    pub(crate) narrators: String,
    pub(crate) genres: String,
    pub(crate) published_year: Option<String>,
    pub(crate) publisher: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) isbn: Option<String>,
    pub(crate) asin: Option<String>,
    pub(crate) language: Option<String>,
    pub(crate) explicit: bool,
    pub(crate) added_at: i64,
    pub(crate) updated_at: i64,
}
impl TryFrom<&LibraryItem> for ItemRow {
    type Error = Error;
    fn try_from(item: &LibraryItem) -> Result<Self, Self::Error> {
        let metadata = &item.media.metadata;
        let authors = metadata.authors.iter().map(AuthorRefProxy::from).collect::<Vec<_>>();
        let series = metadata.series.iter().map(SeriesRefProxy::from).collect::<Vec<_>>();
        Ok(Self {
            id: item.id.clone(),
            library_id: item.library_id.clone(),
            path: item.path.clone(),
            is_missing: item.is_missing,
            is_invalid: item.is_invalid,
            cover_path: item.media.cover_path.clone(),
            tags: to_json(&item.media.tags).or_raise(|| ErrorKind::InvalidData("tags"))?,
            title: metadata.title.clone(),
            subtitle: metadata.subtitle.clone(),
            authors: to_json(&authors).or_raise(|| ErrorKind::InvalidData("authors"))?,
            series: to_json(&series).or_raise(|| ErrorKind::InvalidData("series"))?,
            narrators: to_json(&metadata.narrators).or_raise(|| ErrorKind::InvalidData("narrators"))?,
            genres: to_json(&metadata.genres).or_raise(|| ErrorKind::InvalidData("genres"))?,
            published_year: metadata.published_year.clone(),
            publisher: metadata.publisher.clone(),
            description: metadata.description.clone(),
            isbn: metadata.isbn.clone(),
            asin: metadata.asin.clone(),
            language: metadata.language.clone(),
            explicit: metadata.explicit,
            added_at: to_millis(item.added_at),
            updated_at: to_millis(item.updated_at),
        })
    }
}
impl TryFrom<ItemRow> for LibraryItem {
    type Error = Error;
    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let metadata = Metadata {
            title: row.title,
            subtitle: row.subtitle,
            authors: from_json::<Vec<AuthorRefProxy>>(&row.authors)
                .or_raise(|| ErrorKind::InvalidData("authors"))?
                .into_iter()
                .map(AuthorRef::from)
                .collect::<Vec<_>>(),
            series: from_json::<Vec<SeriesRefProxy>>(&row.series)
                .or_raise(|| ErrorKind::InvalidData("series"))?
                .into_iter()
                .map(SeriesRef::from)
                .collect::<Vec<_>>(),
            narrators: from_json::<Vec<String>>(&row.narrators).or_raise(|| ErrorKind::InvalidData("narrators"))?,
            genres: from_json::<Vec<String>>(&row.genres).or_raise(|| ErrorKind::InvalidData("genres"))?,
            published_year: row.published_year,
            publisher: row.publisher,
            description: row.description,
            isbn: row.isbn,
            asin: row.asin,
            language: row.language,
            explicit: row.explicit,
        };
        Ok(Self {
            id: row.id,
            library_id: row.library_id,
            path: row.path,
            is_missing: row.is_missing,
            is_invalid: row.is_invalid,
            media: Media {
                cover_path: row.cover_path,
                tags: from_json::<Vec<String>>(&row.tags).or_raise(|| ErrorKind::InvalidData("tags"))?,
                metadata,
            },
            added_at: from_millis(row.added_at).or_raise(|| ErrorKind::InvalidData("item added date"))?,
            updated_at: from_millis(row.updated_at).or_raise(|| ErrorKind::InvalidData("item updated date"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::SeriesRef;

    fn item() -> LibraryItem {
        let metadata = Metadata {
            authors: vec![AuthorRef::new("aut_2", "Second"), AuthorRef::new("aut_1", "First")],
            series: vec![SeriesRef::new("ser_1", "Saga", Some("1.5".to_string()))],
            narrators: vec!["Reader".to_string()],
            published_year: Some("1968".to_string()),
            explicit: true,
            ..Metadata::new("A Wizard of Earthsea")
        };
        let media = Media {
            cover_path: Some("it1/cover.jpg".to_string()),
            tags: vec!["fantasy".to_string()],
            metadata,
        };
        LibraryItem::new("it1", "lib1", "/books/earthsea", media)
    }

    #[test]
    fn test_model_to_row_flattens_metadata() {
        let row = ItemRow::try_from(&item()).unwrap();
        assert_eq!(row.title, "A Wizard of Earthsea");
        assert_eq!(row.authors, r#"[{"id":"aut_2","n":"Second"},{"id":"aut_1","n":"First"}]"#);
        assert_eq!(row.series, r#"[{"id":"ser_1","n":"Saga","seq":"1.5"}]"#);
        assert_eq!(row.tags, r#"["fantasy"]"#);
        assert_eq!(row.genres, "[]");
    }

    #[test]
    fn test_row_round_trip_preserves_item() {
        let item = item();
        let row = ItemRow::try_from(&item).unwrap();
        assert_eq!(LibraryItem::try_from(row).unwrap(), item);
    }

    #[test]
    fn test_corrupt_json_column_is_invalid_data() {
        let mut row = ItemRow::try_from(&item()).unwrap();
        row.authors = "not json".to_string();
        let err = LibraryItem::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("authors")));
    }
}
