use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use folio_model::timestamp::{from_millis, to_millis};
use folio_model::{Author, Series};

#[derive(sqlx::FromRow)]
pub(crate) struct AuthorRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) image_path: Option<String>,
    pub(crate) added_at: i64,
    pub(crate) updated_at: i64,
}
impl From<&Author> for AuthorRow {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id.clone(),
            name: author.name.clone(),
            description: author.description.clone(),
            image_path: author.image_path.clone(),
            added_at: to_millis(author.added_at),
            updated_at: to_millis(author.updated_at),
        }
    }
}
impl TryFrom<AuthorRow> for Author {
    type Error = Error;
    fn try_from(row: AuthorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            image_path: row.image_path,
            added_at: from_millis(row.added_at).or_raise(|| ErrorKind::InvalidData("author added date"))?,
            updated_at: from_millis(row.updated_at).or_raise(|| ErrorKind::InvalidData("author updated date"))?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SeriesRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) added_at: i64,
    pub(crate) updated_at: i64,
}
impl From<&Series> for SeriesRow {
    fn from(series: &Series) -> Self {
        Self {
            id: series.id.clone(),
            name: series.name.clone(),
            description: series.description.clone(),
            added_at: to_millis(series.added_at),
            updated_at: to_millis(series.updated_at),
        }
    }
}
impl TryFrom<SeriesRow> for Series {
    type Error = Error;
    fn try_from(row: SeriesRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            added_at: from_millis(row.added_at).or_raise(|| ErrorKind::InvalidData("series added date"))?,
            updated_at: from_millis(row.updated_at).or_raise(|| ErrorKind::InvalidData("series updated date"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::timestamp;

    #[test]
    fn test_author_row_round_trip() {
        let author = Author::new("aut_1", "Ursula", timestamp::now());
        let row = AuthorRow::from(&author);
        assert_eq!(Author::try_from(row).unwrap(), author);
    }

    #[test]
    fn test_series_row_round_trip() {
        let series = Series::new("ser_1", "Earthsea", timestamp::now());
        let row = SeriesRow::from(&series);
        assert_eq!(Series::try_from(row).unwrap(), series);
    }

    #[test]
    fn test_out_of_range_timestamp_is_invalid_data() {
        let row = SeriesRow {
            id: "ser_1".to_string(),
            name: "Earthsea".to_string(),
            description: None,
            added_at: i64::MAX,
            updated_at: 0,
        };
        let err = Series::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData(_)));
    }
}
