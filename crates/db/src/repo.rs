//! SQLite-backed [`CatalogStore`].

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{AuthorRow, ItemRow, SeriesRow};
use crate::store::CatalogStore;
use async_trait::async_trait;
use exn::ResultExt;
use facet_json::to_string as to_json;
use folio_model::{Author, LibraryItem, Series};
use sqlx::SqlitePool;
use tracing::instrument;

/// Map a failed insert onto [`ErrorKind::AlreadyExists`] when it tripped the
/// primary key, and a generic database error otherwise.
fn check_insert<T>(result: std::result::Result<T, sqlx::Error>, id: &str) -> Result<()> {
    let Err(err) = result else {
        return Ok(());
    };
    let unique = matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation());
    Err(err).or_raise(|| {
        if unique {
            ErrorKind::AlreadyExists(id.to_string())
        } else {
            ErrorKind::Database
        }
    })
}

/// Repository for library items and the entities their metadata references.
///
/// Items are stored whole, one row each. Authors and series are insert-only;
/// every batch insert runs in a single transaction.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn id_list(ids: &[String]) -> Result<String> {
        to_json(&ids.to_vec()).or_raise(|| ErrorKind::InvalidData("id list"))
    }
}

#[async_trait]
impl CatalogStore for Repository {
    async fn get_item(&self, id: &str) -> Result<Option<LibraryItem>> {
        let row: Option<ItemRow> = sqlx::query_as(include_str!("../queries/get_item.sql"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(LibraryItem::try_from).transpose()
    }

    #[instrument(skip_all, fields(item = %item.id))]
    async fn upsert_item(&self, item: &LibraryItem) -> Result<()> {
        let row = ItemRow::try_from(item)?;
        sqlx::query(include_str!("../queries/upsert_item.sql"))
            .bind(row.id)
            .bind(row.library_id)
            .bind(row.path)
            .bind(row.is_missing)
            .bind(row.is_invalid)
            .bind(row.cover_path)
            .bind(row.tags)
            .bind(row.title)
            .bind(row.subtitle)
            .bind(row.authors)
            .bind(row.series)
            .bind(row.narrators)
            .bind(row.genres)
            .bind(row.published_year)
            .bind(row.publisher)
            .bind(row.description)
            .bind(row.isbn)
            .bind(row.asin)
            .bind(row.language)
            .bind(row.explicit)
            .bind(row.added_at)
            .bind(row.updated_at)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    #[instrument(skip_all, fields(count = authors.len()))]
    async fn insert_authors(&self, authors: &[Author]) -> Result<()> {
        if authors.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        for author in authors {
            let row = AuthorRow::from(author);
            let result = sqlx::query(include_str!("../queries/insert_author.sql"))
                .bind(&row.id)
                .bind(row.name)
                .bind(row.description)
                .bind(row.image_path)
                .bind(row.added_at)
                .bind(row.updated_at)
                .execute(&mut *tx)
                .await;
            check_insert(result, &row.id)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    #[instrument(skip_all, fields(count = series.len()))]
    async fn insert_series(&self, series: &[Series]) -> Result<()> {
        if series.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        for entry in series {
            let row = SeriesRow::from(entry);
            let result = sqlx::query(include_str!("../queries/insert_series.sql"))
                .bind(&row.id)
                .bind(row.name)
                .bind(row.description)
                .bind(row.added_at)
                .bind(row.updated_at)
                .execute(&mut *tx)
                .await;
            check_insert(result, &row.id)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    async fn get_authors(&self, ids: &[String]) -> Result<Vec<Author>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<AuthorRow> = sqlx::query_as(include_str!("../queries/get_authors.sql"))
            .bind(Self::id_list(ids)?)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Author::try_from).collect()
    }

    async fn get_series(&self, ids: &[String]) -> Result<Vec<Series>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<SeriesRow> = sqlx::query_as(include_str!("../queries/get_series.sql"))
            .bind(Self::id_list(ids)?)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Series::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{AuthorRef, Media, Metadata, timestamp};

    async fn repo() -> Repository {
        let db = Database::connect_in_memory().await.unwrap();
        Repository::from(&db)
    }

    fn item(id: &str) -> LibraryItem {
        let metadata = Metadata {
            authors: vec![AuthorRef::new("aut_1", "Ursula")],
            ..Metadata::new("A Wizard of Earthsea")
        };
        let media = Media {
            cover_path: Some(format!("{id}/cover.jpg")),
            tags: vec![],
            metadata,
        };
        LibraryItem::new(id, "lib1", format!("/books/{id}"), media)
    }

    #[tokio::test]
    async fn test_get_missing_item() {
        let repo = repo().await;
        assert!(repo.get_item("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_then_get_item() {
        let repo = repo().await;
        let item = item("it1");
        repo.upsert_item(&item).await.unwrap();
        assert_eq!(repo.get_item("it1").await.unwrap(), Some(item));
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_item() {
        let repo = repo().await;
        let mut item = item("it1");
        repo.upsert_item(&item).await.unwrap();
        item.media.cover_path = None;
        item.media.metadata.title = "The Tombs of Atuan".to_string();
        repo.upsert_item(&item).await.unwrap();
        let stored = repo.get_item("it1").await.unwrap().unwrap();
        assert_eq!(stored.media.cover_path, None);
        assert_eq!(stored.media.metadata.title, "The Tombs of Atuan");
    }

    #[tokio::test]
    async fn test_insert_and_get_authors() {
        let repo = repo().await;
        let now = timestamp::now();
        let authors = vec![Author::new("aut_1", "Ursula", now), Author::new("aut_2", "Terry", now)];
        repo.insert_authors(&authors).await.unwrap();
        let mut found = repo
            .get_authors(&["aut_2".to_string(), "aut_1".to_string(), "aut_9".to_string()])
            .await
            .unwrap();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(found, authors);
    }

    #[tokio::test]
    async fn test_duplicate_author_rolls_back_batch() {
        let repo = repo().await;
        let now = timestamp::now();
        repo.insert_authors(&[Author::new("aut_1", "Ursula", now)]).await.unwrap();
        let batch = vec![Author::new("aut_2", "Terry", now), Author::new("aut_1", "Again", now)];
        let err = repo.insert_authors(&batch).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(id) if id == "aut_1"));
        assert!(repo.get_authors(&["aut_2".to_string()]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_get_series() {
        let repo = repo().await;
        let series = vec![Series::new("ser_1", "Earthsea", timestamp::now())];
        repo.insert_series(&series).await.unwrap();
        assert_eq!(repo.get_series(&["ser_1".to_string()]).await.unwrap(), series);
    }

    #[tokio::test]
    async fn test_empty_batches_are_noops() {
        let repo = repo().await;
        repo.insert_authors(&[]).await.unwrap();
        repo.insert_series(&[]).await.unwrap();
        assert!(repo.get_authors(&[]).await.unwrap().is_empty());
        assert!(repo.get_series(&[]).await.unwrap().is_empty());
    }
}
