use crate::reference::{EntityKind, Referent};
use crate::timestamp::millis;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use time::UtcDateTime;

/// A durable author entity.
///
/// Created exactly once (either by ingestion or inline from a placeholder
/// reference) and never implicitly updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    #[serde(with = "millis")]
    pub added_at: UtcDateTime,
    #[serde(with = "millis")]
    pub updated_at: UtcDateTime,
}
impl Author {
    pub fn new(id: impl Into<String>, name: impl Into<String>, now: UtcDateTime) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            image_path: None,
            added_at: now,
            updated_at: now,
        }
    }
}
impl Display for Author {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// An author credit embedded in [`Metadata`](crate::Metadata).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: String,
    pub name: String,
}
impl AuthorRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}
impl From<&Author> for AuthorRef {
    fn from(author: &Author) -> Self {
        Self::new(author.id.clone(), author.name.clone())
    }
}

/// Attributes for an author created inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorDraft {
    pub name: Option<String>,
}

impl Referent for AuthorRef {
    const KIND: EntityKind = EntityKind::Author;
    type Draft = AuthorDraft;
    type Entity = Author;

    fn id(&self) -> &str {
        &self.id
    }

    fn existing(id: String, name: Option<String>, _sequence: Option<String>) -> Self {
        Self { id, name: name.unwrap_or_default() }
    }

    fn draft(name: Option<String>, _sequence: Option<String>) -> AuthorDraft {
        AuthorDraft { name }
    }

    fn materialize(draft: &AuthorDraft, id: String, now: UtcDateTime) -> Option<(Author, Self)> {
        let name = draft.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        let author = Author::new(id, name, now);
        let reference = AuthorRef::from(&author);
        Some((author, reference))
    }
}
