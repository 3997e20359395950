use crate::reference::{EntityKind, Referent};
use crate::timestamp::millis;
use serde::{Deserialize, Serialize};
use time::UtcDateTime;

/// A durable series entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "millis")]
    pub added_at: UtcDateTime,
    #[serde(with = "millis")]
    pub updated_at: UtcDateTime,
}
impl Series {
    pub fn new(id: impl Into<String>, name: impl Into<String>, now: UtcDateTime) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            added_at: now,
            updated_at: now,
        }
    }
}

/// A work's membership of a series, embedded in [`Metadata`](crate::Metadata).
///
/// The position belongs to the membership, not the series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesRef {
    pub id: String,
    pub name: String,
    /// Position within the series; free-form ("1", "2.5", "Book III").
    #[serde(default)]
    pub sequence: Option<String>,
}
impl SeriesRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sequence: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sequence,
        }
    }
}

/// Attributes for a series created inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesDraft {
    pub name: Option<String>,
    pub sequence: Option<String>,
}

impl Referent for SeriesRef {
    const KIND: EntityKind = EntityKind::Series;
    type Draft = SeriesDraft;
    type Entity = Series;

    fn id(&self) -> &str {
        &self.id
    }

    fn existing(id: String, name: Option<String>, sequence: Option<String>) -> Self {
        Self {
            id,
            name: name.unwrap_or_default(),
            sequence,
        }
    }

    fn draft(name: Option<String>, sequence: Option<String>) -> SeriesDraft {
        SeriesDraft { name, sequence }
    }

    fn materialize(draft: &SeriesDraft, id: String, now: UtcDateTime) -> Option<(Series, Self)> {
        let name = draft.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        let series = Series::new(id, name, now);
        let reference = SeriesRef::new(series.id.clone(), series.name.clone(), draft.sequence.clone());
        Some((series, reference))
    }
}
