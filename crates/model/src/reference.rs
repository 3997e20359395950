use derive_more::Display;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::fmt::Debug;
use time::UtcDateTime;
use uuid::Uuid;

/// Ids starting with this token were generated by a client and do not (yet)
/// point at a durable entity.
pub const PLACEHOLDER_PREFIX: &str = "new";

/// Returns `true` if `id` asks for a new entity to be created rather than
/// referencing an existing one.
///
/// ```
/// use folio_model::is_placeholder;
/// assert!(is_placeholder("new-1"));
/// assert!(is_placeholder("new"));
/// assert!(!is_placeholder("aut_5b7f0c"));
/// assert!(!is_placeholder(""));
/// ```
pub fn is_placeholder(id: &str) -> bool {
    id.starts_with(PLACEHOLDER_PREFIX)
}

/// Kind of durable entity a reference can point at.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    #[display("author")]
    Author,
    #[display("series")]
    Series,
}
impl EntityKind {
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Author => "aut_",
            Self::Series => "ser_",
        }
    }

    /// Generate a fresh, never-reused identifier for an entity of this kind.
    ///
    /// Random (UUIDv4), so concurrent requests need no coordination. The kind
    /// prefix guarantees the result is never mistaken for a placeholder.
    pub fn generate_id(&self) -> String {
        format!("{}{}", self.id_prefix(), Uuid::new_v4().simple())
    }
}

/// A reference record embedded in metadata ([`AuthorRef`](crate::AuthorRef),
/// [`SeriesRef`](crate::SeriesRef)).
pub trait Referent: Sized + Debug + Clone + PartialEq {
    const KIND: EntityKind;
    /// Attributes a client supplies when creating the entity inline.
    type Draft: Debug + Clone + PartialEq;
    /// The durable entity this reference points at.
    type Entity: Debug + Clone;

    fn id(&self) -> &str;

    /// Build a reference to an already-durable entity from wire attributes.
    fn existing(id: String, name: Option<String>, sequence: Option<String>) -> Self;

    /// Capture the wire attributes of an inline creation request.
    fn draft(name: Option<String>, sequence: Option<String>) -> Self::Draft;

    /// Construct the durable entity for `draft` under the freshly generated
    /// `id`, along with the reference that replaces the placeholder.
    ///
    /// Returns `None` if the draft lacks the attributes required to create the
    /// entity (a name, at minimum).
    fn materialize(draft: &Self::Draft, id: String, now: UtcDateTime) -> Option<(Self::Entity, Self)>;

    /// Decide, once, whether wire attributes reference an existing entity or
    /// ask for a new one.
    fn classify(id: String, name: Option<String>, sequence: Option<String>) -> Reference<Self> {
        if is_placeholder(&id) {
            Reference::Pending(Pending {
                placeholder: id,
                draft: Self::draft(name, sequence),
            })
        } else {
            Reference::Existing(Self::existing(id, name, sequence))
        }
    }
}

/// An inline creation request carried in a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Pending<R: Referent> {
    /// The client-generated id, only meaningful within the request.
    pub placeholder: String,
    pub draft: R::Draft,
}

/// A payload reference, classified at the parsing boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference<R: Referent> {
    /// Points at a durable entity.
    Existing(R),
    /// Asks for a new entity to be created from the supplied attributes.
    Pending(Pending<R>),
}
impl<R: Referent> Reference<R> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

#[derive(Deserialize)]
struct WireReference {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sequence: Option<String>,
}

impl<'de, R: Referent> Deserialize<'de> for Reference<R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireReference::deserialize(deserializer)?;
        if wire.id.trim().is_empty() {
            return Err(D::Error::custom(format!("{} reference id must not be empty", R::KIND)));
        }
        Ok(R::classify(wire.id, wire.name, wire.sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthorDraft, AuthorRef, SeriesDraft, SeriesRef};
    use rstest::rstest;

    #[rstest]
    #[case("new", true)]
    #[case("new-1", true)]
    #[case("new_author_17", true)]
    #[case("News", false)]
    #[case("aut_0a1b", false)]
    #[case("", false)]
    fn test_is_placeholder(#[case] id: &str, #[case] expected: bool) {
        assert_eq!(is_placeholder(id), expected);
    }

    #[rstest]
    #[case(EntityKind::Author, "aut_")]
    #[case(EntityKind::Series, "ser_")]
    fn test_generated_ids_are_unique_and_durable(#[case] kind: EntityKind, #[case] prefix: &str) {
        let a = kind.generate_id();
        let b = kind.generate_id();
        assert_ne!(a, b);
        assert!(a.starts_with(prefix));
        assert!(!is_placeholder(&a));
    }

    #[test]
    fn test_deserialize_existing_author() {
        let reference: Reference<AuthorRef> = serde_json::from_str(r#"{"id":"auth1","name":"A"}"#).unwrap();
        assert_eq!(reference, Reference::Existing(AuthorRef::new("auth1", "A")));
    }

    #[test]
    fn test_deserialize_pending_author() {
        let reference: Reference<AuthorRef> = serde_json::from_str(r#"{"id":"new-1","name":"B"}"#).unwrap();
        assert_eq!(
            reference,
            Reference::Pending(Pending {
                placeholder: "new-1".to_string(),
                draft: AuthorDraft { name: Some("B".to_string()) },
            })
        );
    }

    #[test]
    fn test_deserialize_pending_series_keeps_sequence() {
        let reference: Reference<SeriesRef> =
            serde_json::from_str(r#"{"id":"new-s","name":"Saga","sequence":"2"}"#).unwrap();
        let Reference::Pending(pending) = reference else {
            panic!("expected a pending reference");
        };
        assert_eq!(
            pending.draft,
            SeriesDraft {
                name: Some("Saga".to_string()),
                sequence: Some("2".to_string()),
            }
        );
    }

    #[test]
    fn test_deserialize_pending_without_name_is_kept_for_resolution() {
        let reference: Reference<AuthorRef> = serde_json::from_str(r#"{"id":"new-2"}"#).unwrap();
        assert!(reference.is_pending());
    }

    #[rstest]
    #[case(r#"{"id":""}"#)]
    #[case(r#"{"id":"   ","name":"Blank"}"#)]
    #[case(r#"{"name":"No id"}"#)]
    fn test_deserialize_rejects_missing_id(#[case] json: &str) {
        assert!(serde_json::from_str::<Reference<AuthorRef>>(json).is_err());
    }
}
