use folio_model::{AuthorRef, SeriesRef};

#[derive(facet::Facet)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct AuthorRefProxy {
    id: String,
    #[facet(rename = "n")]
    name: String,
}
impl From<&AuthorRef> for AuthorRefProxy {
    fn from(author: &AuthorRef) -> Self {
        Self {
            id: author.id.clone(),
            name: author.name.clone(),
        }
    }
}
impl From<AuthorRefProxy> for AuthorRef {
    fn from(author: AuthorRefProxy) -> Self {
        Self::new(author.id, author.name)
    }
}

#[derive(facet::Facet)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct SeriesRefProxy {
    id: String,
    #[facet(rename = "n")]
    name: String,
    #[facet(rename = "seq", default, transparent, skip_serializing_if = Option::is_none)]
    sequence: Option<String>,
}
impl From<&SeriesRef> for SeriesRefProxy {
    fn from(series: &SeriesRef) -> Self {
        Self {
            id: series.id.clone(),
            name: series.name.clone(),
            sequence: series.sequence.clone(),
        }
    }
}
impl From<SeriesRefProxy> for SeriesRef {
    fn from(series: SeriesRefProxy) -> Self {
        Self::new(series.id, series.name, series.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_json::{from_str as from_json, to_string as to_json};
    use rstest::rstest;

    fn series(id: &str, name: &str, sequence: Option<&str>) -> SeriesRefProxy {
        SeriesRefProxy {
            id: id.to_string(),
            name: name.to_string(),
            sequence: sequence.map(str::to_string),
        }
    }

    #[test]
    fn test_author_ref_serialize() {
        let input = AuthorRefProxy {
            id: "aut_1".to_string(),
            name: "Ursula".to_string(),
        };
        assert_eq!(to_json(&input).unwrap(), r#"{"id":"aut_1","n":"Ursula"}"#);
    }

    #[test]
    fn test_author_ref_deserialize() {
        let obj = from_json::<AuthorRefProxy>(r#"{"id":"aut_1","n":"Ursula"}"#).unwrap();
        assert_eq!(AuthorRef::from(obj), AuthorRef::new("aut_1", "Ursula"));
    }

    #[rstest]
    #[case(series("ser_1", "Earthsea", None), r#"{"id":"ser_1","n":"Earthsea"}"#)]
    #[case(series("ser_1", "Earthsea", Some("2")), r#"{"id":"ser_1","n":"Earthsea","seq":"2"}"#)]
    fn test_series_ref_serialize(#[case] input: SeriesRefProxy, #[case] expected: &str) {
        assert_eq!(to_json(&input).unwrap(), expected);
    }

    #[rstest]
    #[case(series("ser_1", "Earthsea", None), r#"{"id":"ser_1","n":"Earthsea"}"#)]
    #[case(series("ser_1", "Earthsea", Some("2")), r#"{"id":"ser_1","n":"Earthsea","seq":"2"}"#)]
    fn test_series_ref_deserialize(#[case] expected: SeriesRefProxy, #[case] input: &str) {
        assert_eq!(from_json::<SeriesRefProxy>(input).unwrap(), expected);
    }

    #[test]
    fn test_author_ref_vec_preserves_order() {
        let input = vec![
            AuthorRefProxy::from(&AuthorRef::new("aut_b", "B")),
            AuthorRefProxy::from(&AuthorRef::new("aut_a", "A")),
        ];
        let json = to_json(&input).unwrap();
        assert_eq!(json, r#"[{"id":"aut_b","n":"B"},{"id":"aut_a","n":"A"}]"#);
        let obj = from_json::<Vec<AuthorRefProxy>>(&json).unwrap();
        assert_eq!(obj, input);
    }
}
