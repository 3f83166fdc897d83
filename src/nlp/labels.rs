//! BIO label parsing and span decoding.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::nlp::entities::EntityCollection;

/// A tag from the model's label set, parsed once when the label table is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    /// `O`: the token is outside every entity.
    Outside,
    /// First token of a span.
    Begin(String),
    /// Continuation of a span of the same type.
    Inside(String),
}

impl Label {
    /// Parse a raw tag such as `B-PER`, `I-LOC` or `O`.
    ///
    /// The prefix is whatever precedes the first `-`. Only `B` opens a span explicitly; any other
    /// prefix continues one. A tag without `-` is a begin tag for the whole string.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == "O" {
            return Self::Outside;
        }
        match raw.split_once('-') {
            Some(("B", kind)) => Self::Begin(kind.to_string()),
            Some((_, kind)) => Self::Inside(kind.to_string()),
            None => Self::Begin(raw.to_string()),
        }
    }

    /// Entity type carried by the tag, if any.
    pub fn entity_type(&self) -> Option<&str> {
        match self {
            Self::Outside => None,
            Self::Begin(kind) | Self::Inside(kind) => Some(kind),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outside => f.write_str("O"),
            Self::Begin(kind) => write!(f, "B-{kind}"),
            Self::Inside(kind) => write!(f, "I-{kind}"),
        }
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A token paired with the label predicted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledToken {
    pub token: String,
    pub label: Label,
}

impl LabeledToken {
    pub fn new(token: impl Into<String>, raw_label: &str) -> Self {
        Self {
            token: token.into(),
            label: Label::parse(raw_label),
        }
    }
}

/// Group a labelled token sequence into entities.
///
/// A span is closed by `O`, by a `B-` tag, by a tag of a different type, or by the end of the
/// sequence. Entity text is the span's tokens joined by single spaces; a text already present
/// in its type's bucket is not added twice.
pub fn decode(labeled: &[LabeledToken]) -> EntityCollection {
    let mut entities = EntityCollection::default();
    let mut span: Vec<&str> = Vec::new();
    let mut current: Option<&str> = None;

    for item in labeled {
        match &item.label {
            Label::Outside => {
                close_span(&mut entities, current.take(), &mut span);
            }
            Label::Inside(kind) if current == Some(kind.as_str()) => {
                span.push(&item.token);
            }
            Label::Begin(kind) | Label::Inside(kind) => {
                close_span(&mut entities, current, &mut span);
                span.push(&item.token);
                current = Some(kind.as_str());
            }
        }
    }
    close_span(&mut entities, current, &mut span);

    entities
}

fn close_span(entities: &mut EntityCollection, kind: Option<&str>, span: &mut Vec<&str>) {
    if let Some(kind) = kind {
        if !span.is_empty() {
            entities.insert(kind, span.join(" "));
        }
    }
    span.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_and_bare_labels() {
        assert_eq!(Label::parse("O"), Label::Outside);
        assert_eq!(Label::parse("B-PER"), Label::Begin("PER".into()));
        assert_eq!(Label::parse("I-LOC"), Label::Inside("LOC".into()));
        assert_eq!(Label::parse("DATE"), Label::Begin("DATE".into()));
        assert_eq!(Label::parse("B-GEO-POL"), Label::Begin("GEO-POL".into()));
    }

    #[test]
    fn unknown_prefix_continues_a_span() {
        assert_eq!(Label::parse("E-ORG"), Label::Inside("ORG".into()));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for raw in ["O", "B-PER", "I-ORG"] {
            assert_eq!(Label::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn type_change_under_inside_tag_opens_new_span() {
        let labeled = vec![
            LabeledToken::new("bank", "B-ORG"),
            LabeledToken::new("jakarta", "I-LOC"),
        ];
        let entities = decode(&labeled);
        assert_eq!(entities.get("ORG"), Some(&["bank".to_string()][..]));
        assert_eq!(entities.get("LOC"), Some(&["jakarta".to_string()][..]));
    }

    #[test]
    fn repeated_entity_is_stored_once() {
        let labeled = vec![
            LabeledToken::new("jakarta", "B-LOC"),
            LabeledToken::new("dan", "O"),
            LabeledToken::new("jakarta", "B-LOC"),
        ];
        assert_eq!(decode(&labeled).get("LOC").map(<[String]>::len), Some(1));
    }

    #[test]
    fn all_outside_yields_no_buckets() {
        let labeled = vec![LabeledToken::new("di", "O"), LabeledToken::new("sana", "O")];
        assert!(decode(&labeled).is_empty());
    }
}
