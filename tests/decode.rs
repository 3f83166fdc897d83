use berita_ner::nlp::labels::{decode, LabeledToken};

fn tagged(pairs: &[(&str, &str)]) -> Vec<LabeledToken> {
    pairs
        .iter()
        .map(|(token, label)| LabeledToken::new(*token, label))
        .collect()
}

#[test]
fn person_and_location() {
    let entities = decode(&tagged(&[
        ("Joko", "B-PER"),
        ("Widodo", "I-PER"),
        ("di", "O"),
        ("Jakarta", "B-LOC"),
    ]));
    insta::assert_json_snapshot!(entities, @r###"
    {
      "PER": [
        "Joko Widodo"
      ],
      "LOC": [
        "Jakarta"
      ]
    }
    "###);
}

#[test]
fn orphan_inside_opens_a_span() {
    let entities = decode(&tagged(&[("X", "I-PER")]));
    assert_eq!(entities.get("PER"), Some(&["X".to_string()][..]));
}

#[test]
fn adjacent_begins_are_separate_entities() {
    let entities = decode(&tagged(&[("A", "B-LOC"), ("B", "B-LOC")]));
    assert_eq!(
        entities.get("LOC"),
        Some(&["A".to_string(), "B".to_string()][..])
    );
}

#[test]
fn type_change_closes_the_span() {
    let entities = decode(&tagged(&[
        ("Bank", "B-ORG"),
        ("Indonesia", "I-LOC"),
        ("pusat", "I-LOC"),
    ]));
    assert_eq!(entities.get("ORG"), Some(&["Bank".to_string()][..]));
    assert_eq!(
        entities.get("LOC"),
        Some(&["Indonesia pusat".to_string()][..])
    );
}

#[test]
fn trailing_span_is_flushed() {
    let entities = decode(&tagged(&[
        ("kunjungan", "O"),
        ("ke", "O"),
        ("Kota", "B-LOC"),
        ("Bogor", "I-LOC"),
    ]));
    assert_eq!(entities.get("LOC"), Some(&["Kota Bogor".to_string()][..]));
}

#[test]
fn repeated_mentions_are_kept_once() {
    let entities = decode(&tagged(&[
        ("Jakarta", "B-LOC"),
        ("dan", "O"),
        ("Jakarta", "B-LOC"),
        ("jakarta", "B-LOC"),
    ]));
    insta::assert_json_snapshot!(entities, @r###"
    {
      "LOC": [
        "Jakarta",
        "jakarta"
      ]
    }
    "###);
}

#[test]
fn all_outside_yields_nothing() {
    let entities = decode(&tagged(&[("hujan", "O"), ("deras", "O")]));
    assert!(entities.is_empty());
}
