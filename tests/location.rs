use berita_ner::nlp::entities::{enhance, EntityCollection};

fn collection(pairs: &[(&str, &str)]) -> EntityCollection {
    pairs
        .iter()
        .map(|(kind, text)| (kind.to_string(), text.to_string()))
        .collect()
}

fn locations(entities: &EntityCollection) -> Vec<&str> {
    entities
        .get("LOC")
        .map(|items| items.iter().map(String::as_str).collect())
        .unwrap_or_default()
}

#[test]
fn case_insensitive_match_is_not_duplicated() {
    let merged = enhance(collection(&[("LOC", "jakarta")]), "LOC", "Jakarta|Bandung");
    assert_eq!(locations(&merged), vec!["jakarta", "Bandung"]);
}

#[test]
fn empty_extra_changes_nothing() {
    let original = collection(&[("PER", "joko widodo"), ("LOC", "solo")]);
    assert_eq!(enhance(original.clone(), "LOC", ""), original);
}

#[test]
fn blank_items_are_ignored() {
    let merged = enhance(collection(&[("PER", "anies")]), "LOC", " | Depok ||  ");
    assert_eq!(locations(&merged), vec!["Depok"]);
    assert_eq!(merged.get("PER"), Some(&["anies".to_string()][..]));
}

#[test]
fn no_location_bucket_is_created_for_nothing() {
    let merged = enhance(collection(&[("PER", "anies")]), "LOC", "|");
    assert!(merged.get("LOC").is_none());
}

#[test]
fn supplementary_names_dedup_among_themselves() {
    let merged = enhance(EntityCollection::default(), "LOC", "Bekasi|bekasi|Bogor|Bekasi");
    assert_eq!(locations(&merged), vec!["Bekasi", "Bogor"]);
}

#[test]
fn custom_location_type() {
    let merged = enhance(collection(&[("GPE", "medan")]), "GPE", "Binjai");
    assert_eq!(merged.get("GPE").map(<[String]>::len), Some(2));
    assert!(merged.get("LOC").is_none());
}

#[test]
fn case_variants_within_extra_collapse_to_first() {
    let merged = enhance(EntityCollection::default(), "LOC", "Bandung|bandung");
    assert_eq!(locations(&merged), vec!["Bandung"]);
}
