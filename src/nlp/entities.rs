//! Entity buckets keyed by type, plus merging of user-supplied locations.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Separator between supplementary location names.
pub const EXTRA_SEPARATOR: char = '|';

/// A single detected entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub entity_type: String,
    pub text: String,
}

/// Entity texts grouped by type.
///
/// Types keep the order in which they were first seen and every bucket is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityCollection(IndexMap<String, Vec<String>>);

impl EntityCollection {
    /// Add `text` under `kind` unless the bucket already holds that exact string.
    ///
    /// Returns whether the text was added. Blank text is ignored.
    pub fn insert(&mut self, kind: &str, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.trim().is_empty() {
            return false;
        }
        let bucket = self.bucket_mut(kind);
        if bucket.contains(&text) {
            return false;
        }
        bucket.push(text);
        true
    }

    pub fn get(&self, kind: &str) -> Option<&[String]> {
        self.0.get(kind).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Flatten into individual entities, in bucket order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.0.iter().flat_map(|(kind, texts)| {
            texts.iter().map(move |text| Entity {
                entity_type: kind.clone(),
                text: text.clone(),
            })
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn bucket_mut(&mut self, kind: &str) -> &mut Vec<String> {
        self.0.entry(kind.to_string()).or_default()
    }

    /// Swap in a new bucket for `kind`, dropping the key when `texts` is empty.
    fn replace(&mut self, kind: &str, texts: Vec<String>) {
        if texts.is_empty() {
            self.0.shift_remove(kind);
        } else {
            *self.bucket_mut(kind) = texts;
        }
    }
}

impl FromIterator<(String, String)> for EntityCollection {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut entities = Self::default();
        for (kind, text) in iter {
            entities.insert(&kind, text);
        }
        entities
    }
}

/// Split a `|`-separated list of supplementary names, dropping blank items.
pub fn split_extra(extra: &str) -> Vec<String> {
    extra
        .split(EXTRA_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Merge supplementary location names into the `location_kind` bucket.
///
/// A supplementary name is appended only when no existing entry matches it ignoring case. The
/// merged bucket is then deduplicated by exact string, keeping first occurrences.
pub fn enhance(
    mut entities: EntityCollection,
    location_kind: &str,
    extra: &str,
) -> EntityCollection {
    let supplementary = split_extra(extra);
    let mut merged: Vec<String> = entities
        .get(location_kind)
        .map(<[String]>::to_vec)
        .unwrap_or_default();
    let mut seen: HashSet<String> = merged.iter().map(|loc| loc.to_lowercase()).collect();

    for loc in supplementary {
        if seen.insert(loc.to_lowercase()) {
            merged.push(loc);
        }
    }

    let mut exact = HashSet::new();
    merged.retain(|loc| exact.insert(loc.clone()));
    entities.replace(location_kind, merged);
    entities
}
