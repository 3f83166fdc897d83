//! Word tokenisation matching the filter set used when the vocabulary was built.

/// Characters replaced by a separator before splitting. `/` is absent so dates stay whole.
pub const FILTERS: &str = "!\"#$%&()*+,-.:;<=>?@[\\]^_`{|}~\t\n";

/// Split normalised text into lower-case word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .map(|c| if FILTERS.contains(c) { ' ' } else { c })
        .collect();
    cleaned
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
