//! Text normalisation shared by direct input and scraped articles.
//!
//! The output of [`normalize`] is what the vocabulary was built from: lower-case text, dates in
//! `d/m/y` form, and nothing but word characters, whitespace and `/`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Indonesian month names and their two-digit numbers.
const MONTHS: &[(&str, &str)] = &[
    ("januari", "01"),
    ("februari", "02"),
    ("maret", "03"),
    ("april", "04"),
    ("mei", "05"),
    ("juni", "06"),
    ("juli", "07"),
    ("agustus", "08"),
    ("september", "09"),
    ("oktober", "10"),
    ("november", "11"),
    ("desember", "12"),
];

static PARENTHESISED_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d{1,2}/\d{1,2}/\d{4})\)").expect("valid regex"));

/// Each month gets its own group (`m01`..`m12`) so the number comes from whichever alternative
/// matched, under the same case folding the regex applies.
static MONTH_NAME_DATE: Lazy<Regex> = Lazy::new(|| {
    let names = MONTHS
        .iter()
        .map(|(name, number)| format!("(?P<m{number}>{name})"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?i)\b(?P<day>\d{{1,2}})\s+(?:{names})\s+(?P<year>\d{{4}})\b"
    ))
    .expect("valid regex")
});

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("valid regex"));

static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{2,4})\b").expect("valid regex"));

static DASH_OR_DOT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})[-.](\d{1,2})[-.](\d{4})\b").expect("valid regex"));

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s/]").expect("valid regex"));

/// Normalise raw text into the form the labelling model was trained on.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let dated = normalize_dates(&lowered);
    let stripped = DISALLOWED.replace_all(&dated, "");
    // Stripping can glue a month-name date back together ("1 mei, 2023"), so dates get a
    // second pass to keep the function idempotent.
    normalize_dates(&stripped).trim().to_string()
}

/// Rewrite the supported date spellings into `d/m/y`.
///
/// Day and month digits are copied as written. Values are not checked against the calendar,
/// so `45/13/2022` survives untouched.
pub fn normalize_dates(text: &str) -> String {
    let text = PARENTHESISED_DATE.replace_all(text, "$1");
    let text = MONTH_NAME_DATE.replace_all(&text, |caps: &Captures<'_>| {
        match matched_month(caps) {
            Some(month) => format!("{}/{}/{}", &caps["day"], month, &caps["year"]),
            None => caps[0].to_string(),
        }
    });
    let text = ISO_DATE.replace_all(&text, "${3}/${2}/${1}");
    let text = SLASH_DATE.replace_all(&text, "${1}/${2}/${3}");
    let text = DASH_OR_DOT_DATE.replace_all(&text, "${1}/${2}/${3}");
    text.into_owned()
}

fn matched_month(caps: &Captures<'_>) -> Option<&'static str> {
    MONTHS
        .iter()
        .map(|(_, number)| *number)
        .find(|number| caps.name(&format!("m{number}")).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_are_case_insensitive() {
        assert_eq!(normalize_dates("1 MEI 2023"), "1/05/2023");
        assert_eq!(normalize_dates("17 Agustus 1945"), "17/08/1945");
    }

    #[test]
    fn month_lookup_follows_regex_case_folding() {
        assert_eq!(normalize_dates("1 ſeptember 2023"), "1/09/2023");
        assert_eq!(normalize_dates("9 DESEMBER 2021"), "9/12/2021");
    }

    #[test]
    fn dotted_and_dashed_dates_use_slashes() {
        assert_eq!(normalize_dates("21-12-2022"), "21/12/2022");
        assert_eq!(normalize_dates("21.12.2022"), "21/12/2022");
    }

    #[test]
    fn out_of_range_dates_pass_through() {
        assert_eq!(normalize_dates("45-13-2022"), "45/13/2022");
    }

    #[test]
    fn normalize_strips_punctuation_but_keeps_slashes() {
        assert_eq!(
            normalize("Presiden Joko Widodo, tiba di Jakarta (21/12/2022)!"),
            "presiden joko widodo tiba di jakarta 21/12/2022"
        );
    }

    #[test]
    fn comma_between_month_and_year_still_canonicalises() {
        assert_eq!(normalize("1 Mei, 2023"), "1/05/2023");
    }
}
