//! Turning HTML documents into article text.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// Container classes tried in order when a page has no `<article>`.
pub const CONTENT_CLASSES: &[&str] = &[
    "content",
    "article-content",
    "post-content",
    "entry-content",
    "main-content",
    "story-content",
];

/// Elements whose text never belongs to the article.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Class/id fragments marking navigation and other page chrome.
const BOILERPLATE_HINTS: &[&str] = &[
    "nav",
    "menu",
    "sidebar",
    "footer",
    "header",
    "banner",
    "cookie",
    "consent",
    "advert",
    "promo",
    "subscribe",
    "newsletter",
    "related",
    "comment",
];

static ARTICLE: Lazy<Selector> = Lazy::new(|| selector("article"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a"));
static BODY: Lazy<Selector> = Lazy::new(|| selector("body"));
static CANDIDATES: Lazy<Selector> = Lazy::new(|| selector("article, main, section, div"));
static CONTENT_DIVS: Lazy<Vec<Selector>> = Lazy::new(|| {
    CONTENT_CLASSES
        .iter()
        .map(|class| selector(&format!("div.{class}")))
        .collect()
});

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// What to return when a page has neither a content container nor paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Nothing,
    WholePage,
}

/// Locate the article body by structure: `<article>`, then a known content `div`, then every
/// paragraph on the page.
pub fn structural_text(html: &str, fallback: Fallback) -> Option<String> {
    let doc = Html::parse_document(html);

    if let Some(article) = doc.select(&ARTICLE).next() {
        return non_empty(text_lines(article).join("\n"));
    }
    for div_selector in CONTENT_DIVS.iter() {
        if let Some(div) = doc.select(div_selector).next() {
            return non_empty(text_lines(div).join("\n"));
        }
    }
    let paragraphs: Vec<String> = doc
        .select(&PARAGRAPH)
        .map(inline_text)
        .filter(|p| !p.is_empty())
        .collect();
    if !paragraphs.is_empty() {
        return Some(paragraphs.join("\n"));
    }
    match fallback {
        Fallback::Nothing => None,
        Fallback::WholePage => {
            let root = doc.select(&BODY).next().unwrap_or_else(|| doc.root_element());
            non_empty(text_lines(root).join("\n"))
        }
    }
}

/// Readability-style extraction: score every block container by how much non-link text it
/// holds and return the paragraphs of the winner.
pub fn readable_text(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let mut best: Option<(i64, ElementRef<'_>)> = None;

    for el in doc.select(&CANDIDATES) {
        if is_boilerplate(&el) {
            continue;
        }
        let text_chars = text_lines(el).iter().map(|l| l.chars().count()).sum::<usize>();
        if text_chars < 20 {
            continue;
        }
        let link_chars: usize = el
            .select(&LINK)
            .map(|a| a.text().map(|t| t.trim().chars().count()).sum::<usize>())
            .sum();
        let mut score = text_chars as i64 - 2 * link_chars as i64;
        score += match el.value().name() {
            "article" => 500,
            "main" => 300,
            _ => 0,
        };
        score += 25 * el.select(&PARAGRAPH).count() as i64;
        if link_chars > text_chars / 2 {
            score -= 500;
        }
        if best.map_or(true, |(top, _)| score > top) {
            best = Some((score, el));
        }
    }

    let (_, winner) = best.filter(|(score, _)| *score > 0)?;
    let paragraphs: Vec<String> = winner
        .select(&PARAGRAPH)
        .map(inline_text)
        .filter(|p| !p.is_empty())
        .collect();
    if paragraphs.is_empty() {
        non_empty(text_lines(winner).join("\n"))
    } else {
        Some(paragraphs.join("\n"))
    }
}

/// Trimmed, non-empty text nodes under `el`, skipping script-like elements.
pub fn text_lines(el: ElementRef<'_>) -> Vec<String> {
    el.descendants()
        .filter_map(|node| node.value().as_text().map(|text| (node, text)))
        .filter(|(node, _)| {
            !node.ancestors().any(|parent| {
                parent
                    .value()
                    .as_element()
                    .is_some_and(|e| SKIPPED_TAGS.contains(&e.name()))
            })
        })
        .map(|(_, text)| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// All text under `el` on a single line with whitespace collapsed.
fn inline_text(el: ElementRef<'_>) -> String {
    text_lines(el)
        .iter()
        .flat_map(|line| line.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_boilerplate(el: &ElementRef<'_>) -> bool {
    let value = el.value();
    let marker = format!(
        "{} {}",
        value.attr("class").unwrap_or_default(),
        value.attr("id").unwrap_or_default()
    )
    .to_ascii_lowercase();
    BOILERPLATE_HINTS.iter().any(|hint| marker.contains(hint))
}

fn non_empty(text: String) -> Option<String> {
    (!text.trim().is_empty()).then_some(text)
}

/// Trim every line while keeping the line structure.
pub fn tidy_lines(text: &str) -> String {
    text.lines().map(str::trim).collect::<Vec<_>>().join("\n").trim().to_string()
}
