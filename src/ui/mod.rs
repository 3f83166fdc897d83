//! Server-rendered form page: fetch an article by URL, then detect entities in its text.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, warn};

use crate::{
    api::{routes::run_detection, AppState},
    nlp::{entities::EntityCollection, DetectError},
};

pub const UNAVAILABLE_MESSAGE: &str = "Tidak dapat mengambil konten dari URL tersebut. \
     Mungkin konten dilindungi atau format tidak didukung.";
pub const EMPTY_TEXT_MESSAGE: &str = "Teks kosong, tidak ada entitas yang dapat dideteksi.";

#[derive(Debug, Default, Deserialize)]
pub struct PageForm {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub lokasi_tambahan: String,
}

pub struct Flash {
    pub category: &'static str,
    pub message: String,
}

pub struct EntityRow {
    pub kind: String,
    pub texts: String,
}

#[derive(Template, Default)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub url: String,
    pub text: String,
    pub extra_locations: String,
    pub detected: bool,
    pub rows: Vec<EntityRow>,
    pub flashes: Vec<Flash>,
}

impl IndexPage {
    fn flash(&mut self, category: &'static str, message: impl Into<String>) {
        self.flashes.push(Flash {
            category,
            message: message.into(),
        });
    }

    fn show_entities(&mut self, entities: &EntityCollection) {
        self.detected = true;
        self.rows = entities
            .iter()
            .map(|(kind, texts)| EntityRow {
                kind: kind.to_string(),
                texts: texts.join(", "),
            })
            .collect();
    }
}

pub async fn index() -> Response {
    render(&IndexPage::default())
}

pub async fn submit(State(state): State<AppState>, Form(form): Form<PageForm>) -> Response {
    let mut page = IndexPage {
        url: form.url.clone(),
        text: form.text.clone(),
        extra_locations: form.lokasi_tambahan.clone(),
        ..IndexPage::default()
    };

    match form.action.as_str() {
        "scrap" if !form.url.trim().is_empty() => match state.extractor.extract(&form.url).await {
            Ok(extraction) => page.text = extraction.text,
            Err(failure) => {
                warn!(%failure, "form extraction failed");
                page.flash("danger", UNAVAILABLE_MESSAGE);
            }
        },
        "detect" => match run_detection(&state, form.text, form.lokasi_tambahan).await {
            Ok(detection) => page.show_entities(&detection.entities),
            Err(DetectError::EmptyInput) => page.flash("warning", EMPTY_TEXT_MESSAGE),
            Err(err) => {
                error!(%err, "form detection failed");
                page.flash("danger", format!("Gagal mendeteksi entitas: {err}"));
            }
        },
        _ => {}
    }

    render(&page)
}

fn render(page: &IndexPage) -> Response {
    match page.render() {
        Ok(body) => Html(body).into_response(),
        Err(err) => {
            error!(%err, "template rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "template error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_has_both_forms() {
        let html = IndexPage::default().render().unwrap();
        assert!(html.contains(r#"value="scrap""#));
        assert!(html.contains(r#"value="detect""#));
        assert!(!html.contains("Entitas terdeteksi"));
    }

    #[test]
    fn entities_and_flashes_are_escaped() {
        let mut page = IndexPage::default();
        let entities: EntityCollection = [
            ("LOC".to_string(), "jakarta".to_string()),
            ("LOC".to_string(), "bandung".to_string()),
            ("PER".to_string(), "<b>joko</b>".to_string()),
        ]
        .into_iter()
        .collect();
        page.show_entities(&entities);
        page.flash("warning", EMPTY_TEXT_MESSAGE);

        let html = page.render().unwrap();
        assert!(html.contains("jakarta, bandung"));
        assert!(html.contains("&lt;b&gt;joko&lt;/b&gt;"));
        assert!(html.contains("alert-warning"));
    }
}
