//! CLI entry-point for entity detection.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    config::Settings,
    nlp::{Detection, NerContext},
};

/// Args for the `detect` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Text to analyse.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub text: Option<String>,
    /// Read the text from a file instead.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Extra locations separated by `|`.
    #[arg(long, default_value = "")]
    pub extra_locations: String,
    /// Print entities and token labels as JSON.
    #[arg(long)]
    pub json: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => bail!("either --text or --file is required"),
    };

    let ner = NerContext::from_settings(&settings)?;
    let extra = args.extra_locations;
    let detection = tokio::task::spawn_blocking(move || ner.detect(&text, &extra)).await??;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&detection)?);
    } else {
        print!("{}", render(&detection));
    }
    Ok(())
}

/// One `TYPE: a, b` line per entity type, in first-seen order.
pub fn render(detection: &Detection) -> String {
    if detection.entities.is_empty() {
        return "no entities found\n".to_string();
    }
    detection
        .entities
        .iter()
        .map(|(kind, texts)| format!("{kind}: {}\n", texts.join(", ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::entities::EntityCollection;

    #[test]
    fn render_lists_types_in_order() {
        let entities: EntityCollection = [
            ("PER".to_string(), "joko widodo".to_string()),
            ("LOC".to_string(), "jakarta".to_string()),
            ("LOC".to_string(), "solo".to_string()),
        ]
        .into_iter()
        .collect();
        let detection = Detection {
            tokens: Vec::new(),
            entities,
        };
        assert_eq!(render(&detection), "PER: joko widodo\nLOC: jakarta, solo\n");
    }

    #[test]
    fn render_empty() {
        let detection = Detection {
            tokens: Vec::new(),
            entities: EntityCollection::default(),
        };
        assert_eq!(render(&detection), "no entities found\n");
    }
}
