//! Text-to-entity pipeline: normalise, tokenise, index, tag, decode, enrich.

pub mod entities;
pub mod labels;
pub mod model;
pub mod normalize;
pub mod tokenize;
pub mod vocab;

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::Settings;
use entities::EntityCollection;
use labels::{Label, LabeledToken};
use model::{GazetteerLabeler, ModelError, SequenceLabeler};
use vocab::Vocabulary;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("no text to analyse")]
    EmptyInput,
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Outcome of a detection request.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    /// Tokens that reached the model, with their predicted labels.
    pub tokens: Vec<LabeledToken>,
    pub entities: EntityCollection,
}

/// Immutable state shared by every detection request.
pub struct NerContext {
    vocab: Vocabulary,
    labeler: Arc<dyn SequenceLabeler>,
    max_len: usize,
    location_label: String,
}

impl NerContext {
    pub fn new(
        vocab: Vocabulary,
        labeler: Arc<dyn SequenceLabeler>,
        max_len: usize,
        location_label: impl Into<String>,
    ) -> Self {
        Self {
            vocab,
            labeler,
            max_len: max_len.max(1),
            location_label: location_label.into(),
        }
    }

    /// Load the vocabulary and the best available tagger described by `settings`.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let vocab = Vocabulary::load(&settings.word_vocab_path, &settings.label_vocab_path)
            .context("loading vocabulary")?;
        let labeler = load_labeler(settings, &vocab)?;
        Ok(Self::new(
            vocab,
            labeler,
            settings.max_seq_len,
            settings.location_label.clone(),
        ))
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn location_label(&self) -> &str {
        &self.location_label
    }

    /// Label every token of `text` that fits in the model window.
    pub fn predict(&self, text: &str) -> Result<Vec<LabeledToken>, DetectError> {
        let normalized = normalize::normalize(text);
        let tokens = tokenize::tokenize(&normalized);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let encoded = self.vocab.encode(&tokens, self.max_len);
        if encoded.len < tokens.len() {
            warn!(
                tokens = tokens.len(),
                max_len = self.max_len,
                "input truncated to model window"
            );
        }
        let probs = self.labeler.predict(&encoded.ids)?;
        let predicted = model::argmax_rows(&probs, encoded.len)?;

        Ok(tokens
            .into_iter()
            .zip(predicted)
            .map(|(token, index)| {
                let label = match self.vocab.label(index) {
                    Some(label) => label.clone(),
                    None => {
                        warn!(index, %token, "model emitted unknown label index");
                        Label::Outside
                    }
                };
                LabeledToken { token, label }
            })
            .collect())
    }

    /// Detect entities in `text` and merge `extra_locations` (`a|b|c`) into the location bucket.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub fn detect(&self, text: &str, extra_locations: &str) -> Result<Detection, DetectError> {
        if text.trim().is_empty() {
            return Err(DetectError::EmptyInput);
        }
        let tokens = self.predict(text)?;
        let decoded = labels::decode(&tokens);
        let entities = entities::enhance(decoded, &self.location_label, extra_locations);
        debug!(types = entities.len(), "decoded entities");
        Ok(Detection { tokens, entities })
    }
}

fn load_labeler(settings: &Settings, vocab: &Vocabulary) -> anyhow::Result<Arc<dyn SequenceLabeler>> {
    #[cfg(feature = "onnx")]
    {
        if settings.model_path.exists() {
            let labeler = model::OnnxLabeler::load(&settings.model_path)
                .with_context(|| format!("loading model {}", settings.model_path.display()))?;
            return Ok(Arc::new(labeler));
        }
        warn!(path = %settings.model_path.display(), "model file missing; using gazetteer");
    }
    #[cfg(not(feature = "onnx"))]
    info!("built without onnx support; using gazetteer tagger");

    let gazetteer = match &settings.gazetteer_path {
        Some(path) => GazetteerLabeler::from_csv(vocab, path)?,
        None => GazetteerLabeler::seeded(vocab)?,
    };
    info!(entries = gazetteer.len(), "gazetteer tagger ready");
    Ok(Arc::new(gazetteer))
}
