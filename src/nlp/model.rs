//! Sequence labelling backends. The ONNX export of the trained tagger is used when the `onnx`
//! feature is enabled; otherwise a gazetteer stands in for it.

use std::{collections::HashMap, path::Path};

use ndarray::Array2;
use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::{debug, info};

use crate::nlp::{labels::Label, vocab::Vocabulary};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model produced {got} positions, expected at least {expected}")]
    ShortOutput { got: usize, expected: usize },
    #[error("model output has unexpected shape {0:?}")]
    Shape(Vec<usize>),
    #[error("label vocabulary has no O tag")]
    NoOutsideLabel,
    #[error("reading gazetteer {path}: {source}")]
    Gazetteer {
        path: std::path::PathBuf,
        source: csv::Error,
    },
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Black-box tagger: a fixed-length index sequence in, one label distribution per position out.
pub trait SequenceLabeler: Send + Sync {
    /// Returns a `(positions, labels)` probability matrix.
    fn predict(&self, ids: &[u32]) -> Result<Array2<f32>, ModelError>;
}

/// Arg-max label index for each of the first `take` rows. Ties resolve to the lowest index.
pub fn argmax_rows(probs: &Array2<f32>, take: usize) -> Result<Vec<usize>, ModelError> {
    if probs.nrows() < take {
        return Err(ModelError::ShortOutput {
            got: probs.nrows(),
            expected: take,
        });
    }
    Ok(probs
        .rows()
        .into_iter()
        .take(take)
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0usize, f32::NEG_INFINITY), |best, (idx, &p)| {
                    if p > best.1 {
                        (idx, p)
                    } else {
                        best
                    }
                })
                .0
        })
        .collect())
}

/// Seed entries used by the gazetteer when no dictionary file is configured.
static SEED_GAZETTEER: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("jakarta", "B-LOC"),
        ("bandung", "B-LOC"),
        ("surabaya", "B-LOC"),
        ("semarang", "B-LOC"),
        ("yogyakarta", "B-LOC"),
        ("medan", "B-LOC"),
        ("makassar", "B-LOC"),
        ("palembang", "B-LOC"),
        ("denpasar", "B-LOC"),
        ("bogor", "B-LOC"),
        ("indonesia", "B-LOC"),
        ("jokowi", "B-PER"),
        ("prabowo", "B-PER"),
        ("gibran", "B-PER"),
        ("anies", "B-PER"),
        ("ganjar", "B-PER"),
        ("polri", "B-ORG"),
        ("tni", "B-ORG"),
        ("kpk", "B-ORG"),
        ("dpr", "B-ORG"),
        ("bmkg", "B-ORG"),
        ("bnpb", "B-ORG"),
    ]
});

/// Dictionary tagger emitting one-hot distributions, used when no trained model is available.
pub struct GazetteerLabeler {
    by_index: HashMap<u32, usize>,
    outside: usize,
    width: usize,
}

impl GazetteerLabeler {
    /// Build from `(token, raw label)` entries. Entries whose token is out of vocabulary or
    /// whose label the model does not know are skipped.
    pub fn new<'a, I>(vocab: &Vocabulary, entries: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let outside = vocab
            .label_index(&Label::Outside)
            .ok_or(ModelError::NoOutsideLabel)?;
        let mut by_index = HashMap::new();
        for (token, raw_label) in entries {
            let Some(label_idx) = vocab.label_index(&Label::parse(raw_label)) else {
                debug!(%token, %raw_label, "gazetteer label unknown to model");
                continue;
            };
            if !vocab.contains(token) {
                debug!(%token, "gazetteer token out of vocabulary");
                continue;
            }
            by_index.insert(vocab.index_of(token), label_idx);
        }
        Ok(Self {
            by_index,
            outside,
            width: vocab.label_count(),
        })
    }

    /// Gazetteer built from the built-in seed list.
    pub fn seeded(vocab: &Vocabulary) -> Result<Self, ModelError> {
        Self::new(vocab, SEED_GAZETTEER.iter().copied())
    }

    /// Seed list extended with a `token,label` CSV.
    pub fn from_csv(vocab: &Vocabulary, path: &Path) -> Result<Self, ModelError> {
        let gazetteer_err = |source: csv::Error| ModelError::Gazetteer {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(gazetteer_err)?;
        let mut rows: Vec<(String, String)> = Vec::new();
        for row in reader.deserialize::<(String, String)>() {
            let (token, label) = row.map_err(gazetteer_err)?;
            rows.push((token.trim().to_lowercase(), label.trim().to_string()));
        }
        info!(path = %path.display(), entries = rows.len(), "loaded gazetteer");
        let mut entries: Vec<(&str, &str)> = SEED_GAZETTEER.to_vec();
        entries.extend(rows.iter().map(|(t, l)| (t.as_str(), l.as_str())));
        Self::new(vocab, entries)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }
}

impl SequenceLabeler for GazetteerLabeler {
    fn predict(&self, ids: &[u32]) -> Result<Array2<f32>, ModelError> {
        let mut probs = Array2::<f32>::zeros((ids.len(), self.width));
        for (pos, id) in ids.iter().enumerate() {
            let label = self.by_index.get(id).copied().unwrap_or(self.outside);
            probs[[pos, label]] = 1.0;
        }
        Ok(probs)
    }
}

#[cfg(feature = "onnx")]
pub use onnx::OnnxLabeler;

#[cfg(feature = "onnx")]
mod onnx {
    use std::path::Path;

    use ndarray::{Array2, CowArray};
    use ort::{Environment, GraphOptimizationLevel, OrtOwnedTensor, Session, SessionBuilder, Value};
    use tracing::info;

    use super::{ModelError, SequenceLabeler};

    fn inference_err(err: impl std::fmt::Display) -> ModelError {
        ModelError::Inference(err.to_string())
    }

    /// ONNX export of the trained tagger. Expects a float `[1, max_len]` input and produces
    /// `[1, max_len, labels]` softmax scores.
    pub struct OnnxLabeler {
        session: Session,
    }

    impl OnnxLabeler {
        pub fn load(path: &Path) -> Result<Self, ModelError> {
            let environment = Environment::builder()
                .with_name("berita-ner")
                .build()
                .map_err(inference_err)?
                .into_arc();
            let session = SessionBuilder::new(&environment)
                .map_err(inference_err)?
                .with_optimization_level(GraphOptimizationLevel::Level1)
                .map_err(inference_err)?
                .with_model_from_file(path)
                .map_err(inference_err)?;
            info!(path = %path.display(), "loaded onnx tagger");
            Ok(Self { session })
        }
    }

    impl SequenceLabeler for OnnxLabeler {
        fn predict(&self, ids: &[u32]) -> Result<Array2<f32>, ModelError> {
            let input: Vec<f32> = ids.iter().map(|&id| id as f32).collect();
            let array = CowArray::from(
                Array2::from_shape_vec((1, ids.len()), input).map_err(inference_err)?,
            )
            .into_dyn();
            let inputs = vec![Value::from_array(self.session.allocator(), &array)
                .map_err(inference_err)?];
            let outputs: Vec<Value> = self.session.run(inputs).map_err(inference_err)?;
            let first = outputs
                .first()
                .ok_or_else(|| ModelError::Inference("model returned no outputs".into()))?;
            let tensor: OrtOwnedTensor<f32, _> = first.try_extract().map_err(inference_err)?;
            let view = tensor.view();
            let shape = view.shape().to_vec();
            match shape.as_slice() {
                [1, positions, labels] => view
                    .to_owned()
                    .into_shape((*positions, *labels))
                    .map_err(|_| ModelError::Shape(shape.clone())),
                _ => Err(ModelError::Shape(shape)),
            }
        }
    }
}
