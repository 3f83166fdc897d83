//! Word and label lookup tables shared by every request.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::info;

use crate::nlp::labels::Label;

/// Reserved entry every word table must contain.
pub const UNKNOWN_TOKEN: &str = "<UNK>";

/// Index used to pad sequences up to the model length.
pub const PAD_INDEX: u32 = 0;

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("parsing {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("unsupported vocabulary format for {0} (expected .json, .csv or .tsv)")]
    UnsupportedFormat(PathBuf),
    #[error("word vocabulary has no <UNK> entry")]
    MissingUnknown,
    #[error("label vocabulary is empty")]
    NoLabels,
}

/// Model input produced by [`Vocabulary::encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// Exactly `max_len` indices.
    pub ids: Vec<u32>,
    /// Number of leading positions that hold real tokens.
    pub len: usize,
}

/// Immutable word→index and index→label tables.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    words: HashMap<String, u32>,
    unknown: u32,
    size: u32,
    labels: HashMap<u32, Label>,
    label_count: usize,
}

impl Vocabulary {
    /// Build from in-memory tables. `labels` maps a raw tag to its model output index.
    pub fn from_maps(
        words: HashMap<String, u32>,
        labels: HashMap<String, u32>,
    ) -> Result<Self, VocabularyError> {
        let unknown = *words
            .get(UNKNOWN_TOKEN)
            .ok_or(VocabularyError::MissingUnknown)?;
        if labels.is_empty() {
            return Err(VocabularyError::NoLabels);
        }
        let size = words.values().copied().max().unwrap_or(PAD_INDEX) + 1;
        let label_count = labels.values().copied().max().map_or(0, |max| max as usize + 1);
        let labels = labels
            .into_iter()
            .map(|(raw, index)| (index, Label::parse(&raw)))
            .collect();
        Ok(Self {
            words,
            unknown,
            size,
            labels,
            label_count,
        })
    }

    /// Load both tables from `.json` objects or two-column `.csv`/`.tsv` files.
    pub fn load(word_path: &Path, label_path: &Path) -> Result<Self, VocabularyError> {
        let words = read_table(word_path)?;
        let labels = read_table(label_path)?;
        let vocab = Self::from_maps(words, labels)?;
        info!(
            words = vocab.words.len(),
            labels = vocab.labels.len(),
            "loaded vocabulary"
        );
        Ok(vocab)
    }

    /// Index for `token`, or the unknown index when it is out of vocabulary.
    pub fn index_of(&self, token: &str) -> u32 {
        self.words.get(token).copied().unwrap_or(self.unknown)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains_key(token)
    }

    pub fn unknown_index(&self) -> u32 {
        self.unknown
    }

    /// One past the largest word index.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn label(&self, index: usize) -> Option<&Label> {
        u32::try_from(index).ok().and_then(|i| self.labels.get(&i))
    }

    /// Output index of `label`, if the model knows it.
    pub fn label_index(&self, label: &Label) -> Option<usize> {
        self.labels
            .iter()
            .find(|(_, known)| *known == label)
            .map(|(index, _)| *index as usize)
    }

    /// Width of the model's output distribution.
    pub fn label_count(&self) -> usize {
        self.label_count
    }

    /// Map tokens to indices, then pad with [`PAD_INDEX`] or truncate to `max_len`.
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S], max_len: usize) -> Encoded {
        let mut ids: Vec<u32> = tokens
            .iter()
            .take(max_len)
            .map(|token| self.index_of(token.as_ref()))
            .collect();
        let len = ids.len();
        ids.resize(max_len, PAD_INDEX);
        Encoded { ids, len }
    }
}

fn read_table(path: &Path) -> Result<HashMap<String, u32>, VocabularyError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => {
            let raw = fs::read_to_string(path).map_err(|source| VocabularyError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| VocabularyError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
        Some(ext @ ("csv" | "tsv")) => {
            let delimiter = if ext == "tsv" { b'\t' } else { b',' };
            let csv_err = |source: csv::Error| VocabularyError::Csv {
                path: path.to_path_buf(),
                source,
            };
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .delimiter(delimiter)
                .quoting(ext == "csv")
                .from_path(path)
                .map_err(csv_err)?;
            let mut table = HashMap::new();
            for row in reader.deserialize::<(String, u32)>() {
                let (key, index) = row.map_err(csv_err)?;
                table.insert(key, index);
            }
            Ok(table)
        }
        _ => Err(VocabularyError::UnsupportedFormat(path.to_path_buf())),
    }
}
