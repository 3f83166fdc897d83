//! Shared DTOs for JSON requests and responses.

use serde::{Deserialize, Serialize};

use crate::{
    nlp::{entities::EntityCollection, labels::LabeledToken},
    scrape::StrategyAttempt,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    pub strategy: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectRequest {
    pub text: String,
    /// `|`-separated supplementary locations.
    #[serde(default)]
    pub extra_locations: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectResponse {
    pub entities: EntityCollection,
    pub tokens: Vec<LabeledToken>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDto {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<StrategyAttempt>,
}

impl ErrorDto {
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            attempts: Vec::new(),
        }
    }
}
