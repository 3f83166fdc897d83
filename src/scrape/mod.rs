//! URL to plain text through an ordered chain of extraction strategies.
//!
//! Strategies run one at a time in priority order. The first one returning non-blank text wins;
//! every failure is logged and kept so callers can report why a page could not be read.

pub mod article;
pub mod browser;
pub mod html;
pub mod static_html;

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{Client, Url};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::Settings;

/// Why a single strategy produced nothing. Never returned to callers on its own.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StrategyError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server answered HTTP {0}")]
    Status(u16),
    #[error("timed out")]
    Timeout,
    #[error("no article content found")]
    NoContent,
    #[error("browser error: {0}")]
    Browser(String),
    #[error("strategy unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for StrategyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// One failed strategy in an extraction attempt.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyAttempt {
    pub strategy: &'static str,
    #[serde(serialize_with = "display")]
    pub error: StrategyError,
}

fn display<S: serde::Serializer>(err: &StrategyError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

/// Returned when no strategy could read the page.
#[derive(Debug, Clone, Error)]
pub enum ExtractionFailure {
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("content unavailable for {url}")]
    Exhausted {
        url: String,
        attempts: Vec<StrategyAttempt>,
    },
}

impl ExtractionFailure {
    pub fn attempts(&self) -> &[StrategyAttempt] {
        match self {
            Self::InvalidUrl { .. } => &[],
            Self::Exhausted { attempts, .. } => attempts,
        }
    }
}

/// Text recovered from a page.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub text: String,
    pub strategy: &'static str,
}

/// A single way of turning a URL into article text.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Upper bound the driver allows this strategy before abandoning it.
    fn budget(&self) -> Duration;

    fn extract<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, StrategyError>>;
}

/// Ordered strategy chain.
pub struct ContentExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl ContentExtractor {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Article parser, static HTML, then rendered browser, all sharing one HTTP client.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = http_client(settings)?;
        Ok(Self::new(vec![
            Box::new(article::ArticleStrategy::new(
                client.clone(),
                settings.request_timeout,
            )),
            Box::new(static_html::StaticHtmlStrategy::new(
                client,
                settings.request_timeout,
            )),
            Box::new(browser::BrowserStrategy::from_settings(settings)?),
        ]))
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the chain until a strategy yields text.
    #[instrument(skip(self))]
    pub async fn extract(&self, url: &str) -> Result<Extraction, ExtractionFailure> {
        let url = url.trim();
        if let Err(err) = validate_url(url) {
            return Err(ExtractionFailure::InvalidUrl {
                url: url.to_string(),
                reason: err,
            });
        }

        let mut attempts = Vec::new();
        for strategy in &self.strategies {
            let name = strategy.name();
            let outcome = match tokio::time::timeout(strategy.budget(), strategy.extract(url)).await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(StrategyError::Timeout),
            };
            match outcome {
                Ok(text) if !text.trim().is_empty() => {
                    let text = html::tidy_lines(&text);
                    info!(strategy = name, chars = text.len(), "extracted page text");
                    return Ok(Extraction {
                        text,
                        strategy: name,
                    });
                }
                Ok(_) => {
                    warn!(strategy = name, "strategy returned blank text");
                    attempts.push(StrategyAttempt {
                        strategy: name,
                        error: StrategyError::NoContent,
                    });
                }
                Err(error) => {
                    warn!(strategy = name, %error, "strategy failed");
                    attempts.push(StrategyAttempt {
                        strategy: name,
                        error,
                    });
                }
            }
        }

        Err(ExtractionFailure::Exhausted {
            url: url.to_string(),
            attempts,
        })
    }
}

fn validate_url(url: &str) -> Result<(), String> {
    let parsed = Url::parse(url).map_err(|e| e.to_string())?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme {other}")),
    }
}

fn http_client(settings: &Settings) -> anyhow::Result<Client> {
    Ok(Client::builder()
        .user_agent(settings.user_agent.clone())
        .timeout(settings.request_timeout)
        .gzip(true)
        .brotli(true)
        .build()?)
}

/// Fetch `url` and return the body of a successful response.
pub(crate) async fn fetch_html(client: &Client, url: &str) -> Result<String, StrategyError> {
    let resp = client.get(url).send().await?.error_for_status()?;
    Ok(resp.text().await?)
}
