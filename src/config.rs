//! Runtime configuration utilities for berita-ner.

use std::{env, path::PathBuf, time::Duration};

use serde::Deserialize;

/// Browser-like user agent; several news sites refuse obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// ONNX export of the tagger.
    pub model_path: PathBuf,
    /// Word→index table.
    pub word_vocab_path: PathBuf,
    /// Label→index table.
    pub label_vocab_path: PathBuf,
    /// Optional `token,label` CSV for the gazetteer tagger.
    pub gazetteer_path: Option<PathBuf>,
    /// Model input length.
    pub max_seq_len: usize,
    /// Entity type that receives supplementary locations.
    pub location_label: String,
    /// User agent sent by every extraction strategy.
    pub user_agent: String,
    /// Timeout for plain HTTP strategies.
    pub request_timeout: Duration,
    /// WebDriver endpoint for the rendered-browser strategy.
    pub webdriver_url: Option<String>,
    /// Bounded wait for the page body in the browser.
    pub browser_wait: Duration,
    /// Pause after the body appears so scripts can fill the page.
    pub browser_settle: Duration,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Resolve settings through `lookup`, falling back to defaults for missing or malformed values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let path = |key: &str, default: &str| {
            non_empty(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };
        let number = |key: &str, default: u64| {
            non_empty(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        let max_seq_len = match number("MAX_SEQ_LEN", 512) {
            0 => 512,
            n => n as usize,
        };

        Self {
            model_path: path("MODEL_PATH", "./models/ner.onnx"),
            word_vocab_path: path("WORD_VOCAB_PATH", "./models/word_vocab.json"),
            label_vocab_path: path("LABEL_VOCAB_PATH", "./models/label_vocab.json"),
            gazetteer_path: non_empty("GAZETTEER_PATH").map(PathBuf::from),
            max_seq_len,
            location_label: non_empty("LOCATION_LABEL").unwrap_or_else(|| "LOC".to_string()),
            user_agent: non_empty("SCRAPER_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            request_timeout: Duration::from_secs(number("REQUEST_TIMEOUT_SECS", 10)),
            webdriver_url: non_empty("WEBDRIVER_URL"),
            browser_wait: Duration::from_secs(number("BROWSER_WAIT_SECS", 10)),
            browser_settle: Duration::from_millis(number("BROWSER_SETTLE_MS", 2000)),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let settings = Settings::default();
        assert_eq!(settings.max_seq_len, 512);
        assert_eq!(settings.location_label, "LOC");
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        assert_eq!(settings.browser_settle, Duration::from_millis(2000));
        assert!(settings.webdriver_url.is_none());
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let vars: HashMap<&str, &str> = [
            ("MAX_SEQ_LEN", "lots"),
            ("REQUEST_TIMEOUT_SECS", "3"),
            ("WEBDRIVER_URL", " http://localhost:9515 "),
            ("GAZETTEER_PATH", ""),
        ]
        .into_iter()
        .collect();
        let settings = Settings::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(settings.max_seq_len, 512);
        assert_eq!(settings.request_timeout, Duration::from_secs(3));
        assert_eq!(
            settings.webdriver_url.as_deref(),
            Some("http://localhost:9515")
        );
        assert!(settings.gazetteer_path.is_none());
    }
}
