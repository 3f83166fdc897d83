//! Readability-style article parser: download the page and keep the densest text block.

use std::time::Duration;

use futures::{future::BoxFuture, FutureExt};
use reqwest::Client;
use tracing::debug;

use super::{fetch_html, html, ExtractionStrategy, StrategyError};

pub struct ArticleStrategy {
    client: Client,
    timeout: Duration,
}

impl ArticleStrategy {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn run(&self, url: &str) -> Result<String, StrategyError> {
        let body = fetch_html(&self.client, url).await?;
        debug!(bytes = body.len(), "downloaded article page");
        html::readable_text(&body).ok_or(StrategyError::NoContent)
    }
}

impl ExtractionStrategy for ArticleStrategy {
    fn name(&self) -> &'static str {
        "article"
    }

    fn budget(&self) -> Duration {
        self.timeout + Duration::from_secs(1)
    }

    fn extract<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, StrategyError>> {
        self.run(url).boxed()
    }
}
