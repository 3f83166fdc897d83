//! Plain GET plus structural extraction. Never falls back to whole-page text.

use std::time::Duration;

use futures::{future::BoxFuture, FutureExt};
use reqwest::Client;

use super::{
    fetch_html,
    html::{self, Fallback},
    ExtractionStrategy, StrategyError,
};

pub struct StaticHtmlStrategy {
    client: Client,
    timeout: Duration,
}

impl StaticHtmlStrategy {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn run(&self, url: &str) -> Result<String, StrategyError> {
        let body = fetch_html(&self.client, url).await?;
        html::structural_text(&body, Fallback::Nothing).ok_or(StrategyError::NoContent)
    }
}

impl ExtractionStrategy for StaticHtmlStrategy {
    fn name(&self) -> &'static str {
        "static"
    }

    fn budget(&self) -> Duration {
        self.timeout + Duration::from_secs(1)
    }

    fn extract<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, StrategyError>> {
        self.run(url).boxed()
    }
}
