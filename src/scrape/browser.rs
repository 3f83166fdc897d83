//! Rendered-browser strategy: a headless Chrome driven over the WebDriver protocol.
//!
//! The session lives only for one call and is deleted before `extract` resolves, whether the
//! page loaded or not. If the call is dropped midway, the session deletes itself in the
//! background.

use std::time::Duration;

use futures::{future::BoxFuture, FutureExt};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tokio::{
    runtime::Handle,
    time::{sleep, timeout, Instant},
};
use tracing::{debug, warn};

use super::{
    html::{self, Fallback},
    ExtractionStrategy, StrategyError,
};
use crate::config::Settings;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct BrowserStrategy {
    client: Client,
    endpoint: Option<String>,
    user_agent: String,
    request_timeout: Duration,
    wait: Duration,
    settle: Duration,
}

impl BrowserStrategy {
    pub fn new(
        endpoint: Option<String>,
        user_agent: String,
        request_timeout: Duration,
        wait: Duration,
        settle: Duration,
    ) -> anyhow::Result<Self> {
        // Navigation blocks until the page loads, so driver calls get the page-load wait on top
        // of the normal request timeout.
        let client = Client::builder().timeout(request_timeout + wait).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.map(|e| e.trim_end_matches('/').to_string()),
            user_agent,
            request_timeout,
            wait,
            settle,
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(
            settings.webdriver_url.clone(),
            settings.user_agent.clone(),
            settings.request_timeout,
            settings.browser_wait,
            settings.browser_settle,
        )
    }

    fn capabilities(&self) -> Value {
        json!({
            "alwaysMatch": {
                "browserName": "chrome",
                "pageLoadStrategy": "normal",
                "timeouts": { "pageLoad": self.wait.as_millis() as u64 },
                "goog:chromeOptions": {
                    "args": [
                        format!("user-agent={}", self.user_agent),
                        "--headless",
                        "--disable-gpu",
                        "--no-sandbox",
                        "--disable-dev-shm-usage",
                    ]
                }
            }
        })
    }

    fn drive_budget(&self) -> Duration {
        self.wait * 2 + self.settle + self.request_timeout
    }

    async fn run(&self, url: &str) -> Result<String, StrategyError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| StrategyError::Unavailable("WEBDRIVER_URL is not set".into()))?;
        let session = Session::start(&self.client, endpoint, self.capabilities()).await?;

        let outcome = match timeout(self.drive_budget(), self.page_source(&session, url)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(StrategyError::Timeout),
        };
        session.close().await;

        let source = outcome?;
        html::structural_text(&source, Fallback::WholePage).ok_or(StrategyError::NoContent)
    }

    async fn page_source(&self, session: &Session, url: &str) -> Result<String, StrategyError> {
        session.navigate(url).await?;
        session.wait_for_body(self.wait).await?;
        sleep(self.settle).await;
        session.source().await
    }
}

impl ExtractionStrategy for BrowserStrategy {
    fn name(&self) -> &'static str {
        "browser"
    }

    fn budget(&self) -> Duration {
        let call = self.request_timeout + self.wait;
        // session start and teardown each get a full driver call on top of the drive itself
        self.drive_budget() + call * 2 + Duration::from_secs(1)
    }

    fn extract<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, StrategyError>> {
        self.run(url).boxed()
    }
}

/// An open WebDriver session. Dropping it without [`Session::close`] deletes it on a spawned
/// task.
struct Session {
    client: Client,
    base: String,
    closed: bool,
}

impl Session {
    async fn start(
        client: &Client,
        endpoint: &str,
        capabilities: Value,
    ) -> Result<Session, StrategyError> {
        let request = client
            .post(format!("{endpoint}/session"))
            .json(&json!({ "capabilities": capabilities }));
        let value = command(request).await?;
        let id = session_id(&value)
            .ok_or_else(|| StrategyError::Browser("driver returned no session id".into()))?;
        debug!(%id, "webdriver session started");
        Ok(Session {
            client: client.clone(),
            base: format!("{endpoint}/session/{id}"),
            closed: false,
        })
    }

    async fn navigate(&self, url: &str) -> Result<(), StrategyError> {
        let request = self
            .client
            .post(format!("{}/url", self.base))
            .json(&json!({ "url": url }));
        command(request).await.map(drop)
    }

    async fn wait_for_body(&self, wait: Duration) -> Result<(), StrategyError> {
        let deadline = Instant::now() + wait;
        loop {
            let request = self
                .client
                .post(format!("{}/element", self.base))
                .json(&json!({ "using": "css selector", "value": "body" }));
            match command(request).await {
                Ok(_) => return Ok(()),
                Err(err) if Instant::now() >= deadline => {
                    debug!(%err, "body never appeared");
                    return Err(StrategyError::Timeout);
                }
                Err(_) => sleep(POLL_INTERVAL).await,
            }
        }
    }

    async fn source(&self) -> Result<String, StrategyError> {
        let value = command(self.client.get(format!("{}/source", self.base))).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| StrategyError::Browser("page source was not a string".into()))
    }

    /// Delete the session. If this future is itself dropped, `Drop` retries the delete.
    async fn close(mut self) {
        if let Err(err) = command(self.client.delete(&self.base)).await {
            warn!(%err, session = %self.base, "failed to delete webdriver session");
        }
        self.closed = true;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let request = self.client.delete(&self.base);
        let base = std::mem::take(&mut self.base);
        match Handle::try_current() {
            Ok(handle) => {
                debug!(session = %base, "deleting abandoned webdriver session");
                handle.spawn(async move {
                    if let Err(err) = command(request).await {
                        warn!(%err, session = %base, "failed to delete abandoned webdriver session");
                    }
                });
            }
            Err(_) => warn!(session = %base, "no runtime left to delete webdriver session"),
        }
    }
}

fn session_id(value: &Value) -> Option<&str> {
    value
        .get("sessionId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Send a WebDriver command and unwrap the `value` member of its response.
async fn command(request: RequestBuilder) -> Result<Value, StrategyError> {
    let resp = request.send().await?;
    let status = resp.status();
    let mut body: Value = resp.json().await?;
    let value = body.get_mut("value").map(Value::take).unwrap_or(Value::Null);
    if status.is_success() {
        // Legacy drivers put the session id next to `value` instead of inside it.
        if let (Some(id), Value::Object(map)) = (body.get("sessionId").cloned(), &value) {
            if !map.contains_key("sessionId") {
                let mut map = map.clone();
                map.insert("sessionId".into(), id);
                return Ok(Value::Object(map));
            }
        }
        return Ok(value);
    }
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Err(StrategyError::Browser(format!("{error} ({status}): {message}")))
}
