//! CLI entry-point for the HTTP API and form page.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    api::{self, AppState},
    config::Settings,
};

/// Run the Axum server.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Port to bind (default 8080).
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    /// Host address, defaults to localhost.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.host, args.port))?;

    // Vocabulary and tagger load once, before the listener opens.
    let state = AppState::from_settings(&settings)?;
    info!(
        strategies = ?state.extractor.strategy_names(),
        labels = state.ner.vocab().label_count(),
        browser = settings.webdriver_url.is_some(),
        "pipeline ready"
    );
    api::serve(state, addr).await
}
