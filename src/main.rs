//! Entry point wiring CLI dispatch to the pipeline modules.

use anyhow::Result;
use berita_ner::{cli::Cli, config::Settings, logging};
use tracing::{debug, instrument};

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    logging::init_tracing()?;
    let settings = Settings::load()?;
    let cli = Cli::parse();

    debug!(?cli, "starting command");
    cli.dispatch(settings).await
}
