//! CLI entry-point for article extraction.

use anyhow::{bail, Result};
use clap::Args as ClapArgs;
use tracing::{instrument, warn};

use crate::{config::Settings, scrape::ContentExtractor};

/// Args for the `extract` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Page to read.
    #[arg(long)]
    pub url: String,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let extractor = ContentExtractor::from_settings(&settings)?;
    match extractor.extract(&args.url).await {
        Ok(extraction) => {
            println!("{}", extraction.text);
            Ok(())
        }
        Err(failure) => {
            for attempt in failure.attempts() {
                warn!(strategy = attempt.strategy, error = %attempt.error, "strategy failed");
            }
            bail!(failure)
        }
    }
}
