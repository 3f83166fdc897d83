//! Command-line interface wiring for berita-ner.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod detect;
pub mod extract;
pub mod normalize;
pub mod serve;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Indonesian news entity detection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::run(args, settings).await,
            Commands::Extract(args) => extract::run(args, settings).await,
            Commands::Detect(args) => detect::run(args, settings).await,
            Commands::Normalize(args) => normalize::run(args),
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the JSON API and the form page.
    Serve(serve::Args),
    /// Fetch a URL and print its article text.
    Extract(extract::Args),
    /// Detect named entities in text.
    Detect(detect::Args),
    /// Show how text is normalised and tokenised before tagging.
    Normalize(normalize::Args),
}
