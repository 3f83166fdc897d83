//! CLI entry-point showing the text preprocessing steps.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::nlp::{normalize, tokenize};

/// Args for the `normalize` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Text to normalise.
    #[arg(long)]
    pub text: String,
}

#[instrument]
pub fn run(args: Args) -> Result<()> {
    let normalized = normalize::normalize(&args.text);
    let tokens = tokenize::tokenize(&normalized);
    println!("{normalized}");
    println!("{}", tokens.join(" | "));
    Ok(())
}
