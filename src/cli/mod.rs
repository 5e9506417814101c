//! Command-line interface for vt-calc
//!
//! Provides `estimate`, `models` and `completions` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod completions;
mod estimate;
mod models;
mod utils;

/// Estimate how many vision tokens an image occupies in a vision-language model
#[derive(Parser)]
#[command(name = "vt-calc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate vision tokens for an image, a directory of images, or a synthetic size
    Estimate(estimate::EstimateArgs),

    /// List supported model families and configured models
    Models(models::ModelsArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Estimate(args) => estimate::run(args),
        Commands::Models(args) => models::run(args),
        Commands::Completions(args) => completions::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn size_and_image_are_mutually_exclusive() {
        let parsed =
            Cli::try_parse_from(["vt-calc", "estimate", "--size", "10", "10", "--image", "a.png"]);
        assert!(parsed.is_err());
        assert!(Cli::try_parse_from(["vt-calc", "estimate"]).is_err());
        assert!(Cli::try_parse_from(["vt-calc", "estimate", "-s", "1920", "1080", "-m", "llava"]).is_ok());
    }
}
