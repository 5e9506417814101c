//! Shared CLI utilities.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::{load_config, ModelRegistry};

/// Build the model registry from presets plus the explicit or discovered config file.
pub fn load_registry(config_path: Option<&Path>) -> Result<ModelRegistry> {
    let cwd = std::env::current_dir().context("Failed to resolve the working directory")?;
    let config = load_config(&cwd, config_path)?;
    ModelRegistry::from_config(&config)
}

/// Print a JSON value, pretty-printed, to stdout.
pub fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", crate::render::to_pretty_string(value)?);
    Ok(())
}
