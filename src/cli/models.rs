//! Models command implementation

use anyhow::Result;
use clap::Args;
use serde_json::json;
use std::path::PathBuf;

use super::utils::{load_registry, print_json};
use crate::domain::GeometryConfig;

#[derive(Args)]
pub struct ModelsArgs {
    /// Path to config file (vt-calc.toml or vt-calc.yaml)
    #[arg(short = 'c', long, value_name = "FILE", env = "VT_CALC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the profiles as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ModelsArgs) -> Result<()> {
    let registry = load_registry(args.config.as_deref())?;

    if args.json {
        let profiles: Vec<_> = registry.iter().collect();
        return print_json(&json!({
            "default_model": registry.default_model(),
            "models": profiles,
        }));
    }

    println!("Models (default: {}):", registry.default_model());
    for profile in registry.iter() {
        let marker = if profile.name == registry.default_model() { "*" } else { " " };
        println!(
            "{} {:<18} {:<16} {:<14} {}",
            marker,
            profile.name,
            profile.family.id(),
            profile.geometry.kind(),
            profile.hf_id
        );
        println!("    {}", geometry_summary(&profile.geometry));
    }
    Ok(())
}

fn geometry_summary(geometry: &GeometryConfig) -> String {
    match geometry {
        GeometryConfig::PatchMerge(cfg) => format!(
            "patch {} merge {} pixels [{}, {}]",
            cfg.patch_size, cfg.merge_size, cfg.min_pixels, cfg.max_pixels
        ),
        GeometryConfig::TiledCanvas(cfg) => format!(
            "tile {} tiles [{}, {}] patch {} unshuffle {}",
            cfg.tile_size, cfg.min_tiles, cfg.max_tiles, cfg.patch_size, cfg.pixel_unshuffle_factor
        ),
        GeometryConfig::FixedCrop(cfg) => format!(
            "crop {}x{} patch {} +{} ({})",
            cfg.resized_height,
            cfg.resized_width,
            cfg.patch_size,
            cfg.num_additional_tokens,
            cfg.feature_select_strategy.as_str()
        ),
        GeometryConfig::AnyResGrid(cfg) => {
            let cap = cfg.max_patches_cap.map(|c| format!(" cap {c}")).unwrap_or_default();
            format!(
                "tile {} patch {} pinpoints {} ({}){}",
                cfg.tile_size,
                cfg.patch_size,
                cfg.grid_pinpoints.len(),
                cfg.feature_select_strategy.as_str(),
                cap
            )
        }
    }
}
