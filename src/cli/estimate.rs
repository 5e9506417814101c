//! Estimate command implementation

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use super::utils::{load_registry, print_json};
use crate::batch::{process_directory, BatchOptions};
use crate::config::ModelProfile;
use crate::domain::ImageSize;
use crate::render::{batch_report, render_batch, render_single, single_report, ReportOptions};
use crate::scan::probe_dimensions;

#[derive(Args)]
#[command(group(ArgGroup::new("input").required(true).args(["size", "image"])))]
pub struct EstimateArgs {
    /// Size of a synthetic image, e.g. `--size 1920 1080`
    #[arg(short, long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    pub size: Option<Vec<u32>>,

    /// Image file, or a directory whose images are all estimated
    #[arg(short, long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Model name (see `vt-calc models`); defaults to the configured default model
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Path to config file (vt-calc.toml or vt-calc.yaml)
    #[arg(short = 'c', long, value_name = "FILE", env = "VT_CALC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print a JSON report instead of text
    #[arg(long)]
    pub json: bool,

    /// Omit the generation timestamp from the JSON report
    #[arg(long)]
    pub no_timestamp: bool,

    /// Never draw the progress bar in directory mode
    #[arg(long)]
    pub no_progress: bool,
}

pub fn run(args: EstimateArgs) -> Result<()> {
    let registry = load_registry(args.config.as_deref())?;
    let profile = registry.get(args.model.as_deref())?;
    let options = ReportOptions { include_timestamp: !args.no_timestamp };

    match (&args.size, &args.image) {
        (Some(size), _) => {
            let [width, height] = size.as_slice() else {
                anyhow::bail!("--size takes exactly two values: WIDTH HEIGHT");
            };
            let image = ImageSize::new(*height, *width)?;
            estimate_single(profile, &format!("Dummy image ({image})"), image, &args, options)
        }
        (None, Some(path)) if path.is_dir() => estimate_directory(profile, path, &args, options),
        (None, Some(path)) => {
            let image = probe_dimensions(path)?;
            estimate_single(profile, &path.display().to_string(), image, &args, options)
        }
        (None, None) => anyhow::bail!("Either --size or --image must be specified"),
    }
}

fn estimate_single(
    profile: &ModelProfile,
    source: &str,
    image: ImageSize,
    args: &EstimateArgs,
    options: ReportOptions,
) -> Result<()> {
    let estimate = profile
        .estimator()?
        .estimate(image)
        .with_context(|| format!("Failed to estimate tokens for {source}"))?;

    if args.json {
        print_json(&single_report(profile, source, image, &estimate, options))
    } else {
        println!("{}", render_single(profile, source, image, &estimate));
        Ok(())
    }
}

fn estimate_directory(
    profile: &ModelProfile,
    dir: &Path,
    args: &EstimateArgs,
    options: ReportOptions,
) -> Result<()> {
    let progress = !args.no_progress && !args.json && std::io::stderr().is_terminal();
    let report = process_directory(dir, profile, BatchOptions { progress })?;

    if args.json {
        print_json(&batch_report(profile, &report, options)?)
    } else {
        println!("{}", render_batch(profile, &report));
        Ok(())
    }
}
