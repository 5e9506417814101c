//! Directory batch estimation
//!
//! Every image in a directory is probed and estimated in parallel against one shared
//! [`GeometryCache`]. Per-file failures are collected and reported rather than aborting the run.

pub mod stats;

pub use stats::BatchStats;

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cache::{CacheStats, GeometryCache};
use crate::config::ModelProfile;
use crate::domain::{ImageSize, TokenEstimate};
use crate::scan::{probe_dimensions, ImageScanner};

/// One successfully estimated image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub file_name: String,
    pub path: PathBuf,
    pub image_size: ImageSize,
    pub estimate: TokenEstimate,
    pub sequence_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub directory: PathBuf,
    pub items: Vec<BatchItem>,
    pub failures: Vec<BatchFailure>,
    pub stats: BatchStats,
    #[serde(skip)]
    pub cache: Vec<CacheStats>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Draw a progress bar on stderr.
    pub progress: bool,
}

/// Estimate every image found directly inside `dir`.
///
/// Fails when the directory cannot be read or holds no images.
pub fn process_directory(dir: &Path, profile: &ModelProfile, options: BatchOptions) -> Result<BatchReport> {
    let estimator = profile.estimator()?;

    let mut scanner = ImageScanner::new(dir.to_path_buf());
    let files = scanner.scan()?;
    if files.is_empty() {
        bail!("No image files found in directory: {}", dir.display());
    }
    info!(directory = %dir.display(), images = files.len(), model = %profile.name, "starting batch");

    let progress = progress_bar(files.len() as u64, options.progress);
    let cache = GeometryCache::new();

    let outcomes: Vec<std::result::Result<BatchItem, BatchFailure>> = files
        .par_iter()
        .map(|path| {
            let file_name = display_name(path);
            progress.set_message(file_name.clone());
            let outcome = probe_dimensions(path)
                .and_then(|image| {
                    let estimate = estimator.estimate_with_cache(image, &cache)?;
                    Ok((image, estimate))
                })
                .map(|(image_size, estimate)| BatchItem {
                    sequence_tokens: profile.tokens.sequence_tokens(estimate.token_count),
                    file_name: file_name.clone(),
                    path: path.clone(),
                    image_size,
                    estimate,
                })
                .map_err(|err| {
                    tracing::warn!("Skipping {}: {:#}", path.display(), err);
                    BatchFailure { file_name, error: format!("{err:#}") }
                });
            progress.inc(1);
            outcome
        })
        .collect();
    progress.finish_and_clear();

    let (items, failures): (Vec<_>, Vec<_>) = outcomes.into_iter().partition(|o| o.is_ok());
    let items: Vec<BatchItem> = items.into_iter().filter_map(|o| o.ok()).collect();
    let failures: Vec<BatchFailure> = failures.into_iter().filter_map(|o| o.err()).collect();

    // Wrapper tokens are part of what each image costs in the prompt.
    let counts: Vec<u64> = items.iter().map(|item| item.sequence_tokens).collect();
    let stats = BatchStats::from_counts(&counts, failures.len());

    let cache_stats = cache.stats().to_vec();
    for stat in &cache_stats {
        debug!(cache = stat.name, hits = stat.hits, misses = stat.misses, entries = stat.entries, "cache stats");
    }
    info!(processed = stats.total_processed, failed = stats.total_failed, "batch finished");

    Ok(BatchReport { directory: dir.to_path_buf(), items, failures, stats, cache: cache_stats })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{pos}/{len}] {bar:30} {wide_msg}") {
        bar.set_style(style);
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin_profile;
    use crate::selector::ModelFamily;
    use std::fs;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        image::RgbImage::new(width, height).save(dir.join(name)).expect("save");
    }

    #[test]
    fn estimates_every_image_and_collects_failures() {
        let tmp = TempDir::new().expect("tmp");
        write_png(tmp.path(), "a.png", 800, 800);
        write_png(tmp.path(), "b.png", 1920, 1080);
        fs::write(tmp.path().join("broken.jpg"), b"not a jpeg").expect("write");
        fs::write(tmp.path().join("readme.txt"), b"ignored").expect("write");

        let profile = builtin_profile(ModelFamily::InternVl3);
        let report = process_directory(tmp.path(), profile, BatchOptions::default()).expect("batch");

        let names: Vec<&str> = report.items.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.png"]);
        assert_eq!(report.items[0].estimate.token_count, 1280);
        assert_eq!(report.items[1].estimate.token_count, 2304);
        assert_eq!(report.items[0].sequence_tokens, 1282);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file_name, "broken.jpg");
        assert_eq!(report.stats.total_processed, 2);
        assert_eq!(report.stats.total_failed, 1);
        assert_eq!((report.stats.min_tokens, report.stats.max_tokens), (1282, 2306));
        assert!((report.stats.average_tokens - 1794.0).abs() < 1e-9);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let tmp = TempDir::new().expect("tmp");
        let profile = builtin_profile(ModelFamily::Qwen25Vl);
        let err = process_directory(tmp.path(), profile, BatchOptions::default()).expect_err("empty");
        assert!(err.to_string().contains("No image files found"));
    }

    #[test]
    fn batch_matches_single_estimates() {
        let tmp = TempDir::new().expect("tmp");
        let sizes = [(640, 480), (1280, 720), (640, 480), (333, 777)];
        for (i, (w, h)) in sizes.iter().enumerate() {
            write_png(tmp.path(), &format!("img{i}.png"), *w, *h);
        }

        let profile = builtin_profile(ModelFamily::Qwen2Vl);
        let report = process_directory(tmp.path(), profile, BatchOptions::default()).expect("batch");
        let estimator = profile.estimator().expect("estimator");
        for item in &report.items {
            assert_eq!(Ok(item.estimate.clone()), estimator.estimate(item.image_size));
        }
        assert_eq!(report.items.len(), sizes.len());
    }
}
