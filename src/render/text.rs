//! Human-readable reports

use crate::batch::BatchReport;
use crate::config::ModelProfile;
use crate::domain::{ImageSize, TokenEstimate};
use crate::utils::format_with_commas;

const SEPARATOR_WIDTH: usize = 50;

fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

fn header(title: &str) -> Vec<String> {
    vec![String::new(), separator(), format!(" {title} "), separator()]
}

fn field(label: &str, value: impl std::fmt::Display) -> String {
    format!("{label:<28}: {value}")
}

fn model_line(profile: &ModelProfile) -> String {
    field("Model", format!("{} ({})", profile.name, profile.hf_id))
}

/// Report for one image. `source` describes where the size came from (a path, or a synthetic size).
pub fn render_single(profile: &ModelProfile, source: &str, image: ImageSize, estimate: &TokenEstimate) -> String {
    let mut lines = header("VISION TOKEN ANALYSIS RESULTS");
    lines.push(model_line(profile));
    lines.push(field("Image Source", source));
    lines.push(field("Original Image Size (W x H)", image));
    if let Some(resized) = estimate.resized_size {
        lines.push(field("Resized Image Size (W x H)", resized));
    }
    if let Some(grid) = estimate.grid {
        lines.push(field("Grid (columns x rows)", grid));
    }
    lines.push(field("Number of Image Patches", format_with_commas(estimate.patch_count)));
    if estimate.has_global_patch {
        lines.push(field("Global Patch", "yes"));
    }
    lines.push(field("Number of Image Tokens", format_with_commas(estimate.token_count)));

    let tokens = &profile.tokens;
    lines.push(String::new());
    lines.push("[TOKEN INFO]".to_string());
    lines.push(format!("{}: {}", tokens.image_token, estimate.token_count));
    for wrapper in [&tokens.start_token, &tokens.end_token].into_iter().flatten() {
        lines.push(format!("{wrapper}: 1"));
    }
    lines.push(field(
        "Total Sequence Tokens",
        format_with_commas(tokens.sequence_tokens(estimate.token_count)),
    ));
    lines.push(separator());
    lines.join("\n")
}

/// Summary of a directory run, followed by the failed files if any.
pub fn render_batch(profile: &ModelProfile, report: &BatchReport) -> String {
    let stats = &report.stats;
    let mut lines = header("BATCH ANALYSIS RESULTS");
    lines.push(model_line(profile));
    lines.push(field("Directory", report.directory.display()));
    lines.push(field("Total Images Processed", stats.total_processed));
    if stats.total_failed > 0 {
        lines.push(field("Total Images Failed", stats.total_failed));
    }
    if stats.total_processed > 0 {
        lines.push(field("Average Vision Tokens", format!("{:.1}", stats.average_tokens)));
        lines.push(field("Minimum Vision Tokens", format_with_commas(stats.min_tokens)));
        lines.push(field("Maximum Vision Tokens", format_with_commas(stats.max_tokens)));
    }
    if stats.std_deviation > 0.0 {
        lines.push(field("Standard Deviation", format!("{:.1}", stats.std_deviation)));
    }
    lines.push(separator());

    if !report.items.is_empty() {
        lines.push(String::new());
        lines.push("Images:".to_string());
        for item in &report.items {
            lines.push(format!(
                "  - {} ({}): {} tokens",
                item.file_name,
                item.image_size,
                format_with_commas(item.estimate.token_count)
            ));
        }
    }

    if !report.failures.is_empty() {
        lines.push(String::new());
        lines.push("Failed Files:".to_string());
        for failed in &report.failures {
            lines.push(format!("  - {}: {}", failed.file_name, failed.error));
        }
    }
    lines.join("\n")
}
