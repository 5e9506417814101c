//! Report JSON generation.

use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::batch::BatchReport;
use crate::config::ModelProfile;
use crate::domain::{ImageSize, TokenEstimate};

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub include_timestamp: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { include_timestamp: true }
    }
}

fn base_report(kind: &str, profile: &ModelProfile, options: ReportOptions) -> Map<String, Value> {
    let mut report = Map::new();
    report.insert("schema_version".to_string(), Value::String(REPORT_SCHEMA_VERSION.to_string()));
    report.insert("kind".to_string(), Value::String(kind.to_string()));
    if options.include_timestamp {
        report.insert(
            "generated_at".to_string(),
            Value::String(Utc::now().format("%Y-%m-%dT%H:%M:%S+00:00").to_string()),
        );
    }
    report.insert(
        "model".to_string(),
        json!({
            "name": profile.name,
            "family": profile.family,
            "hf_id": profile.hf_id,
            "geometry": profile.geometry,
        }),
    );
    report
}

fn estimate_value(profile: &ModelProfile, image: ImageSize, estimate: &TokenEstimate) -> Value {
    json!({
        "image_size": image,
        "resized_size": estimate.resized_size,
        "grid": estimate.grid,
        "patch_count": estimate.patch_count,
        "has_global_patch": estimate.has_global_patch,
        "token_count": estimate.token_count,
        "tokens": {
            "image_token": profile.tokens.image_token,
            "start_token": profile.tokens.start_token,
            "end_token": profile.tokens.end_token,
            "sequence_tokens": profile.tokens.sequence_tokens(estimate.token_count),
        },
    })
}

pub fn single_report(
    profile: &ModelProfile,
    source: &str,
    image: ImageSize,
    estimate: &TokenEstimate,
    options: ReportOptions,
) -> Value {
    let mut report = base_report("single", profile, options);
    report.insert("source".to_string(), Value::String(source.to_string()));
    report.insert("result".to_string(), estimate_value(profile, image, estimate));
    Value::Object(report)
}

pub fn batch_report(profile: &ModelProfile, batch: &BatchReport, options: ReportOptions) -> Result<Value> {
    let mut report = base_report("batch", profile, options);
    report.insert(
        "directory".to_string(),
        Value::String(batch.directory.display().to_string()),
    );
    report.insert("stats".to_string(), serde_json::to_value(&batch.stats)?);

    let files = batch
        .items
        .iter()
        .map(|item| {
            let mut value = estimate_value(profile, item.image_size, &item.estimate);
            if let Value::Object(map) = &mut value {
                map.insert("file".to_string(), Value::String(item.file_name.clone()));
            }
            value
        })
        .collect::<Vec<_>>();
    report.insert("files".to_string(), Value::Array(files));
    if !batch.failures.is_empty() {
        report.insert("failed_files".to_string(), serde_json::to_value(&batch.failures)?);
    }
    Ok(Value::Object(report))
}

pub fn to_pretty_string(report: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
