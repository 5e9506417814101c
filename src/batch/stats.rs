//! Summary statistics over per-image sequence token counts.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchStats {
    pub total_processed: usize,
    pub total_failed: usize,
    pub average_tokens: f64,
    pub min_tokens: u64,
    pub max_tokens: u64,
    /// Sample standard deviation; zero with fewer than two values.
    pub std_deviation: f64,
}

impl BatchStats {
    pub fn from_counts(counts: &[u64], failed: usize) -> Self {
        Self {
            total_processed: counts.len(),
            total_failed: failed,
            average_tokens: mean(counts),
            min_tokens: counts.iter().copied().min().unwrap_or(0),
            max_tokens: counts.iter().copied().max().unwrap_or(0),
            std_deviation: sample_stdev(counts),
        }
    }
}

pub fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

pub fn sample_stdev(values: &[u64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let squares: f64 = values.iter().map(|&v| (v as f64 - avg).powi(2)).sum();
    (squares / (values.len() - 1) as f64).sqrt()
}
