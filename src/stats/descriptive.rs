// Per-system descriptive statistics
//
// - trueno::Vector for mean / standard deviation / min / max
// - aprender::stats::DescriptiveStats for the median (R-7 quantile)

use super::group_by_system;
use crate::error::{EvalError, Result};
use crate::table::LongRecord;
use aprender::stats::DescriptiveStats;
use serde::Serialize;
use trueno::Vector;

/// Average-precision summary of one system
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSummary {
    pub system: String,
    /// Number of topics
    pub n: usize,
    pub mean: f32,
    pub median: f32,
    pub stddev: f32,
    pub min: f32,
    pub max: f32,
}

/// Summarize each system's scores, in first-appearance order
pub fn summarize(records: &[LongRecord]) -> Result<Vec<SystemSummary>> {
    group_by_system(records)
        .into_iter()
        .map(|(system, values)| {
            let values: Vec<f32> = values.iter().map(|v| *v as f32).collect();
            let v = Vector::from_slice(&values);

            let median = DescriptiveStats::new(&v).quantile(0.5).map_err(|e| {
                EvalError::InsufficientData(format!("median of {}: {}", system, e))
            })?;

            Ok(SystemSummary {
                n: values.len(),
                mean: v.mean().unwrap_or(0.0),
                median,
                stddev: v.stddev().unwrap_or(0.0),
                min: v.min().unwrap_or(0.0),
                max: v.max().unwrap_or(0.0),
                system,
            })
        })
        .collect()
}
