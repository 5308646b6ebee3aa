// Configuration for the significance tests

use serde::{Deserialize, Serialize};

/// Configuration for ANOVA / Tukey-HSD testing
///
/// # Example
/// ```
/// use trecsig::stats::StatsConfig;
///
/// let config = StatsConfig::default();
/// assert_eq!(config.significance_level, 0.05); // 95% confidence
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Family-wise significance level (alpha)
    ///
    /// - 0.05 (default): 95% simultaneous confidence intervals
    /// - 0.01: stricter, fewer pairs flagged as different
    pub significance_level: f64,

    /// Print per-system mean / median / standard deviation before the tests
    pub show_summary: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            show_summary: true,
        }
    }
}

impl StatsConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            ));
        }

        Ok(())
    }
}
