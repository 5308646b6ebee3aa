// Tukey-Kramer honestly-significant-difference test
//
// For each pair (a, b): se = sqrt(MSE / 2 * (1/n_a + 1/n_b)), q = |diff| / se,
// p = 1 - ptukey(q, k, N - k), and the simultaneous confidence interval is
// diff +/- qtukey(1 - alpha, k, N - k) * se. The Kramer form of se keeps the
// test valid when systems have different numbers of topics.

use super::anova::one_way_anova_groups;
use super::studentized_range::{ptukey, qtukey};
use super::{group_by_system, Group};
use crate::error::{EvalError, Result};
use crate::table::LongRecord;
use serde::Serialize;

/// Comparison of one pair of systems
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseComparison {
    pub group1: String,
    pub group2: String,
    /// mean(group2) - mean(group1)
    pub mean_diff: f64,
    pub lower: f64,
    pub upper: f64,
    /// Studentized range statistic
    pub q_value: f64,
    pub p_value: f64,
    /// Difference is significant at the family-wise alpha
    pub reject: bool,
}

/// Result of a Tukey-Kramer test over all system pairs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TukeyHsd {
    pub alpha: f64,
    /// Critical studentized range value at 1 - alpha
    pub q_critical: f64,
    pub df_residual: f64,
    pub mse: f64,
    pub comparisons: Vec<PairwiseComparison>,
}

impl TukeyHsd {
    /// Pairs whose difference is significant
    pub fn significant_pairs(&self) -> impl Iterator<Item = &PairwiseComparison> {
        self.comparisons.iter().filter(|c| c.reject)
    }

    #[cfg(test)]
    pub(crate) fn find(&self, a: &str, b: &str) -> Option<&PairwiseComparison> {
        self.comparisons
            .iter()
            .find(|c| (c.group1 == a && c.group2 == b) || (c.group1 == b && c.group2 == a))
    }
}

/// Tukey-Kramer HSD on long-form records, grouped by system
pub fn tukey_hsd(records: &[LongRecord], alpha: f64) -> Result<TukeyHsd> {
    tukey_hsd_groups(&group_by_system(records), alpha)
}

/// Tukey-Kramer HSD over pre-grouped observations
///
/// Pairs are listed in (i, j), i < j order of the input groups.
pub fn tukey_hsd_groups(groups: &[Group], alpha: f64) -> Result<TukeyHsd> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(EvalError::Config(format!(
            "significance level must be in (0, 1), got {}",
            alpha
        )));
    }

    let anova = one_way_anova_groups(groups)?;
    let k = groups.len() as f64;
    let df = anova.df_residual();
    let mse = anova.mse();
    let q_critical = qtukey(1.0 - alpha, k, df);

    let means: Vec<f64> = groups
        .iter()
        .map(|(_, v)| v.iter().sum::<f64>() / v.len() as f64)
        .collect();

    let mut comparisons = Vec::with_capacity(groups.len() * (groups.len() - 1) / 2);
    for i in 0..groups.len() {
        for j in (i + 1)..groups.len() {
            let n_i = groups[i].1.len() as f64;
            let n_j = groups[j].1.len() as f64;
            let diff = means[j] - means[i];
            let se = (mse / 2.0 * (1.0 / n_i + 1.0 / n_j)).sqrt();

            let q_value = if se > 0.0 {
                diff.abs() / se
            } else if diff == 0.0 {
                0.0
            } else {
                f64::INFINITY
            };
            let p_value = (1.0 - ptukey(q_value, k, df)).clamp(0.0, 1.0);
            let margin = q_critical * se;

            comparisons.push(PairwiseComparison {
                group1: groups[i].0.clone(),
                group2: groups[j].0.clone(),
                mean_diff: diff,
                lower: diff - margin,
                upper: diff + margin,
                q_value,
                p_value,
                reject: p_value < alpha,
            });
        }
    }

    Ok(TukeyHsd {
        alpha,
        q_critical,
        df_residual: df,
        mse,
        comparisons,
    })
}
