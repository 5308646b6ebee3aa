// One-way fixed-effect ANOVA
//
// average_precision ~ C(system): total variation is split into a between-system
// part and a residual part; F = MS_between / MS_within is compared against
// the F(k - 1, N - k) distribution.

use super::{group_by_system, Group};
use crate::error::{EvalError, Result};
use crate::table::LongRecord;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Name of the system factor row, as in a patsy formula
pub const FACTOR_SOURCE: &str = "C(system)";
pub const RESIDUAL_SOURCE: &str = "Residual";

/// Relative tolerance below which a sum of squares counts as zero
const ZERO_SS: f64 = 1e-12;

/// One row of an ANOVA table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaRow {
    pub source: String,
    pub df: f64,
    pub sum_sq: f64,
    pub mean_sq: f64,
    /// F statistic; only on the factor row
    pub f: Option<f64>,
    /// PR(>F); only on the factor row
    pub p_value: Option<f64>,
}

/// Sum-of-squares decomposition for the system effect
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaTable {
    pub factor: AnovaRow,
    pub residual: AnovaRow,
    /// Number of systems (k)
    pub n_groups: usize,
    /// Number of observations (N)
    pub n_obs: usize,
}

impl AnovaTable {
    pub fn f_statistic(&self) -> f64 {
        self.factor.f.unwrap_or(f64::NAN)
    }

    pub fn p_value(&self) -> f64 {
        self.factor.p_value.unwrap_or(f64::NAN)
    }

    /// Residual mean square (MSE), the pooled within-system variance
    pub fn mse(&self) -> f64 {
        self.residual.mean_sq
    }

    pub fn df_residual(&self) -> f64 {
        self.residual.df
    }

    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value() < alpha
    }
}

/// One-way ANOVA of average precision on system identity
///
/// # Example
/// ```
/// use trecsig::stats::one_way_anova;
/// use trecsig::table::LongRecord;
///
/// let rec = |t: &str, s: &str, ap: f64| LongRecord {
///     topic: t.to_string(),
///     system: s.to_string(),
///     average_precision: ap,
/// };
/// let records = vec![
///     rec("t1", "A", 0.2), rec("t2", "A", 0.3), rec("t3", "A", 0.1),
///     rec("t1", "B", 0.8), rec("t2", "B", 0.7), rec("t3", "B", 0.9),
/// ];
///
/// let anova = one_way_anova(&records).unwrap();
/// assert!((anova.f_statistic() - 54.0).abs() < 1e-9);
/// assert!(anova.p_value() < 0.05);
/// ```
pub fn one_way_anova(records: &[LongRecord]) -> Result<AnovaTable> {
    one_way_anova_groups(&group_by_system(records))
}

/// One-way ANOVA over pre-grouped observations
pub fn one_way_anova_groups(groups: &[Group]) -> Result<AnovaTable> {
    let k = groups.len();
    if k < 2 {
        return Err(EvalError::InsufficientData(format!(
            "ANOVA needs at least 2 systems, got {}",
            k
        )));
    }
    if let Some((name, _)) = groups.iter().find(|(_, v)| v.is_empty()) {
        return Err(EvalError::InsufficientData(format!(
            "system {} has no observations",
            name
        )));
    }

    let n: usize = groups.iter().map(|(_, v)| v.len()).sum();
    if n <= k {
        return Err(EvalError::InsufficientData(format!(
            "ANOVA needs more observations ({}) than systems ({})",
            n, k
        )));
    }

    let grand_mean = groups.iter().flat_map(|(_, v)| v.iter()).sum::<f64>() / n as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for (_, values) in groups {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        ss_between += values.len() as f64 * (mean - grand_mean).powi(2);
        ss_within += values.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
    }

    // Scale for deciding when a sum of squares is rounding noise
    let scale = groups
        .iter()
        .flat_map(|(_, v)| v.iter())
        .map(|x| x * x)
        .sum::<f64>()
        .max(f64::MIN_POSITIVE);
    if ss_between <= ZERO_SS * scale {
        ss_between = 0.0;
    }
    if ss_within <= ZERO_SS * scale {
        ss_within = 0.0;
    }

    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;
    let ms_between = ss_between / df_between;
    let ms_within = ss_within / df_within;

    let (f, p_value) = if ms_within > 0.0 {
        let f = ms_between / ms_within;
        let dist = FisherSnedecor::new(df_between, df_within)
            .map_err(|e| EvalError::InsufficientData(format!("F distribution: {}", e)))?;
        (f, dist.sf(f).clamp(0.0, 1.0))
    } else if ms_between > 0.0 {
        // No residual variance but systems differ: separation is exact
        (f64::INFINITY, 0.0)
    } else {
        (0.0, 1.0)
    };

    Ok(AnovaTable {
        factor: AnovaRow {
            source: FACTOR_SOURCE.to_string(),
            df: df_between,
            sum_sq: ss_between,
            mean_sq: ms_between,
            f: Some(f),
            p_value: Some(p_value),
        },
        residual: AnovaRow {
            source: RESIDUAL_SOURCE.to_string(),
            df: df_within,
            sum_sq: ss_within,
            mean_sq: ms_within,
            f: None,
            p_value: None,
        },
        n_groups: k,
        n_obs: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, values: &[f64]) -> Group {
        (name.to_string(), values.to_vec())
    }

    #[test]
    fn test_sum_of_squares_decomposition() {
        let anova = one_way_anova_groups(&[
            group("A", &[0.2, 0.3, 0.1]),
            group("B", &[0.8, 0.7, 0.9]),
        ])
        .unwrap();

        assert_eq!(anova.factor.df, 1.0);
        assert_eq!(anova.residual.df, 4.0);
        assert!((anova.factor.sum_sq - 0.54).abs() < 1e-12);
        assert!((anova.residual.sum_sq - 0.04).abs() < 1e-12);
        assert!((anova.mse() - 0.01).abs() < 1e-12);
        assert!((anova.f_statistic() - 54.0).abs() < 1e-9);
    }

    #[test]
    fn test_p_value_matches_f_distribution() {
        // F(1, 4) = 54: p = 0.001826...
        let anova = one_way_anova_groups(&[
            group("A", &[0.2, 0.3, 0.1]),
            group("B", &[0.8, 0.7, 0.9]),
        ])
        .unwrap();
        assert!((anova.p_value() - 0.001826).abs() < 1e-4, "p = {}", anova.p_value());
    }

    #[test]
    fn test_unequal_group_sizes() {
        let anova = one_way_anova_groups(&[
            group("A", &[1.0, 2.0, 3.0]),
            group("B", &[4.0, 5.0]),
            group("C", &[6.0, 7.0, 8.0, 9.0]),
        ])
        .unwrap();

        // grand mean 5; SSB = 3*9 + 2*0.25 + 4*6.25 = 52.5; SSW = 2 + 0.5 + 5 = 7.5
        assert_eq!(anova.n_obs, 9);
        assert!((anova.factor.sum_sq - 52.5).abs() < 1e-9);
        assert!((anova.residual.sum_sq - 7.5).abs() < 1e-9);
        assert!((anova.f_statistic() - (26.25 / 1.25)).abs() < 1e-9);
    }

    fn as_f32(groups: &[Group]) -> Vec<Vec<f32>> {
        groups
            .iter()
            .map(|(_, v)| v.iter().map(|x| *x as f32).collect())
            .collect()
    }

    #[test]
    fn test_f_statistic_matches_aprender_f_oneway() {
        let groups = [
            group("A", &[0.3, 0.4, 0.5, 0.2]),
            group("B", &[0.35, 0.45, 0.4]),
            group("C", &[0.6, 0.7, 0.65, 0.75, 0.6]),
        ];
        let ours = one_way_anova_groups(&groups).unwrap();
        let theirs = aprender::stats::hypothesis::f_oneway(&as_f32(&groups)).unwrap();

        assert_eq!(theirs.df_between as f64, ours.factor.df);
        assert_eq!(theirs.df_within as f64, ours.residual.df);
        let rel = (theirs.statistic as f64 - ours.f_statistic()).abs() / ours.f_statistic();
        assert!(rel < 1e-4, "F {} vs {}", ours.f_statistic(), theirs.statistic);
    }

    #[test]
    fn test_p_value_matches_aprender_with_two_residual_df() {
        // aprender's F tail is only exact at df_within = 2
        let groups = [group("A", &[0.2, 0.3]), group("B", &[0.5, 0.7])];
        let ours = one_way_anova_groups(&groups).unwrap();
        let theirs = aprender::stats::hypothesis::f_oneway(&as_f32(&groups)).unwrap();

        assert!((ours.f_statistic() - 9.8).abs() < 1e-9);
        assert!((ours.p_value() - 0.0886776).abs() < 1e-6, "p = {}", ours.p_value());
        assert!((theirs.pvalue as f64 - ours.p_value()).abs() < 1e-3);
    }

    #[test]
    fn test_identical_scores_not_significant() {
        let anova = one_way_anova_groups(&[
            group("A", &[0.1, 0.4, 0.7]),
            group("B", &[0.1, 0.4, 0.7]),
            group("C", &[0.1, 0.4, 0.7]),
        ])
        .unwrap();

        assert!(anova.f_statistic().abs() < 1e-9);
        assert!((anova.p_value() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_constant() {
        let anova = one_way_anova_groups(&[group("A", &[0.3, 0.3]), group("B", &[0.3, 0.3])])
            .unwrap();
        assert_eq!(anova.f_statistic(), 0.0);
        assert_eq!(anova.p_value(), 1.0);
    }

    #[test]
    fn test_zero_residual_with_separation() {
        let anova = one_way_anova_groups(&[group("A", &[0.2, 0.2]), group("B", &[0.6, 0.6])])
            .unwrap();
        assert!(anova.f_statistic().is_infinite());
        assert_eq!(anova.p_value(), 0.0);
    }

    #[test]
    fn test_insufficient_data() {
        assert!(one_way_anova_groups(&[group("A", &[0.1, 0.2])]).is_err());
        assert!(one_way_anova_groups(&[group("A", &[0.1]), group("B", &[0.2])]).is_err());
        assert!(one_way_anova_groups(&[group("A", &[0.1, 0.3]), group("B", &[])]).is_err());
    }
}
