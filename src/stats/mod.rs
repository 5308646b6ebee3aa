// Significance testing of per-topic average precision across systems
//
// One-way fixed-effect ANOVA on system identity, followed by a Tukey-Kramer
// honestly-significant-difference test over every pair of systems. Topics are
// observations; there is no blocking by topic and no interaction term.
//
// Implementation:
// - statrs for the F and normal distributions and log-gamma
// - studentized range distribution by Gauss-Legendre quadrature
//   (Copenhaver & Holland 1988, the algorithm behind R's ptukey/qtukey)
// - trueno vectors and aprender's DescriptiveStats for per-system summaries
//
// Scientific Foundation:
// [1] Tukey, J. W. (1949). Comparing individual means in the analysis of variance.
// [2] Kramer, C. Y. (1956). Extension of multiple range tests to group means
//     with unequal numbers of replications.
// [3] Copenhaver, M. D. & Holland, B. (1988). Computation of the distribution of
//     the maximum studentized range statistic. J. Stat. Comput. Simul. 30.

mod anova;
mod config;
mod descriptive;
mod studentized_range;
mod tukey;

pub use anova::{one_way_anova, one_way_anova_groups, AnovaRow, AnovaTable};
pub use config::StatsConfig;
pub use descriptive::{summarize, SystemSummary};
pub use studentized_range::{ptukey, qtukey};
pub use tukey::{tukey_hsd, tukey_hsd_groups, PairwiseComparison, TukeyHsd};

use crate::table::LongRecord;
use std::collections::HashMap;

/// Observations of one system
pub type Group = (String, Vec<f64>);

/// Split long-form records into per-system groups, first-appearance order
pub fn group_by_system(records: &[LongRecord]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let i = *index.entry(record.system.as_str()).or_insert_with(|| {
            groups.push((record.system.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[i].1.push(record.average_precision);
    }

    groups
}
