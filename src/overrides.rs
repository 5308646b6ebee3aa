//! Data-repair overrides for per-topic scores
//!
//! Some historical runs lack an evaluation row for a topic that every other
//! system has. Rather than patching by output line number, repairs are keyed
//! by (phase, system, topic id), so they stay correct when the evaluator
//! orders its output differently. A system is named either by its run name or
//! by its 1-based roster index.

use crate::phase::Phase;
use crate::trec_output::TopicScore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Run name of the system the built-in long-term repair applies to
pub const LONG_TERM_GAP_SYSTEM: &str = "seupd2223-JIHUMING-07_fr_fr";

/// The system an override targets
///
/// In TOML an integer is a roster index (`system = 1`) and a string is a run
/// name (`system = "bm25"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemRef {
    /// 1-based roster index
    Index(usize),
    /// Run name
    Name(String),
}

impl SystemRef {
    pub fn matches(&self, index: usize, name: &str) -> bool {
        match self {
            SystemRef::Index(i) => *i == index,
            SystemRef::Name(n) => n == name,
        }
    }
}

impl fmt::Display for SystemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemRef::Index(i) => write!(f, "#{}", i),
            SystemRef::Name(n) => f.write_str(n),
        }
    }
}

/// A forced score for one topic of one system in one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOverride {
    pub phase: Phase,
    pub system: SystemRef,
    pub topic: String,
    #[serde(default)]
    pub value: f64,
}

impl ScoreOverride {
    /// Override for the system at a 1-based roster index
    pub fn new(phase: Phase, system: usize, topic: impl Into<String>, value: f64) -> Self {
        Self {
            phase,
            system: SystemRef::Index(system),
            topic: topic.into(),
            value,
        }
    }

    /// Override for the system with the given run name, wherever it sits
    pub fn for_run(
        phase: Phase,
        run: impl Into<String>,
        topic: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            phase,
            system: SystemRef::Name(run.into()),
            topic: topic.into(),
            value,
        }
    }

    /// Repairs needed by the LongEval 2023 runs
    ///
    /// `seupd2223-JIHUMING-07_fr_fr` has no evaluation row for topic
    /// `q0922511` in the long-term collection; it scores zero. Rosters that
    /// do not contain that run are unaffected.
    pub fn known_repairs() -> Vec<Self> {
        vec![ScoreOverride::for_run(
            Phase::LongTerm,
            LONG_TERM_GAP_SYSTEM,
            "q0922511",
            0.0,
        )]
    }
}

/// Apply every matching override to one system's per-topic scores
///
/// An existing row for the topic takes the override value; a missing one is
/// appended. Either way the topic appears exactly once afterwards. Returns the
/// number of overrides applied.
pub fn apply_overrides(
    overrides: &[ScoreOverride],
    phase: Phase,
    system_index: usize,
    system_name: &str,
    scores: &mut Vec<TopicScore>,
) -> usize {
    let mut applied = 0;

    for ov in overrides
        .iter()
        .filter(|o| o.phase == phase && o.system.matches(system_index, system_name))
    {
        match scores.iter_mut().find(|s| s.topic == ov.topic) {
            Some(row) => {
                tracing::debug!(
                    "Override replaces {} = {} with {} ({})",
                    ov.topic,
                    row.value,
                    ov.value,
                    system_name
                );
                row.value = ov.value;
            }
            None => {
                tracing::info!(
                    "Injecting missing topic {} = {} for {} ({})",
                    ov.topic,
                    ov.value,
                    system_name,
                    phase
                );
                scores.push(TopicScore::new(ov.topic.clone(), ov.value));
            }
        }
        applied += 1;
    }

    applied
}
