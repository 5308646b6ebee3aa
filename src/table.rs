//! Topic × system score table
//!
//! Rows are topics in the order the reference (first) system reported them,
//! columns are systems in roster order. Assembly refuses to align systems
//! whose topic sets differ: a misaligned row would silently corrupt the
//! ANOVA, so `TopicSetMismatch` is raised before any statistics run.

use crate::error::{EvalError, Result};
use crate::trec_output::TopicScore;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Per-topic scores of one system, in output order
#[derive(Debug, Clone, PartialEq)]
pub struct SystemScores {
    pub system: String,
    pub scores: Vec<TopicScore>,
}

impl SystemScores {
    pub fn new(system: impl Into<String>, scores: Vec<TopicScore>) -> Self {
        Self {
            system: system.into(),
            scores,
        }
    }
}

/// One (topic, system, average precision) observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRecord {
    pub topic: String,
    pub system: String,
    pub average_precision: f64,
}

/// Complete topic × system table (no missing cells)
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    topics: Vec<String>,
    systems: Vec<String>,
    /// `values[row][column]`
    values: Vec<Vec<f64>>,
}

impl ScoreTable {
    /// Align per-system scores by topic id
    ///
    /// # Errors
    /// - `InsufficientData` when there are no systems
    /// - `DuplicateTopic` when a system reports a topic twice
    /// - `TopicSetMismatch` when a system's topics differ from the first system's
    pub fn assemble(runs: &[SystemScores]) -> Result<Self> {
        let reference = runs
            .first()
            .ok_or_else(|| EvalError::InsufficientData("no systems to tabulate".to_string()))?;

        for run in runs {
            check_unique(run)?;
        }

        let topics: Vec<String> = reference.scores.iter().map(|s| s.topic.clone()).collect();
        let row_of: HashMap<&str, usize> = topics
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        for run in &runs[1..] {
            let theirs: HashSet<&str> = run.scores.iter().map(|s| s.topic.as_str()).collect();
            let missing = row_of.keys().filter(|t| !theirs.contains(*t)).count();
            let extra = theirs.iter().filter(|t| !row_of.contains_key(*t)).count();

            if missing > 0 || extra > 0 {
                return Err(EvalError::TopicSetMismatch {
                    system: run.system.clone(),
                    reference: reference.system.clone(),
                    missing,
                    extra,
                });
            }
        }

        let mut values = vec![vec![0.0; runs.len()]; topics.len()];
        for (col, run) in runs.iter().enumerate() {
            for score in &run.scores {
                values[row_of[score.topic.as_str()]][col] = score.value;
            }
        }

        Ok(Self {
            topics,
            systems: runs.iter().map(|r| r.system.clone()).collect(),
            values,
        })
    }

    /// Rebuild a table from long-form records (inverse of `melt`)
    ///
    /// Systems keep their first-appearance order; topics follow the first
    /// system's record order.
    pub fn pivot(records: &[LongRecord]) -> Result<Self> {
        let mut runs: Vec<SystemScores> = Vec::new();
        let mut column_of: HashMap<&str, usize> = HashMap::new();

        for record in records {
            let col = *column_of.entry(record.system.as_str()).or_insert_with(|| {
                runs.push(SystemScores::new(record.system.clone(), Vec::new()));
                runs.len() - 1
            });
            runs[col]
                .scores
                .push(TopicScore::new(record.topic.clone(), record.average_precision));
        }

        Self::assemble(&runs)
    }

    /// Reshape to one record per (topic, system), system-major
    pub fn melt(&self) -> Vec<LongRecord> {
        let mut records = Vec::with_capacity(self.topics.len() * self.systems.len());
        for (col, system) in self.systems.iter().enumerate() {
            for (row, topic) in self.topics.iter().enumerate() {
                records.push(LongRecord {
                    topic: topic.clone(),
                    system: system.clone(),
                    average_precision: self.values[row][col],
                });
            }
        }
        records
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn systems(&self) -> &[String] {
        &self.systems
    }

    pub fn n_topics(&self) -> usize {
        self.topics.len()
    }

    pub fn n_systems(&self) -> usize {
        self.systems.len()
    }

    /// Score of a system on a topic
    pub fn get(&self, topic: &str, system: &str) -> Option<f64> {
        let row = self.topics.iter().position(|t| t == topic)?;
        let col = self.systems.iter().position(|s| s == system)?;
        Some(self.values[row][col])
    }

    /// All topic scores of one system, in row order
    #[cfg(test)]
    pub(crate) fn column(&self, system: &str) -> Option<Vec<f64>> {
        let col = self.systems.iter().position(|s| s == system)?;
        Some(self.values.iter().map(|row| row[col]).collect())
    }
}

fn check_unique(run: &SystemScores) -> Result<()> {
    let mut seen = HashSet::with_capacity(run.scores.len());
    for score in &run.scores {
        if !seen.insert(score.topic.as_str()) {
            return Err(EvalError::DuplicateTopic {
                system: run.system.clone(),
                topic: score.topic.clone(),
            });
        }
    }
    Ok(())
}
