//! Pipeline configuration (trecsig.toml)
//!
//! Replaces the hard-coded phase / OS selectors of a one-off script with an
//! explicit value that is validated once and passed into each pipeline.
//!
//! # Example trecsig.toml
//!
//! ```toml
//! platform = "linux"
//! runs_dir = "runs/experiments"
//! output_dir = "runs/experiments/scores"
//! jobs = 2
//!
//! [qrels]
//! train = "runs/experiments/qrels.txt"
//! long-term = "runs/experiments/longeval-relevance-judgements/b-long-september.txt"
//!
//! [[system]]
//! name = "bm25_fr"
//!
//! [[system]]
//! name = "bm25_fr_ner"
//! runs = { long-term = "elsewhere/ner.LT" }
//!
//! [[override]]
//! phase = "long-term"
//! system = 1
//! topic = "q0922511"
//! value = 0.0
//!
//! [stats]
//! significance_level = 0.05
//! ```

use crate::overrides::{ScoreOverride, SystemRef};
use crate::phase::{Phase, Platform};
use crate::stats::StatsConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Systems compared in the original LongEval study, in roster order
pub const DEFAULT_SYSTEMS: [&str; 5] = [
    "seupd2223-JIHUMING-07_fr_fr",
    "seupd2223-JIHUMING-08_fr_fr_3gram",
    "seupd2223-JIHUMING-09_fr_fr_4gram",
    "seupd2223-JIHUMING-10_fr_fr_5gram",
    "seupd2223-JIHUMING-12_fr_fr_4gram_ner",
];

/// One optional path per phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PhaseFiles {
    pub train: Option<PathBuf>,
    pub short_term: Option<PathBuf>,
    pub long_term: Option<PathBuf>,
    pub held_out: Option<PathBuf>,
}

impl PhaseFiles {
    pub fn get(&self, phase: Phase) -> Option<&Path> {
        match phase {
            Phase::Train => self.train.as_deref(),
            Phase::ShortTerm => self.short_term.as_deref(),
            Phase::LongTerm => self.long_term.as_deref(),
            Phase::HeldOut => self.held_out.as_deref(),
        }
    }
}

/// A retrieval system under evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Run name, also the stem of its run files
    pub name: String,

    /// Explicit run files; phases left unset use the conventional layout
    #[serde(default)]
    pub runs: PhaseFiles,
}

impl SystemConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runs: PhaseFiles::default(),
        }
    }
}

/// Root configuration for both pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Evaluator executable; `None` picks the platform default
    pub evaluator: Option<PathBuf>,

    /// Path style used when `evaluator` is unset
    pub platform: Platform,

    /// Flags for aggregate extraction (`-m all_trec`)
    pub extract_flags: Vec<String>,

    /// Flags for per-topic output (`-q`)
    pub per_topic_flags: Vec<String>,

    /// Relevance judgments per phase
    pub qrels: PhaseFiles,

    /// Directory holding the run files
    pub runs_dir: PathBuf,

    /// Where the extractor writes raw outputs and summaries
    pub output_dir: PathBuf,

    /// Concurrent evaluator invocations (1 = sequential)
    pub jobs: usize,

    #[serde(rename = "system")]
    pub systems: Vec<SystemConfig>,

    #[serde(rename = "override")]
    pub overrides: Vec<ScoreOverride>,

    pub stats: StatsConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        let judgements = Path::new("runs/experiments/longeval-relevance-judgements");
        Self {
            evaluator: None,
            platform: Platform::current(),
            extract_flags: vec!["-m".to_string(), "all_trec".to_string()],
            per_topic_flags: vec!["-q".to_string()],
            qrels: PhaseFiles {
                train: Some(PathBuf::from("runs/experiments/qrels.txt")),
                short_term: Some(judgements.join("a-short-july.txt")),
                long_term: Some(judgements.join("b-long-september.txt")),
                held_out: Some(judgements.join("heldout-test.txt")),
            },
            runs_dir: PathBuf::from("runs/experiments"),
            output_dir: PathBuf::from("runs/experiments/scores"),
            jobs: 1,
            systems: DEFAULT_SYSTEMS.iter().map(|n| SystemConfig::new(*n)).collect(),
            overrides: ScoreOverride::known_repairs(),
            stats: StatsConfig::default(),
        }
    }
}

impl EvalConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Evaluator path, honoring the platform default
    pub fn evaluator_path(&self) -> PathBuf {
        self.evaluator
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.platform.default_evaluator()))
    }

    /// Relevance judgments for a phase
    pub fn qrels_for(&self, phase: Phase) -> Option<&Path> {
        self.qrels.get(phase)
    }

    /// Run file of a system for a phase
    ///
    /// Train runs sit directly in `runs_dir` (`<name>.TRAIN`); test runs sit in
    /// a per-system directory (`<name>/<name>.<SUFFIX>`).
    pub fn run_file(&self, system: &SystemConfig, phase: Phase) -> PathBuf {
        if let Some(explicit) = system.runs.get(phase) {
            return explicit.to_path_buf();
        }

        let file_name = format!("{}.{}", system.name, phase.suffix());
        match phase {
            Phase::Train => self.runs_dir.join(file_name),
            _ => self.runs_dir.join(&system.name).join(file_name),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.jobs == 0 {
            return Err("jobs must be >= 1".to_string());
        }

        let mut seen = HashSet::new();
        for system in &self.systems {
            if system.name.trim().is_empty() {
                return Err("system name must not be empty".to_string());
            }
            if !seen.insert(system.name.as_str()) {
                return Err(format!("duplicate system name '{}'", system.name));
            }
        }

        for ov in &self.overrides {
            if ov.system == SystemRef::Index(0) {
                return Err(format!(
                    "override for topic {} uses system index 0 (indices are 1-based)",
                    ov.topic
                ));
            }
            if !ov.value.is_finite() {
                return Err(format!("override for topic {} has a non-finite value", ov.topic));
            }
        }

        self.stats.validate()
    }
}
