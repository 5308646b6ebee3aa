//! Evaluation phases and evaluator path styles
//!
//! A phase pairs one relevance-judgment file with one run file per system.
//! Phases are opaque tags: nothing is inferred from the short-term / long-term
//! naming beyond which files they select.

use crate::error::EvalError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Evaluation phase of the benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Training runs
    Train,
    /// Short-term test runs
    ShortTerm,
    /// Long-term test runs
    LongTerm,
    /// Held-out test runs
    HeldOut,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Train,
        Phase::ShortTerm,
        Phase::LongTerm,
        Phase::HeldOut,
    ];

    /// Map the numeric selector used on the command line (1-4) to a phase
    pub fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            1 => Some(Phase::Train),
            2 => Some(Phase::ShortTerm),
            3 => Some(Phase::LongTerm),
            4 => Some(Phase::HeldOut),
            _ => None,
        }
    }

    /// Run-file and report suffix (`TRAIN`, `ST`, `LT`, `WT`)
    pub fn suffix(&self) -> &'static str {
        match self {
            Phase::Train => "TRAIN",
            Phase::ShortTerm => "ST",
            Phase::LongTerm => "LT",
            Phase::HeldOut => "WT",
        }
    }

    /// Kebab-case name, as accepted on the command line and in TOML
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Train => "train",
            Phase::ShortTerm => "short-term",
            Phase::LongTerm => "long-term",
            Phase::HeldOut => "held-out",
        }
    }

    /// Human-readable description for progress logging
    pub fn description(&self) -> &'static str {
        match self {
            Phase::Train => "training runs",
            Phase::ShortTerm => "short-term test runs",
            Phase::LongTerm => "long-term test runs",
            Phase::HeldOut => "held-out test runs",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Phase {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(selector) = trimmed.parse::<u8>() {
            return Phase::from_selector(selector)
                .ok_or_else(|| EvalError::InvalidPhase(s.to_string()));
        }

        let lowered = trimmed.to_ascii_lowercase();
        Phase::ALL
            .into_iter()
            .find(|p| p.name() == lowered || p.suffix().eq_ignore_ascii_case(&lowered))
            .ok_or_else(|| EvalError::InvalidPhase(s.to_string()))
    }
}

/// Path style for the default evaluator location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// `../trec_eval-9.0.7/trec_eval`
    #[default]
    Linux,
    /// `..\trec_eval-9.0.7\trec_eval.exe`
    Windows,
}

impl Platform {
    /// Platform of the running binary
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Default evaluator location relative to the working directory
    pub fn default_evaluator(&self) -> &'static str {
        match self {
            Platform::Linux => "../trec_eval-9.0.7/trec_eval",
            Platform::Windows => "..\\trec_eval-9.0.7\\trec_eval.exe",
        }
    }
}
