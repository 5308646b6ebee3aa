//! Error taxonomy for evaluation runs and significance testing
//!
//! Per-invocation failures (`EvaluatorFailed`, `UnparsableOutput`) are
//! reported and the batch continues. `EvaluatorNotFound` and
//! `TopicSetMismatch` stop the pipeline before any work that depends on them.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the extraction and analysis pipelines
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Evaluator executable not found: {}", path.display())]
    EvaluatorNotFound { path: PathBuf },

    #[error("Evaluator failed for {system} ({status}): {stderr}")]
    EvaluatorFailed {
        system: String,
        status: String,
        stderr: String,
    },

    #[error("No usable '{metric}' rows in evaluator output for {system}")]
    UnparsableOutput { system: String, metric: String },

    #[error(
        "Topic set of {system} differs from reference {reference}: {missing} missing, {extra} extra"
    )]
    TopicSetMismatch {
        system: String,
        reference: String,
        missing: usize,
        extra: usize,
    },

    #[error("Duplicate topic {topic} in output of {system}")]
    DuplicateTopic { system: String, topic: String },

    #[error("Unknown phase selector '{0}' (expected 1-4, train, short-term, long-term or held-out)")]
    InvalidPhase(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EvalError {
    /// True for errors that abort the whole batch rather than a single system
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            EvalError::EvaluatorFailed { .. } | EvalError::UnparsableOutput { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
