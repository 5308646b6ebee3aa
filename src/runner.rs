//! Evaluator execution
//!
//! Each invocation runs synchronously to completion with stdout and stderr
//! fully buffered before parsing. There is no timeout and no retry: the
//! evaluator is deterministic for identical inputs, so a failure is reported
//! once and the batch moves on.
//!
//! With more than one job, invocations are spread over a bounded crossbeam
//! worker pool. Results always come back in invocation order.

use crate::error::{EvalError, Result};
use crate::invocation::Invocation;
use crossbeam::channel;
use std::env;
use std::path::{Path, PathBuf};

/// Captured result of one evaluator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
}

impl EvaluationOutput {
    /// Output of a process that exited with status 0
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    fn status_string(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit status: {}", code),
            None => "terminated by signal".to_string(),
        }
    }

    /// Turn a non-zero exit into `EvaluatorFailed`
    pub fn check(self, system: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(EvalError::EvaluatorFailed {
                system: system.to_string(),
                status: self.status_string(),
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Something that can execute an evaluator invocation
///
/// The process-backed implementation is `ProcessEvaluator`; tests substitute
/// canned outputs.
pub trait Evaluator: Sync {
    fn evaluate(&self, invocation: &Invocation) -> Result<EvaluationOutput>;
}

/// Runs the real evaluator executable
#[derive(Debug, Clone)]
pub struct ProcessEvaluator {
    program: PathBuf,
}

impl ProcessEvaluator {
    /// Resolve the executable up front; fails with `EvaluatorNotFound`
    pub fn new(program: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            program: resolve_evaluator(program.as_ref())?,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Evaluator for ProcessEvaluator {
    fn evaluate(&self, invocation: &Invocation) -> Result<EvaluationOutput> {
        tracing::info!("[{}] {}", invocation.index, invocation);

        let output = invocation.command(&self.program).output()?;

        Ok(EvaluationOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

/// Resolve an evaluator path to an existing file
///
/// Paths with a directory component must exist as given; bare names are
/// looked up on `PATH`.
pub fn resolve_evaluator(program: &Path) -> Result<PathBuf> {
    let not_found = || EvalError::EvaluatorNotFound {
        path: program.to_path_buf(),
    };

    let has_dir = program
        .parent()
        .is_some_and(|p| !p.as_os_str().is_empty());

    if has_dir {
        return if program.is_file() {
            Ok(program.to_path_buf())
        } else {
            Err(not_found())
        };
    }

    let path_var = env::var_os("PATH").ok_or_else(not_found)?;
    env::split_paths(&path_var)
        .flat_map(|dir| candidates(&dir, program))
        .find(|candidate| candidate.is_file())
        .ok_or_else(not_found)
}

fn candidates(dir: &Path, program: &Path) -> Vec<PathBuf> {
    let plain = dir.join(program);
    if cfg!(windows) && plain.extension().is_none() {
        vec![plain.with_extension("exe"), plain]
    } else {
        vec![plain]
    }
}

/// Run every invocation and return the captured outputs in invocation order
///
/// Outputs are returned as captured, whatever the exit status; callers apply
/// `EvaluationOutput::check` once they have kept what they need from them.
/// `jobs <= 1` runs sequentially on the calling thread.
pub fn run_all<E: Evaluator>(
    evaluator: &E,
    invocations: &[Invocation],
    jobs: usize,
) -> Vec<Result<EvaluationOutput>> {
    let run_one = |inv: &Invocation| evaluator.evaluate(inv);

    if jobs <= 1 || invocations.len() <= 1 {
        return invocations.iter().map(run_one).collect();
    }

    let workers = jobs.min(invocations.len());
    let (task_tx, task_rx) = channel::bounded::<usize>(workers);
    let (result_tx, result_rx) = channel::unbounded::<(usize, Result<EvaluationOutput>)>();

    let mut slots: Vec<Option<Result<EvaluationOutput>>> =
        invocations.iter().map(|_| None).collect();

    crossbeam::scope(|scope| {
        for _ in 0..workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let run_one = &run_one;
            scope.spawn(move |_| {
                for idx in task_rx.iter() {
                    if result_tx.send((idx, run_one(&invocations[idx]))).is_err() {
                        break;
                    }
                }
            });
        }
        drop(task_rx);
        drop(result_tx);

        for idx in 0..invocations.len() {
            if task_tx.send(idx).is_err() {
                break;
            }
        }
        drop(task_tx);

        for (idx, result) in result_rx.iter() {
            slots[idx] = Some(result);
        }
    })
    .unwrap_or_else(|_| tracing::warn!("An evaluator worker thread panicked"));

    slots
        .into_iter()
        .zip(invocations)
        .map(|(slot, inv)| {
            slot.unwrap_or_else(|| {
                Err(EvalError::EvaluatorFailed {
                    system: inv.system.clone(),
                    status: "worker terminated".to_string(),
                    stderr: String::new(),
                })
            })
        })
        .collect()
}
