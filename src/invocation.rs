//! Evaluator invocation building
//!
//! An invocation is an argument list, never a shell string: paths with spaces
//! survive intact and nothing is interpreted by a shell. `Display` renders the
//! equivalent command line for logs.

use crate::config::EvalConfig;
use crate::error::{EvalError, Result};
use crate::phase::Phase;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Which kind of evaluator output a pipeline needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Aggregate measures over all topics (`-m all_trec`)
    Aggregate,
    /// Per-topic rows in addition to aggregates (`-q`)
    PerTopic,
}

/// One evaluator call for one (system, phase) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// System name the run file belongs to
    pub system: String,
    /// 1-based position of the system in the roster
    pub index: usize,
    pub program: PathBuf,
    pub flags: Vec<String>,
    pub qrels: PathBuf,
    pub run: PathBuf,
}

impl Invocation {
    pub fn new(
        system: impl Into<String>,
        index: usize,
        program: impl Into<PathBuf>,
        flags: &[String],
        qrels: impl Into<PathBuf>,
        run: impl Into<PathBuf>,
    ) -> Self {
        Self {
            system: system.into(),
            index,
            program: program.into(),
            flags: flags.to_vec(),
            qrels: qrels.into(),
            run: run.into(),
        }
    }

    /// Arguments after the program: flags, then judgments, then run
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.flags.iter().map(OsString::from).collect();
        args.push(self.qrels.clone().into_os_string());
        args.push(self.run.clone().into_os_string());
        args
    }

    /// Build the process command, with `program` replaced by a resolved path
    pub fn command(&self, program: &Path) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(self.args());
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for flag in &self.flags {
            write!(f, " {}", flag)?;
        }
        write!(f, " {} {}", self.qrels.display(), self.run.display())
    }
}

/// Build one invocation per configured system, in roster order
///
/// An empty roster produces an empty plan.
pub fn plan(config: &EvalConfig, phase: Phase, mode: OutputMode) -> Result<Vec<Invocation>> {
    let qrels = config.qrels_for(phase).ok_or_else(|| {
        EvalError::Config(format!("no relevance judgments configured for phase {}", phase))
    })?;

    let flags = match mode {
        OutputMode::Aggregate => &config.extract_flags,
        OutputMode::PerTopic => &config.per_topic_flags,
    };
    let program = config.evaluator_path();

    let invocations: Vec<Invocation> = config
        .systems
        .iter()
        .enumerate()
        .map(|(i, system)| {
            Invocation::new(
                system.name.clone(),
                i + 1,
                program.clone(),
                flags,
                qrels,
                config.run_file(system, phase),
            )
        })
        .collect();

    tracing::debug!(
        "Planned {} invocations for {} ({:?})",
        invocations.len(),
        phase,
        mode
    );
    Ok(invocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhaseFiles;

    #[test]
    fn test_args_order() {
        let inv = Invocation::new(
            "sys",
            1,
            "trec_eval",
            &["-m".to_string(), "all_trec".to_string()],
            "qrels.txt",
            "run.ST",
        );
        let args: Vec<String> = inv
            .args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["-m", "all_trec", "qrels.txt", "run.ST"]);
    }

    #[test]
    fn test_display_is_shell_like() {
        let inv = Invocation::new("sys", 1, "../trec_eval", &["-q".to_string()], "q.txt", "r.LT");
        assert_eq!(inv.to_string(), "../trec_eval -q q.txt r.LT");
    }

    #[test]
    fn test_plan_one_per_system_in_order() {
        let config = EvalConfig::default();
        let invocations = plan(&config, Phase::LongTerm, OutputMode::PerTopic).unwrap();

        assert_eq!(invocations.len(), 5);
        for (i, inv) in invocations.iter().enumerate() {
            assert_eq!(inv.index, i + 1);
            assert_eq!(inv.system, config.systems[i].name);
            assert_eq!(inv.flags, vec!["-q"]);
            assert!(inv.qrels.ends_with("b-long-september.txt"));
            assert!(inv.run.to_string_lossy().ends_with(".LT"));
        }
    }

    #[test]
    fn test_plan_aggregate_flags() {
        let config = EvalConfig::default();
        let invocations = plan(&config, Phase::Train, OutputMode::Aggregate).unwrap();
        assert_eq!(invocations[0].flags, vec!["-m", "all_trec"]);
        assert!(invocations[0].qrels.ends_with("qrels.txt"));
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_plan_empty_roster() {
        let mut config = EvalConfig::default();
        config.systems.clear();
        let invocations = plan(&config, Phase::ShortTerm, OutputMode::Aggregate).unwrap();
        assert!(invocations.is_empty());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_plan_missing_qrels() {
        let mut config = EvalConfig::default();
        config.qrels = PhaseFiles::default();
        assert!(matches!(
            plan(&config, Phase::HeldOut, OutputMode::Aggregate),
            Err(EvalError::Config(_))
        ));
    }
}
