//! Score extraction pipeline
//!
//! Runs the evaluator with aggregate measures for every system of a phase,
//! keeps each full output as `output<SUFFIX><i>.txt`, and appends the run id,
//! MAP, P@R and NDCG rows of every system to `scores_<SUFFIX>.txt` in roster
//! order. The summary is truncated first, so reruns never accumulate.

use crate::config::EvalConfig;
use crate::error::Result;
use crate::invocation::{plan, OutputMode};
use crate::phase::Phase;
use crate::runner::{run_all, Evaluator};
use crate::trec_output::{extract_summary, SummaryLines};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A system whose scores did not make it into the summary
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSystem {
    pub system: String,
    pub reason: String,
}

/// Outcome of one extraction run
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    pub phase: Phase,
    pub summary_path: PathBuf,
    /// Raw evaluator outputs written, in roster order
    pub raw_outputs: Vec<PathBuf>,
    /// Summary lines appended, per system, in roster order
    pub extracted: Vec<(String, SummaryLines)>,
    pub skipped: Vec<SkippedSystem>,
}

/// `scores_<SUFFIX>.txt` under the output directory
pub fn summary_path(output_dir: &Path, phase: Phase) -> PathBuf {
    output_dir.join(format!("scores_{}.txt", phase.suffix()))
}

/// `output<SUFFIX><i>.txt` under the output directory (i is 1-based)
pub fn raw_output_path(output_dir: &Path, phase: Phase, index: usize) -> PathBuf {
    output_dir.join(format!("output{}{}.txt", phase.suffix(), index))
}

/// Extract summary measures for every configured system of a phase
pub fn run_extraction<E: Evaluator>(
    evaluator: &E,
    config: &EvalConfig,
    phase: Phase,
) -> Result<ExtractionReport> {
    tracing::info!("Extracting scores for {}", phase.description());

    let invocations = plan(config, phase, OutputMode::Aggregate)?;
    let output_dir = &config.output_dir;
    fs::create_dir_all(output_dir)?;

    let summary_path = summary_path(output_dir, phase);
    File::create(&summary_path)?;

    let mut report = ExtractionReport {
        phase,
        summary_path: summary_path.clone(),
        raw_outputs: Vec::new(),
        extracted: Vec::new(),
        skipped: Vec::new(),
    };

    let results = run_all(evaluator, &invocations, config.jobs);
    for (inv, result) in invocations.iter().zip(results) {
        let parsed = result.and_then(|output| {
            // Raw output is kept even for a failed run
            let raw_path = raw_output_path(output_dir, phase, inv.index);
            fs::write(&raw_path, &output.stdout)?;
            report.raw_outputs.push(raw_path);

            let output = output.check(&inv.system)?;
            extract_summary(&inv.system, &output.stdout)
        });

        match parsed {
            Ok(lines) => {
                append_summary(&summary_path, &lines)?;
                report.extracted.push((inv.system.clone(), lines));
            }
            Err(e) if !e.is_fatal() => {
                tracing::warn!("Skipping {}: {}", inv.system, e);
                report.skipped.push(SkippedSystem {
                    system: inv.system.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        "Wrote {} of {} systems to {}",
        report.extracted.len(),
        invocations.len(),
        summary_path.display()
    );
    Ok(report)
}

fn append_summary(path: &Path, lines: &SummaryLines) -> Result<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    for line in lines.as_array() {
        writeln!(file, "{}", line)?;
    }
    Ok(())
}
