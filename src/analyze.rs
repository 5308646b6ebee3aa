//! Significance analysis pipeline
//!
//! Runs the evaluator in per-topic mode for every system of a phase, collects
//! average precision per topic, applies configured score repairs, builds the
//! topic x system table and tests whether the systems differ: one-way ANOVA
//! on system identity, then Tukey-Kramer HSD over every pair.

use crate::config::EvalConfig;
use crate::error::{EvalError, Result};
use crate::invocation::{plan, OutputMode};
use crate::overrides::apply_overrides;
use crate::phase::Phase;
use crate::report::{render_anova, render_summary, render_tukey};
use crate::runner::{run_all, Evaluator};
use crate::stats::{one_way_anova, summarize, tukey_hsd, AnovaTable, SystemSummary, TukeyHsd};
use crate::table::{ScoreTable, SystemScores};
use crate::trec_output::{measure, per_topic_scores};
use serde::Serialize;
use std::fmt::Write as _;

/// Everything the analyzer found for one phase
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub phase: Phase,
    pub topics: usize,
    /// Systems that entered the analysis, in roster order
    pub systems: Vec<String>,
    /// Systems left out because their evaluation failed
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<SystemSummary>>,
    pub anova: AnovaTable,
    pub tukey: TukeyHsd,
}

impl AnalysisReport {
    /// Console report: topic count, optional summary, ANOVA and Tukey tables
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "[CHECK] Detected {} topics", self.topics);

        if let Some(summary) = &self.summary {
            let _ = writeln!(out);
            out.push_str(&render_summary(summary));
        }

        let _ = writeln!(out);
        out.push_str(&render_anova(&self.anova));
        let verdict = if self.anova.is_significant(self.tukey.alpha) {
            "significant"
        } else {
            "not significant"
        };
        let _ = writeln!(out, "System effect at alpha={}: {}", self.tukey.alpha, verdict);
        let _ = writeln!(out);
        out.push_str(&render_tukey(&self.tukey));
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Collect per-topic MAP for every configured system and test for differences
///
/// Systems whose evaluator run fails or whose output has no per-topic rows
/// are skipped with a warning; the rest are analyzed. Topic-set disagreement
/// among the remaining systems is fatal.
pub fn run_analysis<E: Evaluator>(
    evaluator: &E,
    config: &EvalConfig,
    phase: Phase,
) -> Result<AnalysisReport> {
    tracing::info!("Executing in {}", phase.description());

    let invocations = plan(config, phase, OutputMode::PerTopic)?;
    let results = run_all(evaluator, &invocations, config.jobs);

    let mut runs = Vec::with_capacity(invocations.len());
    let mut skipped = Vec::new();

    for (inv, result) in invocations.iter().zip(results) {
        let scores = result
            .and_then(|out| out.check(&inv.system))
            .and_then(|out| per_topic_scores(&inv.system, &out.stdout, measure::MAP));
        match scores {
            Ok(mut scores) => {
                let applied = apply_overrides(
                    &config.overrides,
                    phase,
                    inv.index,
                    &inv.system,
                    &mut scores,
                );
                if applied > 0 {
                    tracing::info!("Applied {} score override(s) to {}", applied, inv.system);
                }
                runs.push(SystemScores::new(inv.system.clone(), scores));
            }
            Err(e) if !e.is_fatal() => {
                tracing::warn!("Skipping {}: {}", inv.system, e);
                skipped.push(inv.system.clone());
            }
            Err(e) => return Err(e),
        }
    }

    if runs.len() < 2 {
        return Err(EvalError::InsufficientData(format!(
            "{} of {} systems produced scores; at least 2 are needed",
            runs.len(),
            invocations.len()
        )));
    }

    let table = ScoreTable::assemble(&runs)?;
    tracing::debug!(
        "Score table: {} topics x {} systems",
        table.n_topics(),
        table.n_systems()
    );

    let records = table.melt();
    let anova = one_way_anova(&records)?;
    let tukey = tukey_hsd(&records, config.stats.significance_level)?;
    let summary = if config.stats.show_summary {
        Some(summarize(&records)?)
    } else {
        None
    };

    Ok(AnalysisReport {
        phase,
        topics: table.n_topics(),
        systems: table.systems().to_vec(),
        skipped,
        summary,
        anova,
        tukey,
    })
}
