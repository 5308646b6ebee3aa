//! Fixed-width text rendering of analysis results
//!
//! Layout follows the usual statistics-package console tables: an ANOVA
//! table with `df`, `sum_sq`, `mean_sq`, `F`, `PR(>F)` columns and a Tukey
//! table with one row per system pair.

use crate::stats::{AnovaRow, AnovaTable, SystemSummary, TukeyHsd};
use std::fmt::Write as _;

fn fmt_opt(value: Option<f64>, width: usize, sci: bool) -> String {
    match value {
        Some(v) if sci => format!("{:>width$.6e}", v, width = width),
        Some(v) => format!("{:>width$.6}", v, width = width),
        None => format!("{:>width$}", "NaN", width = width),
    }
}

/// Render an ANOVA table
pub fn render_anova(table: &AnovaTable) -> String {
    let label_width = [&table.factor, &table.residual]
        .iter()
        .map(|r| r.source.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<lw$} {:>8} {:>12} {:>12} {:>12} {:>14}",
        "",
        "df",
        "sum_sq",
        "mean_sq",
        "F",
        "PR(>F)",
        lw = label_width
    );

    let row = |out: &mut String, r: &AnovaRow| {
        let _ = writeln!(
            out,
            "{:<lw$} {:>8.1} {:>12.6} {:>12.6} {} {}",
            r.source,
            r.df,
            r.sum_sq,
            r.mean_sq,
            fmt_opt(r.f, 12, false),
            fmt_opt(r.p_value, 14, true),
            lw = label_width
        );
    };
    row(&mut out, &table.factor);
    row(&mut out, &table.residual);

    out
}

/// Render the pairwise Tukey-Kramer comparisons
pub fn render_tukey(tukey: &TukeyHsd) -> String {
    let w1 = tukey
        .comparisons
        .iter()
        .map(|c| c.group1.len())
        .chain(std::iter::once("group1".len()))
        .max()
        .unwrap_or(6);
    let w2 = tukey
        .comparisons
        .iter()
        .map(|c| c.group2.len())
        .chain(std::iter::once("group2".len()))
        .max()
        .unwrap_or(6);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Multiple Comparison of Means - Tukey HSD, FWER={:.2}",
        tukey.alpha
    );
    let _ = writeln!(
        out,
        "{:<w1$}  {:<w2$} {:>9} {:>9} {:>9} {:>9} {:>9}  reject",
        "group1",
        "group2",
        "meandiff",
        "lower",
        "upper",
        "q-value",
        "p-adj",
        w1 = w1,
        w2 = w2
    );

    for c in &tukey.comparisons {
        let _ = writeln!(
            out,
            "{:<w1$}  {:<w2$} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4}  {}",
            c.group1,
            c.group2,
            c.mean_diff,
            c.lower,
            c.upper,
            c.q_value,
            c.p_value,
            if c.reject { "True" } else { "False" },
            w1 = w1,
            w2 = w2
        );
    }
    let _ = writeln!(
        out,
        "Significant pairs: {} of {}",
        tukey.significant_pairs().count(),
        tukey.comparisons.len()
    );

    out
}

/// Render per-system descriptive statistics
pub fn render_summary(summary: &[SystemSummary]) -> String {
    let width = summary
        .iter()
        .map(|s| s.system.len())
        .chain(std::iter::once("system".len()))
        .max()
        .unwrap_or(6);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<w$} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "system",
        "n",
        "mean",
        "median",
        "std",
        "min",
        "max",
        w = width
    );
    for s in summary {
        let _ = writeln!(
            out,
            "{:<w$} {:>6} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4}",
            s.system,
            s.n,
            s.mean,
            s.median,
            s.stddev,
            s.min,
            s.max,
            w = width
        );
    }
    out
}
