//! Parsing of trec_eval text output
//!
//! Every line has three tab-separated fields: measure name (right-padded with
//! spaces), topic id (`all` for the aggregate row) and value. Lines are
//! selected by measure name, never by position, so extra measures, reordered
//! output or a different trec_eval version do not shift what is picked up.

use crate::error::{EvalError, Result};
use serde::Serialize;

/// Topic id of aggregate rows
pub const AGGREGATE_TOPIC: &str = "all";

/// Measure names used by the pipelines
pub mod measure {
    pub const RUN_ID: &str = "runid";
    pub const MAP: &str = "map";
    /// Precision at R (R = number of relevant documents)
    pub const R_PREC: &str = "Rprec";
    pub const NDCG: &str = "ndcg";
}

/// One `measure \t topic \t value` line, borrowing from the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricLine<'a> {
    pub measure: &'a str,
    pub topic: &'a str,
    pub value: &'a str,
    /// The line as printed, without trailing line terminator
    pub raw: &'a str,
}

impl MetricLine<'_> {
    pub fn is_aggregate(&self) -> bool {
        self.topic == AGGREGATE_TOPIC
    }

    pub fn numeric_value(&self) -> Option<f64> {
        self.value.parse().ok()
    }
}

/// Parse a single output line; `None` for blank or malformed lines
pub fn parse_line(line: &str) -> Option<MetricLine<'_>> {
    let raw = line.trim_end_matches(['\r', '\n']);
    let mut fields = raw.splitn(3, '\t');

    let measure = fields.next()?.trim();
    let topic = fields.next()?.trim();
    let value = fields.next()?.trim();

    if measure.is_empty() || topic.is_empty() {
        return None;
    }

    Some(MetricLine {
        measure,
        topic,
        value,
        raw,
    })
}

/// Iterate over every well-formed line of an output
pub fn metric_lines(output: &str) -> impl Iterator<Item = MetricLine<'_>> {
    output.lines().filter_map(parse_line)
}

/// Find the aggregate row of a measure
pub fn aggregate<'a>(output: &'a str, measure: &str) -> Option<MetricLine<'a>> {
    metric_lines(output).find(|l| l.measure == measure && l.is_aggregate())
}

/// The four report lines the extractor keeps per system
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryLines {
    /// `runid` row; synthesized from the system name if absent
    pub title: String,
    pub map: String,
    pub r_prec: String,
    pub ndcg: String,
}

impl SummaryLines {
    pub fn as_array(&self) -> [&str; 4] {
        [&self.title, &self.map, &self.r_prec, &self.ndcg]
    }
}

/// Extract run id, MAP, P@R and NDCG aggregate rows by name
pub fn extract_summary(system: &str, output: &str) -> Result<SummaryLines> {
    let required = |name: &str| -> Result<String> {
        aggregate(output, name)
            .map(|l| l.raw.to_string())
            .ok_or_else(|| EvalError::UnparsableOutput {
                system: system.to_string(),
                metric: name.to_string(),
            })
    };

    let map = required(measure::MAP)?;
    let r_prec = required(measure::R_PREC)?;
    let ndcg = required(measure::NDCG)?;

    let title = match aggregate(output, measure::RUN_ID) {
        Some(line) => line.raw.to_string(),
        None => format!("{:<22}\t{}\t{}", measure::RUN_ID, AGGREGATE_TOPIC, system),
    };

    Ok(SummaryLines {
        title,
        map,
        r_prec,
        ndcg,
    })
}

/// Score of one topic under one measure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicScore {
    pub topic: String,
    pub value: f64,
}

impl TopicScore {
    pub fn new(topic: impl Into<String>, value: f64) -> Self {
        Self {
            topic: topic.into(),
            value,
        }
    }
}

/// Per-topic rows of a measure (aggregate row excluded), in output order
///
/// Requires `-q` output. No per-topic row at all is `UnparsableOutput`.
pub fn per_topic_scores(system: &str, output: &str, measure: &str) -> Result<Vec<TopicScore>> {
    let unparsable = || EvalError::UnparsableOutput {
        system: system.to_string(),
        metric: measure.to_string(),
    };

    let mut scores = Vec::new();
    for line in metric_lines(output).filter(|l| l.measure == measure && !l.is_aggregate()) {
        let value = line.numeric_value().ok_or_else(unparsable)?;
        scores.push(TopicScore::new(line.topic, value));
    }

    if scores.is_empty() {
        return Err(unparsable());
    }
    Ok(scores)
}
