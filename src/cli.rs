//! CLI argument parsing for trecsig

use crate::phase::{Phase, Platform};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for the analysis report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width tables (default)
    Text,
    /// Single JSON document for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "trecsig")]
#[command(version)]
#[command(
    about = "Batch trec_eval runner and significance tester for retrieval runs",
    long_about = None
)]
pub struct Cli {
    /// TOML configuration file (systems, qrels, overrides, statistics)
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Path style of the default evaluator location
    #[arg(long = "platform", value_enum, global = true)]
    pub platform: Option<Platform>,

    /// Evaluator executable (overrides the platform default)
    #[arg(long = "evaluator", value_name = "PATH", global = true)]
    pub evaluator: Option<PathBuf>,

    /// Concurrent evaluator invocations
    #[arg(short = 'j', long = "jobs", value_name = "N", global = true)]
    pub jobs: Option<usize>,

    /// Enable trace-level logging to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write raw evaluator output and MAP / P@R / NDCG summaries per system
    Extract {
        /// Phase: 1-4, or train | short-term | long-term | held-out
        #[arg(value_name = "PHASE", value_parser = parse_phase)]
        phase: Phase,

        /// Directory for output<SUFFIX><i>.txt and scores_<SUFFIX>.txt
        #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Run ANOVA and Tukey HSD on per-topic average precision
    Analyze {
        /// Phase: 1-4, or train | short-term | long-term | held-out
        #[arg(value_name = "PHASE", value_parser = parse_phase)]
        phase: Phase,

        /// Family-wise significance level
        #[arg(long = "alpha", value_name = "ALPHA")]
        alpha: Option<f64>,

        /// Report format (text or json)
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn parse_phase(s: &str) -> Result<Phase, String> {
    s.parse::<Phase>().map_err(|e| e.to_string())
}
