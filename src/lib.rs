//! trecsig - batch trec_eval runner and significance tester
//!
//! This library drives an external `trec_eval` executable over a roster of
//! retrieval runs, extracts summary measures per system, and tests whether
//! per-topic average precision differs across systems with a one-way ANOVA
//! followed by Tukey-Kramer pairwise comparisons.

pub mod analyze;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod invocation;
pub mod overrides;
pub mod phase;
pub mod report;
pub mod runner;
pub mod stats;
pub mod table;
pub mod trec_output;
