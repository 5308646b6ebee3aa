// Integration test utilities
//
// Builds a throwaway evaluation workspace: a fake trec_eval script that
// prints its run file (the run files hold canned evaluator output), qrels,
// run files laid out the way the config expects, and a TOML config.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prints the last argument's file contents; a missing file exits non-zero
const FAKE_TREC_EVAL: &str = "#!/bin/sh\nfor last; do :; done\nexec cat \"$last\"\n";

pub struct EvalWorkspace {
    pub dir: TempDir,
    systems: Vec<String>,
}

impl EvalWorkspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();

        let evaluator = root.join("trec_eval");
        fs::write(&evaluator, FAKE_TREC_EVAL).expect("write fake evaluator");
        fs::set_permissions(&evaluator, fs::Permissions::from_mode(0o755))
            .expect("chmod fake evaluator");

        fs::create_dir_all(root.join("runs")).expect("runs dir");
        for name in ["qrels-train.txt", "qrels-st.txt", "qrels-lt.txt", "qrels-wt.txt"] {
            fs::write(root.join(name), "q1 0 doc1 1\n").expect("write qrels");
        }

        Self {
            dir,
            systems: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn evaluator(&self) -> PathBuf {
        self.root().join("trec_eval")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root().join("scores")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("trecsig.toml")
    }

    /// Register a system and write its run file for `suffix` with canned output
    pub fn add_run(&mut self, system: &str, suffix: &str, output: &str) -> &mut Self {
        let path = if suffix == "TRAIN" {
            self.root().join("runs").join(format!("{}.TRAIN", system))
        } else {
            let dir = self.root().join("runs").join(system);
            fs::create_dir_all(&dir).expect("system run dir");
            dir.join(format!("{}.{}", system, suffix))
        };
        fs::write(path, output).expect("write run file");

        if !self.systems.iter().any(|s| s == system) {
            self.systems.push(system.to_string());
        }
        self
    }

    /// Register a system without writing any run file (evaluator will fail)
    pub fn add_missing_run(&mut self, system: &str) -> &mut Self {
        self.systems.push(system.to_string());
        self
    }

    /// Write the TOML config; `extra` is appended verbatim
    pub fn write_config(&self, extra: &str) -> PathBuf {
        let root = self.root();
        let mut toml = format!(
            "evaluator = {:?}\nruns_dir = {:?}\noutput_dir = {:?}\n\n[qrels]\ntrain = {:?}\nshort-term = {:?}\nlong-term = {:?}\nheld-out = {:?}\n",
            self.evaluator(),
            root.join("runs"),
            self.output_dir(),
            root.join("qrels-train.txt"),
            root.join("qrels-st.txt"),
            root.join("qrels-lt.txt"),
            root.join("qrels-wt.txt"),
        );
        for system in &self.systems {
            toml.push_str(&format!("\n[[system]]\nname = {:?}\n", system));
        }
        toml.push_str(extra);

        let path = self.config_path();
        fs::write(&path, toml).expect("write config");
        path
    }
}

/// Canned `trec_eval -q -m all_trec` style output for one run
///
/// Per-topic `map` rows followed by the aggregate block the extractor reads.
pub fn trec_eval_output(run: &str, topics: &[(&str, f64)]) -> String {
    let mut out = String::new();
    for (topic, ap) in topics {
        out.push_str(&format!("num_ret               \t{}\t1000\n", topic));
        out.push_str(&format!("map                   \t{}\t{:.4}\n", topic, ap));
        out.push_str(&format!("Rprec                 \t{}\t{:.4}\n", topic, ap * 0.9));
    }
    let mean = if topics.is_empty() {
        0.0
    } else {
        topics.iter().map(|(_, v)| v).sum::<f64>() / topics.len() as f64
    };
    out.push_str(&format!("runid                 \tall\t{}\n", run));
    out.push_str(&format!("num_q                 \tall\t{}\n", topics.len()));
    out.push_str(&format!("map                   \tall\t{:.4}\n", mean));
    out.push_str(&format!("Rprec                 \tall\t{:.4}\n", mean * 0.9));
    out.push_str(&format!("ndcg                  \tall\t{:.4}\n", mean * 1.5));
    out
}
