//! Analysis end-to-end tests
//!
//! `trecsig analyze` over canned per-topic output: topic detection, ANOVA and
//! Tukey tables, JSON report, and the long-term score repair.
#![cfg(unix)]

mod utils;

use predicates::prelude::*;
use utils::{trec_eval_output, EvalWorkspace};

fn two_system_workspace(suffix: &str) -> EvalWorkspace {
    let mut ws = EvalWorkspace::new();
    ws.add_run(
        "sysA",
        suffix,
        &trec_eval_output("sysA", &[("t1", 0.2), ("t2", 0.3), ("t3", 0.1)]),
    )
    .add_run(
        "sysB",
        suffix,
        &trec_eval_output("sysB", &[("t1", 0.8), ("t2", 0.7), ("t3", 0.9)]),
    );
    ws
}

#[test]
fn test_analyze_text_report() {
    let ws = two_system_workspace("TRAIN");
    let config = ws.write_config("");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("trecsig");
    cmd.arg("--config")
        .arg(&config)
        .arg("analyze")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[CHECK] Detected 3 topics"))
        .stdout(predicate::str::contains("C(system)"))
        .stdout(predicate::str::contains("Residual"))
        .stdout(predicate::str::contains("54.000000"))
        .stdout(predicate::str::contains("Multiple Comparison of Means"))
        .stdout(predicate::str::contains("True"))
        .stderr(predicate::str::contains("Executing in training runs"))
        .stderr(predicate::str::contains("[INFO]").not());
}

#[test]
fn test_analyze_json_report() {
    let ws = two_system_workspace("ST");
    let config = ws.write_config("");

    let output = assert_cmd::cargo::cargo_bin_cmd!("trecsig")
        .arg("--config")
        .arg(&config)
        .arg("analyze")
        .arg("2")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["phase"], "short-term");
    assert_eq!(json["topics"], 3);
    assert_eq!(json["systems"][0], "sysA");
    assert!(json["anova"]["factor"]["p_value"].as_f64().unwrap() < 0.05);
    assert_eq!(json["tukey"]["comparisons"].as_array().unwrap().len(), 1);
}

#[test]
fn test_analyze_identical_systems_not_significant() {
    let mut ws = EvalWorkspace::new();
    let topics = [("t1", 0.12), ("t2", 0.55), ("t3", 0.31), ("t4", 0.08)];
    for name in ["x", "y", "z"] {
        ws.add_run(name, "TRAIN", &trec_eval_output(name, &topics));
    }
    let config = ws.write_config("");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("trecsig");
    cmd.arg("--config")
        .arg(&config)
        .arg("analyze")
        .arg("train")
        .assert()
        .success()
        .stdout(predicate::str::contains("[CHECK] Detected 4 topics"))
        .stdout(predicate::str::contains("True").not());
}

#[test]
fn test_analyze_long_term_repair_fills_missing_topic() {
    let mut ws = EvalWorkspace::new();
    // First system lacks q0922511, the known gap in the long-term collection
    ws.add_run("first", "LT", &trec_eval_output("first", &[("q1", 0.2), ("q2", 0.3)]))
        .add_run(
            "second",
            "LT",
            &trec_eval_output("second", &[("q1", 0.4), ("q2", 0.5), ("q0922511", 0.1)]),
        );
    let config = ws.write_config(
        "\n[[override]]\nphase = \"long-term\"\nsystem = 1\ntopic = \"q0922511\"\nvalue = 0.0\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("trecsig");
    cmd.arg("--config")
        .arg(&config)
        .arg("analyze")
        .arg("long-term")
        .assert()
        .success()
        .stdout(predicate::str::contains("[CHECK] Detected 3 topics"));
}

#[test]
fn test_analyze_long_term_custom_roster_needs_no_repair() {
    // Built-in repair is keyed by run name, so an unrelated roster is untouched
    let ws = two_system_workspace("LT");
    let config = ws.write_config("");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("trecsig");
    cmd.arg("--config")
        .arg(&config)
        .arg("analyze")
        .arg("long-term")
        .assert()
        .success()
        .stdout(predicate::str::contains("[CHECK] Detected 3 topics"))
        .stderr(predicate::str::contains("score override").not());
}

#[test]
fn test_analyze_topic_mismatch_fails() {
    let mut ws = EvalWorkspace::new();
    ws.add_run("a", "ST", &trec_eval_output("a", &[("q1", 0.2), ("q2", 0.3)]))
        .add_run("b", "ST", &trec_eval_output("b", &[("q1", 0.4), ("q3", 0.5)]));
    let config = ws.write_config("");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("trecsig");
    cmd.arg("--config")
        .arg(&config)
        .arg("analyze")
        .arg("2")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Topic set"));
}

#[test]
fn test_analyze_alpha_flag() {
    let ws = two_system_workspace("TRAIN");
    let config = ws.write_config("");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("trecsig");
    cmd.arg("--config")
        .arg(&config)
        .arg("analyze")
        .arg("1")
        .arg("--alpha")
        .arg("0.01")
        .assert()
        .success()
        .stdout(predicate::str::contains("FWER=0.01"));
}

#[test]
fn test_analyze_configured_override() {
    let mut ws = EvalWorkspace::new();
    ws.add_run("a", "ST", &trec_eval_output("a", &[("q1", 0.2), ("q2", 0.3)]))
        .add_run("b", "ST", &trec_eval_output("b", &[("q1", 0.4)]));
    let config = ws.write_config(
        "\n[[override]]\nphase = \"short-term\"\nsystem = 2\ntopic = \"q2\"\nvalue = 0.0\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("trecsig");
    cmd.arg("--config")
        .arg(&config)
        .arg("analyze")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("[CHECK] Detected 2 topics"));
}
