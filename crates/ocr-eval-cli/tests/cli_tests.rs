//! Integration tests for the ocr-eval binary
//!
//! Each test runs the binary inside a fresh temporary working directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a CLI command running in `dir`
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ocr-eval"));
    cmd.current_dir(dir).env("RUST_LOG", "warn");
    cmd
}

fn dataset_xml(lines: &[(&str, i64)]) -> String {
    let lines: String = lines
        .iter()
        .map(|(text, x)| {
            format!(
                "      <LINE TYPE=\"本文\" STRING=\"{text}\" X=\"{x}\" Y=\"0\" WIDTH=\"40\" HEIGHT=\"600\"/>\n"
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <OCRDATASET xmlns=\"NDLOCRDATASET\">\n  <PAGE IMAGENAME=\"0001.jpg\">\n{lines}  </PAGE>\n</OCRDATASET>\n"
    )
}

fn write_pid(root: &Path, pid: &str, file_name: &str, xml: &str) {
    let dir = root.join(pid).join("xml");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file_name), xml).unwrap();
}

/// A perfect document and one with a single-character error in one of two lines.
fn write_corpus(root: &Path) {
    let gt = dataset_xml(&[("ABCD", 200), ("EFGH", 100)]);
    write_pid(&root.join("gt"), "R0000001", "R0000001.xml", &gt);
    write_pid(&root.join("pred"), "R0000001", "R0000001.sorted.xml", &gt);

    write_pid(&root.join("gt"), "R0000002", "R0000002.xml", &gt);
    write_pid(
        &root.join("pred"),
        "R0000002",
        "R0000002.sorted.xml",
        &dataset_xml(&[("ABCD", 200), ("EFGX", 100)]),
    );
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--pred-data-root-dir"))
        .stdout(predicate::str::contains("--iou-thresh"));
}

#[test]
fn test_directory_mode_prints_summary() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());

    cli(dir.path())
        .args(["--pred-data-root-dir", "pred", "--gt-data-root-dir", "gt"])
        .args(["--output-root-dir", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "### AVERAGE OF LINE OCR LEVEN DISTANCE : 0.0625",
        ))
        .stdout(predicate::str::contains(
            "### AVERAGE OF LINE ORDER LEVEN DISTANCE : 0",
        ))
        .stdout(predicate::str::contains(
            "### MEDIAN OF LINE OCR LEVEN DISTANCE : 0.0625 (pid=R0000001, R0000002)",
        ));

    let out = dir.path().join("out");
    assert!(out.join("summary.json").is_file());
    assert!(out.join("R0000001").join("ocr_evaluation.json").is_file());
    assert!(out.join("R0000002").join("ocr_evaluation.json").is_file());
}

#[test]
fn test_json_summary() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());

    let output = cli(dir.path())
        .args(["--pred-data-root-dir", "pred", "--gt-data-root-dir", "gt"])
        .args(["--json", "--parallel"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["documents"], 2);
    assert_eq!(summary["line_ocr_edit_distance_average"], 0.0625);
    assert_eq!(summary["line_order_edit_distance_average"], 0.0);
    assert!(dir.path().join(".output_dir").join("summary.json").is_file());
}

#[test]
fn test_existing_output_root_gets_timestamp_suffix() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());
    fs::create_dir(dir.path().join("out")).unwrap();

    cli(dir.path())
        .args(["--pred-data-root-dir", "pred", "--gt-data-root-dir", "gt"])
        .args(["--output-root-dir", "out"])
        .assert()
        .success();

    let suffixed: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("out_"))
        .collect();
    assert_eq!(suffixed.len(), 1);
    assert!(dir.path().join(&suffixed[0]).join("summary.json").is_file());
}

#[test]
fn test_single_mode() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("pred.sorted.xml"), dataset_xml(&[("AX", 0)])).unwrap();
    fs::write(dir.path().join("R0000009.xml"), dataset_xml(&[("AB", 0)])).unwrap();

    cli(dir.path())
        .args(["--pred-single-xml", "pred.sorted.xml", "--gt-single-xml", "R0000009.xml"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "### AVERAGE OF LINE OCR LEVEN DISTANCE : 0.5",
        ))
        .stdout(predicate::str::contains("(pid=R0000009)"));
}

#[test]
fn test_config_file_supplies_inputs() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());
    fs::write(
        dir.path().join(".ocr-eval.toml"),
        "[input]\nstructure = \"directory\"\npred = \"pred\"\ngt = \"gt\"\n\n[output]\nroot_dir = \"reports\"\n",
    )
    .unwrap();

    cli(dir.path()).assert().success();
    assert!(dir.path().join("reports").join("summary.json").is_file());
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .args(["--pred-data-root-dir", "pred", "--gt-data-root-dir", "gt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("root directory not found"));
}

#[test]
fn test_invalid_threshold_fails() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());
    cli(dir.path())
        .args(["--pred-data-root-dir", "pred", "--gt-data-root-dir", "gt"])
        .args(["--iou-thresh", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("iou_threshold"));
}

#[test]
fn test_malformed_config_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.toml"), "[input\npred = ").unwrap();
    cli(dir.path())
        .args(["--config", "bad.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}
