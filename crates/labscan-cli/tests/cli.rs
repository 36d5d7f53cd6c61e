//! Command-line behaviour of the `labscan` binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REPORT: &str = "=== Strana 1 ===\n\
Pacient: Jan Novák\n\
Datum odběru: 15.01.2024\n\
03085 Urea 4.0 mmol/L (2.8 - 8.1)\n\
=== Strana 2 ===\n\
03077 Kyselina močová 447 umol/l (202-417)\n";

/// A command isolated from the user's configuration directory.
fn labscan(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("labscan").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path()).env("HOME", home.path());
    cmd
}

#[test]
fn extract_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("report.txt");
    fs::write(&input, REPORT).unwrap();

    let output = labscan(&dir).arg("extract").arg(&input).output().unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["records"].as_array().unwrap().len(), 2);
    assert_eq!(result["records"][1]["source_page"], 2);
    assert_eq!(result["records"][1]["out_of_range"], true);
    assert_eq!(result["metadata"]["patient_name"], "Jan Novák");
}

#[test]
fn extract_structured_to_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("report.txt");
    let output_path = dir.path().join("out.json");
    fs::write(&input, REPORT).unwrap();

    labscan(&dir)
        .args(["extract", "--format", "structured", "--output"])
        .arg(&output_path)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(written["Patient"]["Name"], "Jan Novák");
    assert_eq!(written["Document"]["Date"], "15.01.2024");
    assert_eq!(written["LabResults"][1]["Name"], "Kyselina močová");
}

#[test]
fn extract_csv() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("report.txt");
    fs::write(&input, REPORT).unwrap();

    labscan(&dir)
        .args(["extract", "--format", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "code,name,result,unit,min,max,out_of_range",
        ))
        .stdout(predicate::str::contains("03085,Urea,4.0,mmol/L,2.8,8.1,false"));
}

#[test]
fn extract_with_invalid_candidate_warns() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("report.txt");
    let candidate = dir.path().join("candidate.json");
    fs::write(&input, REPORT).unwrap();
    fs::write(&candidate, "no json here").unwrap();

    labscan(&dir)
        .args(["extract", "--format", "text", "--candidate"])
        .arg(&candidate)
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("structured candidate unusable"))
        .stdout(predicate::str::contains("2 results, 1 out of range"));
}

#[test]
fn extract_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    labscan(&dir)
        .args(["extract", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("in");
    let outputs = dir.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("a.txt"), REPORT).unwrap();
    fs::write(inputs.join("b.txt"), "Pacient: Petr Dvořák\n").unwrap();

    labscan(&dir)
        .arg("batch")
        .arg(format!("{}/*.txt", inputs.display()))
        .arg("--output-dir")
        .arg(&outputs)
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    assert!(outputs.join("a.json").exists());
    assert!(outputs.join("b.json").exists());

    let summary = fs::read_to_string(outputs.join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt,success,Jan Novák,15.01.2024,2,1"));
    assert!(summary.contains("no lab records found"));
}

#[test]
fn canonicalize_names() {
    let dir = TempDir::new().unwrap();

    labscan(&dir)
        .args(["canonicalize", "--json", "močovina", "Kreatlnin", "Xylofonáza"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""canonical": "Urea""#))
        .stdout(predicate::str::contains(r#""canonical": "Kreatinin""#))
        .stdout(predicate::str::contains(r#""input": "Xylofonáza""#));
}

#[test]
fn config_init_get_set() {
    let dir = TempDir::new().unwrap();

    labscan(&dir)
        .args(["config", "get", "canonicalizer.threshold"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.85"));

    labscan(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    labscan(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    labscan(&dir)
        .args(["config", "set", "extraction.max_pages", "5"])
        .assert()
        .success();

    labscan(&dir)
        .args(["config", "get", "extraction.max_pages"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5"));

    labscan(&dir)
        .args(["config", "set", "canonicalizer.threshold", "2.0"])
        .assert()
        .failure();
}
