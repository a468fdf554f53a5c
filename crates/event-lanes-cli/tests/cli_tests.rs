//! Integration tests for the `lanes` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the normalize,
//! process, validate, and overlaps subcommands through the actual binary,
//! including stdin/stdout piping, file I/O, and exit codes.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn lanes() -> Command {
    Command::cargo_bin("lanes").unwrap()
}

/// Run `lanes` with args and parse stdout as JSON.
fn run_json(args: &[&str]) -> Value {
    let output = lanes().args(args).output().unwrap();
    assert!(
        output.status.success(),
        "lanes {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout must be JSON")
}

fn window_args() -> [&'static str; 4] {
    ["--from", "2026-03-16T08:00:00Z", "--to", "2026-03-16T17:00:00Z"]
}

// ─────────────────────────────────────────────────────────────────────────────
// normalize
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn normalize_collapses_aliases() {
    let events = fixture("events.json");
    let out = run_json(&["normalize", "-i", &events]);
    let arr = out.as_array().unwrap();

    assert_eq!(arr.len(), 6);
    // Event 2 used only the legacy names.
    assert_eq!(arr[1]["title"], "Early sync");
    assert_eq!(arr[1]["startDate"], "2026-03-16T07:00:00Z");
    assert_eq!(arr[1]["endDate"], "2026-03-16T08:30:00Z");
    assert!(arr[1].get("name").is_none());
    assert!(arr[1].get("start").is_none());
}

#[test]
fn normalize_from_stdin() {
    let input = r#"[{"id":1,"name":"Piped","start":"2026-03-16T09:00:00","end":"2026-03-16T10:00:00"}]"#;
    lanes()
        .args(["normalize", "--timezone", "Europe/Helsinki"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"Piped\""))
        .stdout(predicate::str::contains("2026-03-16T07:00:00Z"));
}

#[test]
fn normalize_reports_rejected_events() {
    lanes()
        .args(["normalize", "-i", &fixture("invalid_events.json")])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Fine"))
        .stderr(predicate::str::contains("Event 2: missing required field 'title'"))
        .stderr(predicate::str::contains("Event 3: invalid 'startDate'"));
}

#[test]
fn normalize_rejects_unknown_timezone() {
    lanes()
        .args(["normalize", "--timezone", "Nowhere/Special"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

// ─────────────────────────────────────────────────────────────────────────────
// process
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn process_without_window_keeps_everything() {
    let out = run_json(&["process", "-i", &fixture("events.json")]);
    let arr = out.as_array().unwrap();

    // Four single-person events plus two 2-person events.
    assert_eq!(arr.len(), 8);
    assert!(arr.iter().all(|r| r["isClamped"] == false));
}

#[test]
fn process_with_window_clamps_and_hides() {
    let events = fixture("events.json");
    let mut args = vec!["process", "-i", events.as_str()];
    args.extend(window_args());
    let out = run_json(&args);
    let arr = out.as_array().unwrap();

    assert_eq!(arr.len(), 7, "the next-day event is hidden");

    let ids: Vec<u64> = arr.iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, (1..=7).collect::<Vec<u64>>());

    let first = &arr[0];
    assert_eq!(first["originalEventId"], 2);
    assert_eq!(first["start"], "2026-03-16T08:00:00Z");
    assert_eq!(first["clampedStart"], true);
    assert_eq!(first["clampedEnd"], false);
    assert_eq!(first["isClamped"], true);

    let last = &arr[6];
    assert_eq!(last["originalEventId"], 3);
    assert_eq!(last["end"], "2026-03-16T17:00:00Z");
    assert_eq!(last["clampedEnd"], true);

    let planning: Vec<&Value> = arr.iter().filter(|r| r["originalEventId"] == 1).collect();
    assert_eq!(planning.len(), 2);
    for r in planning {
        assert_eq!(r["isMultiPerson"], true);
        assert_eq!(r["persons"], serde_json::json!([1, 2]));
        assert_eq!(r["color"], "#ff8800");
    }

    let unowned = arr.iter().find(|r| r["originalEventId"] == 4).unwrap();
    assert_eq!(unowned["personId"], "unassigned");
    assert_eq!(unowned["color"], "#3788d8");
    assert!(unowned.get("persons").is_none());
}

#[test]
fn process_custom_color_and_unassigned_key() {
    let out = run_json(&[
        "process",
        "-i",
        &fixture("events.json"),
        "--default-color",
        "gray",
        "--unassigned-key",
        "open",
    ]);
    let unowned = out
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["originalEventId"] == 4)
        .unwrap()
        .clone();
    assert_eq!(unowned["personId"], "open");
    assert_eq!(unowned["color"], "gray");
}

#[test]
fn process_drops_unknown_persons() {
    let out = run_json(&[
        "process",
        "-i",
        &fixture("events.json"),
        "--persons",
        &fixture("persons.json"),
        "--unknown-persons",
        "drop",
    ]);
    let arr = out.as_array().unwrap();

    let pairing: Vec<&Value> = arr.iter().filter(|r| r["originalEventId"] == 6).collect();
    assert_eq!(pairing.len(), 1);
    assert_eq!(pairing[0]["personId"], 1);
    assert_eq!(pairing[0]["isMultiPerson"], false);
}

#[test]
fn process_rejects_unknown_persons() {
    lanes()
        .args([
            "process",
            "-i",
            &fixture("events.json"),
            "--persons",
            &fixture("persons.json"),
            "--unknown-persons",
            "reject",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown person 9"));
}

#[test]
fn process_skips_invalid_events_unless_strict() {
    let out = run_json(&["process", "-i", &fixture("invalid_events.json")]);
    assert_eq!(out.as_array().unwrap().len(), 1);

    lanes()
        .args(["process", "--strict", "-i", &fixture("invalid_events.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 event(s) could not be normalized"));
}

#[test]
fn process_warns_about_skipped_events_by_default() {
    lanes()
        .env_remove("RUST_LOG")
        .args(["process", "-i", &fixture("invalid_events.json")])
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping event"));
}

#[test]
fn process_window_needs_both_ends() {
    lanes()
        .args(["process", "--from", "2026-03-16T08:00:00Z"])
        .write_stdin("[]")
        .assert()
        .failure();
}

#[test]
fn process_rejects_empty_window() {
    lanes()
        .args([
            "process",
            "--from",
            "2026-03-16T17:00:00Z",
            "--to",
            "2026-03-16T08:00:00Z",
        ])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid window"));
}

#[test]
fn process_writes_output_file() {
    let output_path = std::env::temp_dir().join("lanes-test-process-output.json");
    let _ = std::fs::remove_file(&output_path);

    lanes()
        .args([
            "process",
            "-i",
            &fixture("events.json"),
            "-o",
            output_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = std::fs::read_to_string(&output_path).expect("output file must exist");
    let value: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 8);

    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn process_missing_input_file_fails() {
    lanes()
        .args(["process", "-i", "/nonexistent/events.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// validate
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn validate_clean_raw_events() {
    lanes()
        .args(["validate", "-i", &fixture("events.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn validate_reports_raw_problems() {
    lanes()
        .args(["validate", "-i", &fixture("invalid_events.json")])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Event 2: neither 'title' nor 'name' is present",
        ))
        .stdout(predicate::str::contains(
            "Event 2: neither 'endDate' nor 'end' is present",
        ))
        .stdout(predicate::str::contains("Event 3: invalid 'startDate'"))
        .stdout(predicate::str::contains("Event 1").not());
}

#[test]
fn validate_raw_keeps_going_past_malformed_records() {
    let input = r#"[
        {"id": 1, "title": "Fine", "startDate": "2026-03-16T09:00:00Z", "endDate": "2026-03-16T10:00:00Z"},
        {"id": "two", "title": "Bad id"},
        {"id": 3}
    ]"#;
    lanes()
        .arg("validate")
        .write_stdin(input)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Record #2: invalid type"))
        .stdout(predicate::str::contains(
            "Event 3: neither 'title' nor 'name' is present",
        ))
        .stdout(predicate::str::contains(
            "Event 3: neither 'startDate' nor 'start' is present",
        ))
        .stdout(predicate::str::contains("Record #1").not())
        .stdout(predicate::str::contains("Event 1").not());
}

#[test]
fn validate_reports_processed_problems() {
    lanes()
        .args(["validate", "--processed", "-i", &fixture("invalid_processed.json")])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Record #2"))
        .stdout(predicate::str::contains("isClamped is true"))
        .stdout(predicate::str::contains("Record #1").not());
}

#[test]
fn validate_accepts_own_processed_output() {
    let events = fixture("events.json");
    let mut args = vec!["process", "-i", events.as_str()];
    args.extend(window_args());
    let processed = lanes().args(&args).output().unwrap();
    assert!(processed.status.success());

    lanes()
        .args(["validate", "--processed"])
        .write_stdin(processed.stdout)
        .assert()
        .success();
}

// ─────────────────────────────────────────────────────────────────────────────
// overlaps
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn overlaps_from_processed_pipeline() {
    let events = fixture("events.json");
    let mut args = vec!["process", "-i", events.as_str()];
    args.extend(window_args());
    let processed = lanes().args(&args).output().unwrap();
    assert!(processed.status.success());

    let output = lanes()
        .arg("overlaps")
        .write_stdin(processed.stdout)
        .output()
        .unwrap();
    assert!(output.status.success());

    let overlaps: Value = serde_json::from_slice(&output.stdout).unwrap();
    // Planning (09:00-10:00) and Design pairing (09:30-11:00) both sit on Ada's row.
    assert_eq!(
        overlaps,
        serde_json::json!([
            {"personId": 1, "first": 2, "second": 4, "overlapMinutes": 30}
        ])
    );
}

#[test]
fn overlaps_rejects_inconsistent_records() {
    lanes()
        .args(["overlaps", "-i", &fixture("invalid_processed.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse processed records"));
}
