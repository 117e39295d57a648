#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::{contains, starts_with};
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("jmescraft");
    cmd.env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn write_doc(dir: &TempDir, body: &str) -> String {
    let path = dir.path().join("doc.json");
    fs::write(&path, body).expect("write fixture");
    path.to_string_lossy().into_owned()
}

#[test]
fn query_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, r#"{"a":[{"b":1}]}"#);
    cmd().args(["query", "a[0].b", &path]).assert().success().stdout("1\n");
}

#[test]
fn query_from_stdin_pretty_prints() {
    cmd()
        .args(["query", "people[*].name"])
        .write_stdin(r#"{"people":[{"name":"ann"},{"name":"bo"}]}"#)
        .assert()
        .success()
        .stdout("[\n  \"ann\",\n  \"bo\"\n]\n");
}

#[test]
fn query_rejects_invalid_json() {
    cmd()
        .args(["query", "a"])
        .write_stdin(r#"{"a":"#)
        .assert()
        .failure()
        .stderr("jmescraft: Invalid JSON\n");
}

#[test]
fn query_reports_evaluator_error() {
    cmd()
        .args(["query", "foo bar"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(starts_with("jmescraft: ").and(contains("Invalid JSON").not()));
}

#[test]
fn query_with_oversized_index_fails_cleanly() {
    cmd()
        .args(["query", "a[99999999999999999999]"])
        .write_stdin(r#"{"a":[1]}"#)
        .assert()
        .failure()
        .stderr(starts_with("jmescraft: Number out of range"));
}

#[test]
fn query_whole_sum_prints_integer() {
    cmd()
        .args(["query", "sum(a[*].b)"])
        .write_stdin(r#"{"a":[{"b":1},{"b":2}]}"#)
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn schema_output() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, r#"{"tags":["x","y"],"empty":[],"ok":true,"none":null}"#);
    cmd()
        .args(["schema", &path])
        .assert()
        .success()
        .stdout(
            contains(r#""tags": ["#)
                .and(contains(r#""string""#))
                .and(contains(r#""empty": []"#))
                .and(contains(r#""none": "null""#)),
        );
}

#[test]
fn missing_file() {
    cmd()
        .args(["schema", "/nonexistent/doc.json"])
        .assert()
        .failure()
        .stderr(contains("error reading file"));
}

#[test]
fn ask_requires_api_key() {
    cmd()
        .args(["ask", "get a"])
        .write_stdin(r#"{"a":1}"#)
        .assert()
        .failure()
        .stderr(contains("missing API key"));
}

#[test]
fn ask_rejects_invalid_json_before_network() {
    cmd()
        .args(["--api-key", "sk-test", "--base-url", "http://127.0.0.1:9", "ask", "get a"])
        .write_stdin("nope")
        .assert()
        .failure()
        .stderr("jmescraft: Invalid JSON\n");
}

#[test]
fn verify_unreachable_service_fails() {
    cmd()
        .args(["--api-key", "sk-test", "--base-url", "http://127.0.0.1:9", "verify"])
        .assert()
        .failure()
        .stderr(starts_with("jmescraft: "));
}
