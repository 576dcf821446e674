//! End-to-end tests for the tagl binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".tagl")
        .tempfile()
        .expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

#[test]
fn check_clean_file_exits_zero() {
    let file = write_temp("fn render(ctx) -> error {\n    <div>\"hi\"</div>\n    return nil;\n}\n");
    Command::cargo_bin("tagl")
        .unwrap()
        .args(["check", file.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn check_reports_escape_error() {
    let file = write_temp(
        "fn render(ctx) -> error {\n    for {\n        <div>\n            break;\n        </div>\n    }\n    return nil;\n}\n",
    );
    Command::cargo_bin("tagl")
        .unwrap()
        .args(["check", file.path().to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("break prevents reaching the end tag"));
}

#[test]
fn check_reports_unclosed_tag() {
    let file = write_temp("fn render(ctx) {\n    <div>\n    \"x\";\n}\n");
    Command::cargo_bin("tagl")
        .unwrap()
        .args(["check", file.path().to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("unclosed tag"));
}

#[test]
fn check_json_output() {
    let file = write_temp("fn render(ctx) {\n    <div>\n    \"x\";\n}\n");
    Command::cargo_bin("tagl")
        .unwrap()
        .args(["check", file.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"message\": \"unclosed tag\""));
}

#[test]
fn fmt_prints_formatted_source() {
    let file = write_temp("fn render(ctx) {  <div>\"hi\"</div>    }");
    Command::cargo_bin("tagl")
        .unwrap()
        .args(["fmt", file.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout("fn render(ctx) {\n    <div>\"hi\"</div>\n}\n");
}

#[test]
fn fmt_write_rewrites_in_place() {
    let file = write_temp("fn render(ctx) { <div>\"hi\"</div> }");
    Command::cargo_bin("tagl")
        .unwrap()
        .args(["fmt", "--write", file.path().to_str().unwrap()])
        .assert()
        .success();
    let rewritten = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(rewritten, "fn render(ctx) {\n    <div>\"hi\"</div>\n}\n");
}

#[test]
fn fmt_refuses_files_with_parse_errors() {
    let file = write_temp("fn render(ctx) { <div }");
    Command::cargo_bin("tagl")
        .unwrap()
        .args(["fmt", file.path().to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn fmt_tabs_flag() {
    let file = write_temp("fn render(ctx) { let x = 1; }");
    Command::cargo_bin("tagl")
        .unwrap()
        .args(["fmt", "--tabs", file.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout("fn render(ctx) {\n\tlet x = 1;\n}\n");
}