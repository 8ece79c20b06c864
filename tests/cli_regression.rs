// Regression tests for the thriftstub binary.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

const CANONICAL: &str = "tests/fixtures/canonical.pyi";
const NONCANONICAL: &str = "tests/fixtures/noncanonical.pyi";
const BAD: &str = "tests/fixtures/bad.pyi";
const DUPLICATE: &str = "tests/fixtures/duplicate.pyi";

fn thriftstub() -> Command {
    let mut cmd = Command::cargo_bin("thriftstub").unwrap();
    cmd.arg("--no-color");
    cmd
}

fn scratch_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("thriftstub-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn format_prints_canonical_text_unchanged() {
    let expected = fs::read_to_string(CANONICAL).unwrap();
    thriftstub()
        .args(["format", CANONICAL])
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn format_check_passes_on_canonical_file() {
    thriftstub()
        .args(["format", "--check", CANONICAL])
        .assert()
        .success();
}

#[test]
fn format_check_shows_diff_and_fails() {
    thriftstub()
        .args(["format", "--check", NONCANONICAL])
        .assert()
        .failure()
        .stdout(
            contains("-VERSION =   '1.0.0'")
                .and(contains("+VERSION = '1.0.0'"))
                .and(contains("(canonical)")),
        );
}

#[test]
fn format_write_rewrites_in_place() {
    let path = scratch_file("rewrite.pyi", &fs::read_to_string(NONCANONICAL).unwrap());
    thriftstub()
        .arg("format")
        .arg("--write")
        .arg(&path)
        .assert()
        .success();

    let rewritten = fs::read_to_string(&path).unwrap();
    assert!(rewritten.starts_with("# coding:utf-8\nfrom typing import List\n\nVERSION = '1.0.0'\n"));

    thriftstub()
        .arg("format")
        .arg("--check")
        .arg(&path)
        .assert()
        .success();
    let _ = fs::remove_file(path);
}

#[test]
fn syntax_errors_render_as_miette_diagnostics() {
    thriftstub()
        .args(["format", BAD])
        .assert()
        .failure()
        .stderr(contains("thriftstub::syntax").and(contains("help:")));
}

#[test]
fn check_lists_duplicate_methods() {
    thriftstub()
        .args(["check", DUPLICATE])
        .assert()
        .failure()
        .stderr(
            contains("duplicate.pyi:7:9: service `Calc` method `add` is declared more than once")
                .and(contains("1 inconsistency in 1 file(s)")),
        );
}

#[test]
fn check_passes_on_consistent_file() {
    thriftstub().args(["check", CANONICAL]).assert().success();
}

#[test]
fn parse_prints_json_document() {
    thriftstub()
        .args(["parse", CANONICAL])
        .assert()
        .success()
        .stdout(contains("\"UserService\"").and(contains("\"type\": \"List[str]\"")));
}

#[test]
fn parse_prints_yaml_document() {
    thriftstub()
        .args(["parse", "--format", "yaml", CANONICAL])
        .assert()
        .success()
        .stdout(contains("name: NotFound"));
}

#[test]
fn strict_config_rejects_duplicates() {
    thriftstub()
        .args(["--config", "tests/fixtures/strict.yaml", "parse", DUPLICATE])
        .assert()
        .failure()
        .stderr(contains("thriftstub::inconsistency").and(contains("previously declared here")));
}

#[test]
fn strict_flag_matches_strict_config() {
    thriftstub()
        .args(["parse", "--strict", DUPLICATE])
        .assert()
        .failure()
        .stderr(contains("thriftstub::inconsistency"));
}

#[test]
fn directory_check_visits_every_stub() {
    thriftstub()
        .args(["check", "tests/fixtures"])
        .assert()
        .failure()
        .stderr(contains("duplicate.pyi:7:9").and(contains("thriftstub::syntax")));
}

#[test]
fn missing_config_file_is_reported() {
    thriftstub()
        .args(["--config", "tests/fixtures/missing.yaml", "check", CANONICAL])
        .assert()
        .failure()
        .stderr(contains("failed to read config file"));
}
