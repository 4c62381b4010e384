use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn audit_cmd() -> Command {
    Command::cargo_bin("content-audit").unwrap()
}

#[test]
fn reads_stdin_and_prints_json() {
    let output = audit_cmd()
        .write_stdin("The cat sat on the mat. The dog ran fast.")
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["stats"]["word_count"], 10);
    assert_eq!(parsed["stats"]["sentence_count"], 2);
    assert_eq!(parsed["stats"]["readability_band"], "excellent");
}

#[test]
fn text_format_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("page.txt");
    fs::write(&path, "Short copy. It works well enough for a test.").unwrap();

    audit_cmd()
        .arg("--format")
        .arg("text")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("page.txt"))
        .stdout(predicate::str::contains("perplexity"))
        .stdout(predicate::str::contains("score:"));
}

#[test]
fn config_file_overrides_weights() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("audit.toml");
    fs::write(
        &config,
        "[weights]\nperplexity = 0.0\nburstiness = 0.0\nrepetition = 0.0\n\
         vocabulary = 0.0\nhapax = 0.0\nreadability = 1.0\nphrasing = 0.0\n",
    )
    .unwrap();

    let output = audit_cmd()
        .arg("--config")
        .arg(&config)
        .write_stdin("The cat sat on the mat. The dog ran fast.")
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // readability alone, clamped at 10/10
    assert_eq!(parsed["score"], 100.0);
}

#[test]
fn invalid_config_fails_with_message() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("bad.toml");
    fs::write(&config, "[entropy]\nscale = 0.0\n").unwrap();

    audit_cmd()
        .arg("--config")
        .arg(&config)
        .write_stdin("anything")
        .assert()
        .failure()
        .stderr(predicate::str::contains("entropy.scale"));
}

#[test]
fn missing_file_fails() {
    audit_cmd()
        .arg("/definitely/not/here.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn print_config_emits_defaults() {
    audit_cmd()
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[entropy]"))
        .stdout(predicate::str::contains("anchor = 4.0"))
        .stdout(predicate::str::contains("[weights]"));
}

#[test]
fn strict_flag_drops_symbols_before_tokenizing() {
    let keyword = |args: &[&str]| {
        let output = audit_cmd()
            .args(args)
            .write_stdin("a\u{1F680}b c.")
            .output()
            .unwrap();
        assert!(output.status.success());
        let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        parsed["keywords"][0]["term"].as_str().unwrap().to_string()
    };
    assert_eq!(keyword(&[]), "a\u{1F680}b");
    assert_eq!(keyword(&["--strict"]), "ab");
}

#[test]
fn strict_flag_is_reflected_in_printed_config() {
    audit_cmd()
        .arg("--strict")
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("strict_normalize = true"));
}
