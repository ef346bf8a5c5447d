// privscan/tests/cli_integration_tests.rs
//! End-to-end tests for the `privscan` binary.
//!
//! Every test points `--rules-file` at a file inside its own temporary
//! directory, so the user's real rule store is never read or written. A
//! missing rules file means the built-in rules.

use anyhow::Result;
use assert_cmd::Command;
use assert_cmd::assert::Assert;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

fn rules_file(dir: &TempDir) -> PathBuf {
    dir.path().join("rules.yaml")
}

fn privscan(rules: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("privscan"));
    cmd.env_remove("PRIVSCAN_RULES_FILE")
        .env_remove("RUST_LOG")
        .arg("--rules-file")
        .arg(rules);
    cmd
}

fn run_with_stdin(rules: &Path, input: &str, args: &[&str]) -> Assert {
    privscan(rules).args(args).write_stdin(input).assert()
}

fn stderr_of(assert: &Assert) -> String {
    strip_ansi_escapes::strip_str(String::from_utf8_lossy(&assert.get_output().stderr))
}

#[test]
fn redact_with_builtin_rules() -> Result<()> {
    let dir = tempdir()?;
    let input = "Mail john.doe@example.com, card 4111 1111 1111 1111, password = \"hunter2\".\n";
    let assert = run_with_stdin(&rules_file(&dir), input, &["redact"]).success();
    assert.stdout("Mail j***, card **** **** **** ****, password = \"***\".\n");
    Ok(())
}

#[test]
fn redact_summary_goes_to_stderr() -> Result<()> {
    let dir = tempdir()?;
    let assert = run_with_stdin(&rules_file(&dir), "secret and confidential\n", &["redact"]).success();
    let stderr = stderr_of(&assert);
    assert!(stderr.contains("Redaction Summary"));
    assert!(stderr.contains("Confidential Reference: 1 occurrence(s)"));
    assert!(stderr.contains("Secret Reference: 1 occurrence(s)"));

    run_with_stdin(&rules_file(&dir), "secret\n", &["redact", "--no-summary"])
        .success()
        .stdout("******\n")
        .stderr(predicate::str::contains("Redaction Summary").not());
    Ok(())
}

#[test]
fn redact_to_file_with_diff() -> Result<()> {
    let dir = tempdir()?;
    let input_path = dir.path().join("input.txt");
    let output_path = dir.path().join("out.diff");
    fs::write(&input_path, "keep me\nmy secret\n")?;

    privscan(&rules_file(&dir))
        .args(["-q", "redact", "--diff", "-i"])
        .arg(&input_path)
        .arg("-o")
        .arg(&output_path)
        .assert()
        .success()
        .stdout("");

    let diff = fs::read_to_string(&output_path)?;
    assert!(diff.contains("-my secret"));
    assert!(diff.contains("+my ******"));
    assert!(diff.contains(" keep me"));
    Ok(())
}

#[test]
fn scan_reports_positions_and_can_fail() -> Result<()> {
    let dir = tempdir()?;
    let input = "first line\ncontact: jane@example.org\n";

    run_with_stdin(&rules_file(&dir), input, &["scan"])
        .success()
        .stdout(predicate::str::contains("Email Address"))
        .stdout(predicate::str::contains("Line 2, Char 10"))
        .stdout(predicate::str::contains("1 match(es) found."));

    run_with_stdin(&rules_file(&dir), input, &["scan", "--fail-on-match"]).code(2);
    run_with_stdin(&rules_file(&dir), "nothing to see\n", &["scan", "--fail-on-match"])
        .success()
        .stdout(predicate::str::contains("No sensitive data found."));
    Ok(())
}

#[test]
fn scan_json_output() -> Result<()> {
    let dir = tempdir()?;
    let assert = run_with_stdin(
        &rules_file(&dir),
        "token = 'abc123'\n",
        &["scan", "--json", "--masked"],
    )
    .success();
    let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
    let matches = value["matches"].as_array().cloned().unwrap_or_default();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["ruleName"], "Secret Variable");
    assert_eq!(matches[0]["index"], 0);
    assert_eq!(matches[0]["masked"], "token = '***'");
    Ok(())
}

#[test]
fn scan_follow_reports_changes() -> Result<()> {
    let dir = tempdir()?;
    let input = "plain\nstill plain\nnow a secret\nmore\n";
    run_with_stdin(&rules_file(&dir), input, &["scan", "--follow"])
        .success()
        .stdout(predicate::str::contains("After line 3:"))
        .stdout(predicate::str::contains("After line 1:").not())
        .stdout(predicate::str::contains("After line 4:").not());
    Ok(())
}

#[test]
fn added_rule_is_persisted_and_used() -> Result<()> {
    let dir = tempdir()?;
    let rules = rules_file(&dir);

    privscan(&rules)
        .args(["rules", "add", "--name", "Badge", "--type", "regex", "--pattern", r"B-\d{4}"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Added rule 7."));
    assert!(rules.exists());

    let assert = privscan(&rules).args(["rules", "list", "--json"]).assert().success();
    let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(value["nextRuleId"], 8);
    assert_eq!(value["rules"][6]["name"], "Badge");

    run_with_stdin(&rules, "badge B-1234\n", &["scan"])
        .success()
        .stdout(predicate::str::contains("Badge"));

    // No masking policy yet: the match is reported but left in place.
    run_with_stdin(&rules, "badge B-1234\n", &["-q", "redact"])
        .success()
        .stdout("badge B-1234\n");

    privscan(&rules)
        .args(["rules", "mask", "7", "--preserve-end", "2"])
        .assert()
        .success();
    run_with_stdin(&rules, "badge B-1234\n", &["-q", "redact"])
        .success()
        .stdout("badge ***34\n");
    Ok(())
}

#[test]
fn edit_with_empty_description_clears_it() -> Result<()> {
    let dir = tempdir()?;
    let rules = rules_file(&dir);

    privscan(&rules)
        .args(["rules", "add", "--name", "Badge", "--type", "string", "--pattern", "badge"])
        .args(["--description", "door badge ids"])
        .assert()
        .success();
    let assert = privscan(&rules).args(["rules", "list", "--json"]).assert().success();
    let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(value["rules"][6]["description"], "door badge ids");

    privscan(&rules)
        .args(["rules", "edit", "7", "--description", ""])
        .assert()
        .success();
    let assert = privscan(&rules).args(["rules", "list", "--json"]).assert().success();
    let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert!(value["rules"][6].get("description").is_none());
    assert_eq!(value["rules"][6]["name"], "Badge");
    Ok(())
}

#[test]
fn invalid_pattern_is_rejected() -> Result<()> {
    let dir = tempdir()?;
    let rules = rules_file(&dir);
    privscan(&rules)
        .args(["rules", "add", "--name", "Broken", "--type", "regex", "--pattern", "("])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Broken"));
    assert!(!rules.exists());
    Ok(())
}

#[test]
fn destructive_commands_need_confirmation() -> Result<()> {
    let dir = tempdir()?;
    let rules = rules_file(&dir);
    privscan(&rules)
        .args(["rules", "clear"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--yes"));

    privscan(&rules).args(["rules", "clear", "--yes"]).assert().success();
    run_with_stdin(&rules, "secret\n", &["scan", "--fail-on-match"]).success();

    privscan(&rules).args(["rules", "reset", "--yes"]).assert().success();
    run_with_stdin(&rules, "secret\n", &["scan", "--fail-on-match"]).code(2);
    Ok(())
}

#[test]
fn checker_switch() -> Result<()> {
    let dir = tempdir()?;
    let rules = rules_file(&dir);
    privscan(&rules).args(["checker", "off"]).assert().success();
    run_with_stdin(&rules, "secret\n", &["-q", "redact"]).success().stdout("secret\n");
    privscan(&rules).args(["checker", "on"]).assert().success();
    run_with_stdin(&rules, "secret\n", &["-q", "redact"]).success().stdout("******\n");
    Ok(())
}

#[test]
fn export_then_import_merges() -> Result<()> {
    let dir = tempdir()?;
    let rules = rules_file(&dir);
    let export_path = dir.path().join("rules.tsv");

    privscan(&rules)
        .args(["rules", "export", "-o"])
        .arg(&export_path)
        .assert()
        .success();
    let tsv = fs::read_to_string(&export_path)?;
    assert!(tsv.starts_with("id\ttype\tpattern\tname\tactive\tdescription\tcaseSensitive\n"));
    assert_eq!(tsv.lines().count(), 7);

    privscan(&rules)
        .arg("rules")
        .arg("import")
        .arg(&export_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Imported 0 rule(s); 6 already present; 0 invalid."));

    let other = dir.path().join("other.json");
    privscan(&other).args(["rules", "clear", "--yes"]).assert().success();
    privscan(&other)
        .arg("rules")
        .arg("import")
        .arg(&export_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Imported 6 rule(s)"));
    let stored: serde_json::Value = serde_json::from_str(&fs::read_to_string(&other)?)?;
    assert_eq!(stored["nextRuleId"], 13);
    Ok(())
}
