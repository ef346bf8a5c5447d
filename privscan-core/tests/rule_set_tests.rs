// privscan-core/tests/rule_set_tests.rs
use anyhow::Result;
use std::fs;
use tempfile::tempdir;

use privscan_core::{
    find_matches, MaskingMode, MaskingPolicy, PrivscanError, RuleDraft, RuleSet, RuleType,
};

#[test_log::test]
fn yaml_round_trip_keeps_rules_and_counter() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("nested").join("rules.yaml");

    let mut set = RuleSet::load_default_rules()?;
    let id = set.add_rule(
        RuleDraft::new("Project Code", RuleType::String, "Bluebird")
            .case_sensitive(true)
            .description("internal code name"),
    )?;
    set.set_masking(
        id,
        Some(MaskingPolicy {
            pattern: "#".into(),
            preserve_length: true,
            ..Default::default()
        }),
    )?;
    set.save_to_file(&path)?;

    let loaded = RuleSet::load_from_file(&path)?;
    assert_eq!(loaded, set);
    assert_eq!(loaded.next_rule_id, id + 1);
    Ok(())
}

#[test_log::test]
fn json_files_are_read_as_json() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("rules.json");
    let mut set = RuleSet::default();
    set.add_rule(RuleDraft::new("kw", RuleType::String, "secret"))?;
    set.save_to_file(&path)?;

    let body = fs::read_to_string(&path)?;
    assert!(body.trim_start().starts_with('{'));
    assert!(body.contains("\"nextRuleId\""));
    assert_eq!(RuleSet::load_from_file(&path)?, set);
    Ok(())
}

#[test]
fn stale_counter_is_repaired_on_load() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("rules.yaml");
    fs::write(
        &path,
        "nextRuleId: 2\nrules:\n  - id: 9\n    type: string\n    name: Nine\n    pattern: nine\n",
    )?;
    let mut set = RuleSet::load_from_file(&path)?;
    assert!(set.enabled);
    assert!(set.rules[0].active);
    assert_eq!(set.next_rule_id, 10);
    assert_eq!(set.add_rule(RuleDraft::new("Ten", RuleType::String, "ten"))?, 10);
    Ok(())
}

#[test_log::test]
fn maximum_id_never_gets_reused() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("rules.yaml");
    fs::write(
        &path,
        "rules:\n  - id: 4294967295\n    type: string\n    name: Last\n    pattern: last\n",
    )?;
    let mut set = RuleSet::load_from_file(&path)?;
    assert_eq!(set.next_rule_id, u32::MAX);

    let err = set
        .add_rule(RuleDraft::new("Another", RuleType::String, "another"))
        .unwrap_err();
    assert!(matches!(err, PrivscanError::IdSpaceExhausted));
    let ids: Vec<u32> = set.rules.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![u32::MAX]);
    Ok(())
}

#[test]
fn duplicate_ids_are_rejected() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("rules.yaml");
    fs::write(
        &path,
        "rules:\n  - id: 1\n    type: string\n    name: A\n    pattern: a\n  - id: 1\n    type: string\n    name: B\n    pattern: b\n",
    )?;
    let err = RuleSet::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PrivscanError>(),
        Some(PrivscanError::DuplicateRuleId(1))
    ));
    Ok(())
}

#[test]
fn stored_broken_pattern_loads_and_is_skipped_at_scan() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("rules.yaml");
    fs::write(
        &path,
        "rules:\n  - id: 1\n    type: regex\n    name: Broken\n    pattern: '('\n  - id: 2\n    type: string\n    name: Kw\n    pattern: token\n",
    )?;
    let set = RuleSet::load_from_file(&path)?;
    let report = find_matches("a token here", &set);
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.warnings.len(), 1);
    Ok(())
}

#[test]
fn add_rule_validation() {
    let mut set = RuleSet::default();
    assert!(matches!(
        set.add_rule(RuleDraft::new("  ", RuleType::String, "x")),
        Err(PrivscanError::EmptyRuleName)
    ));
    assert!(matches!(
        set.add_rule(RuleDraft::new("bad", RuleType::Regex, "(")),
        Err(PrivscanError::InvalidPattern(..))
    ));
    assert!(matches!(
        set.add_rule(RuleDraft::new("long", RuleType::Regex, "x".repeat(501))),
        Err(PrivscanError::PatternLengthExceeded(..))
    ));
    assert!(set.rules.is_empty());
    assert_eq!(set.next_rule_id, 1);
}

#[test]
fn edits_keep_id_and_masking() -> Result<()> {
    let mut set = RuleSet::load_default_rules()?;
    let before = set.get(4).cloned().unwrap();
    set.update_rule(
        4,
        RuleDraft::new("Api Key", RuleType::Variable, r#"(api_key)\s*=\s*"([^"]+)""#),
    )?;
    let after = set.get(4).unwrap();
    assert_eq!(after.name, "Api Key");
    assert_eq!(after.masking, before.masking);
    assert_eq!(
        after.masking.as_ref().map(|m| m.mode),
        Some(MaskingMode::VariableValue)
    );
    assert!(matches!(
        set.update_rule(99, RuleDraft::new("x", RuleType::String, "x")),
        Err(PrivscanError::RuleNotFound(99))
    ));
    Ok(())
}

#[test]
fn clear_and_disable() -> Result<()> {
    let mut set = RuleSet::load_default_rules()?;
    set.set_active(6, false)?;
    let names: Vec<String> = find_matches("secret", &set)
        .matches
        .into_iter()
        .map(|m| m.rule_name)
        .collect();
    assert!(names.is_empty());

    let counter = set.next_rule_id;
    set.clear();
    assert!(set.rules.is_empty());
    assert_eq!(set.add_rule(RuleDraft::new("x", RuleType::String, "x"))?, counter);
    Ok(())
}

#[test]
fn fingerprint_tracks_content() -> Result<()> {
    let a = RuleSet::load_default_rules()?;
    let mut b = a.clone();
    assert_eq!(a.fingerprint()?, b.fingerprint()?);
    b.set_active(1, false)?;
    assert_ne!(a.fingerprint()?, b.fingerprint()?);
    assert_eq!(a.fingerprint()?.len(), 64);
    Ok(())
}
