// privscan/src/utils/rule_store.rs
//! The file-backed rule store used by every command.
//!
//! The rule file lives at `<config_dir>/privscan/rules.yaml` unless
//! `--rules-file` or `PRIVSCAN_RULES_FILE` points elsewhere. A missing file
//! means the built-in rules. Writes go to a locked temporary file that is
//! renamed over the target, so a concurrent reader never sees half a file.

use anyhow::{Context, Result, anyhow};
use fs2::FileExt;
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use privscan_core::RuleSet;

const APP_DIR: &str = "privscan";
const RULES_FILE_NAME: &str = "rules.yaml";
const TMP_SUFFIX: &str = "tmp";

/// Resolves the rule file path, preferring an explicit override.
pub fn rules_path(override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }
    let base = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine the user configuration directory; use --rules-file"))?;
    Ok(base.join(APP_DIR).join(RULES_FILE_NAME))
}

/// Loads the stored rule set, falling back to the built-in rules.
pub fn load(path: &Path) -> Result<RuleSet> {
    if !path.exists() {
        debug!("No rule file at {}; using built-in rules.", path.display());
        return RuleSet::load_default_rules();
    }
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open rules file {}", path.display()))?;
    FileExt::lock_shared(&file)
        .with_context(|| format!("Failed to lock rules file {}", path.display()))?;
    let loaded = RuleSet::load_from_file(path);
    FileExt::unlock(&file)?;
    loaded
}

/// Persists the rule set through a locked temp file and a rename.
pub fn save(rule_set: &RuleSet, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let body = rule_set.to_string_for_path(path)?;

    let ext = path
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), TMP_SUFFIX))
        .unwrap_or_else(|| TMP_SUFFIX.to_string());
    let tmp_path = path.with_extension(ext);
    {
        let mut tmp = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        FileExt::lock_exclusive(&tmp)
            .with_context(|| format!("Failed to lock {}", tmp_path.display()))?;
        tmp.write_all(body.as_bytes())?;
        tmp.flush()?;
        FileExt::unlock(&tmp)?;
    }
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace rules file {}", path.display()))?;
    info!("Saved {} rules to {}.", rule_set.rules.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use privscan_core::{RuleDraft, RuleType};

    #[test]
    fn missing_file_means_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let set = load(&dir.path().join("absent.yaml"))?;
        assert_eq!(set, RuleSet::load_default_rules()?);
        Ok(())
    }

    #[test_log::test]
    fn save_then_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("deep").join("rules.yaml");
        let mut set = RuleSet::load_default_rules()?;
        set.add_rule(RuleDraft::new("Badge", RuleType::Regex, r"B-\d{4}"))?;
        save(&set, &path)?;
        assert!(!dir.path().join("deep").join("rules.yaml.tmp").exists());
        assert_eq!(load(&path)?, set);
        Ok(())
    }

    #[test]
    fn explicit_path_wins() -> Result<()> {
        let p = PathBuf::from("custom.json");
        assert_eq!(rules_path(Some(&p))?, p);
        Ok(())
    }
}
