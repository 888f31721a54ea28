use crate::convert::convert_rule;
use crate::schema::{RawRule, RuleFile};
use anyhow::{bail, Context};
use rpsjoker_core::{validate_rule, RoundConfig, Rule, RuleLibrary};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const RULES_DIR: &str = "rules";
pub const ROUND_CONFIG_FILE: &str = "round.json";

#[derive(Debug)]
pub struct RuleLoadReport {
    pub library: RuleLibrary,
    pub warnings: Vec<String>,
}

/// Everything a front end needs from an assets directory.
#[derive(Debug)]
pub struct Assets {
    pub config: RoundConfig,
    pub rules: RuleLoadReport,
}

pub fn load_assets(dir: &Path) -> anyhow::Result<Assets> {
    let config = load_round_config(&dir.join(ROUND_CONFIG_FILE))?;
    let rules = load_rules_dir(&dir.join(RULES_DIR))?;
    Ok(Assets { config, rules })
}

/// Missing file means defaults; a present but broken file is an error.
pub fn load_round_config(path: &Path) -> anyhow::Result<RoundConfig> {
    if !path.exists() {
        return Ok(RoundConfig::default());
    }
    let config: RoundConfig = load_json(path)?;
    Ok(config.normalized())
}

pub fn load_rule_file(path: &Path) -> anyhow::Result<Vec<RawRule>> {
    let file: RuleFile = load_json(path)?;
    Ok(file.into_rules())
}

/// Loads every `*.json` under `dir` in file name order. Rules with problems
/// are still loaded; each problem becomes a warning prefixed with its file.
pub fn load_rules_dir(dir: &Path) -> anyhow::Result<RuleLoadReport> {
    if !dir.is_dir() {
        bail!("missing {}", dir.display());
    }
    let mut rules = Vec::new();
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    for path in rule_files(dir)? {
        for raw in load_rule_file(&path)? {
            if raw.name.trim().is_empty() {
                warnings.push(format!("{}: rule without a name skipped", path.display()));
                continue;
            }
            let (rule, rule_warnings) = convert_rule(&raw);
            if !seen.insert(rule.name.clone()) {
                warnings.push(format!(
                    "{}: duplicate rule `{}` ignored",
                    path.display(),
                    rule.name
                ));
                continue;
            }
            warnings.extend(
                rule_warnings
                    .into_iter()
                    .map(|warning| format!("{}: {warning}", path.display())),
            );
            warnings.extend(
                validate_rule(&rule)
                    .into_iter()
                    .map(|diagnostic| format!("{}: {diagnostic}", path.display())),
            );
            rules.push(rule);
        }
    }
    Ok(RuleLoadReport {
        library: RuleLibrary::new(rules),
        warnings,
    })
}

/// Resolves a comma separated selection against the library.
pub fn select_rules(library: &RuleLibrary, names: &str) -> anyhow::Result<Vec<Rule>> {
    let mut selected = Vec::new();
    for name in names.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let Some(rule) = library.by_name(name) else {
            bail!("unknown rule `{name}`");
        };
        selected.push(rule.clone());
    }
    Ok(selected)
}

fn rule_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let path = entry
            .with_context(|| format!("read {}", dir.display()))?
            .path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
