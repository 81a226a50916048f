//! Configuration management for `blackline-core`.
//!
//! This module defines the core data structures for detection rules and export
//! settings. It handles deserialization of YAML configurations and provides
//! utilities for loading, merging, and validating them.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// The category a candidate suggestion is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Category {
    Email,
    Phone,
    #[serde(rename = "SSN")]
    Ssn,
    Date,
    Name,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Email,
        Category::Phone,
        Category::Ssn,
        Category::Date,
        Category::Name,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Email => "Email",
            Category::Phone => "Phone",
            Category::Ssn => "SSN",
            Category::Date => "Date",
            Category::Name => "Name",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("Unknown category '{}'", s))
    }
}

/// Represents a single detection rule used by the regex engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionRule {
    /// Unique identifier for the rule (e.g., "email").
    pub name: String,
    /// Category attached to every candidate this rule produces.
    pub category: Category,
    /// The regex pattern string.
    pub pattern: Option<String>,
    /// When a match starts a sentence, prefer a match beginning at its second word.
    /// Used by the name heuristic so "Contact John Smith" yields "John Smith".
    pub shift_sentence_initial: bool,
    /// If true, the rule is disabled unless explicitly enabled.
    pub opt_in: bool,
    /// Explicit override for enabling/disabling the rule. Wins over `opt_in`.
    pub enabled: Option<bool>,
}

impl DetectionRule {
    /// Whether the rule runs when no `--enable`/`--disable` list names it.
    pub fn active_by_default(&self) -> bool {
        self.enabled.unwrap_or(!self.opt_in)
    }
}

impl Hash for DetectionRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.category.hash(state);
        self.pattern.hash(state);
        self.shift_sentence_initial.hash(state);
        self.opt_in.hash(state);
        self.enabled.hash(state);
    }
}

impl Default for DetectionRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: Category::Name,
            pattern: None,
            shift_sentence_initial: false,
            opt_in: false,
            enabled: None,
        }
    }
}

/// Page geometry and typography for the exported word-processor envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    pub page_width: String,
    pub page_height: String,
    pub margin: String,
    pub font_family: String,
    pub font_size: String,
    pub line_height: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_width: "8.5in".to_string(),
            page_height: "11.0in".to_string(),
            margin: "1.0in".to_string(),
            font_family: "Times New Roman".to_string(),
            font_size: "12pt".to_string(),
            line_height: "1.15".to_string(),
        }
    }
}

impl ExportConfig {
    /// Rejects values that could escape the inline stylesheet they are written into.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("page_width", &self.page_width),
            ("page_height", &self.page_height),
            ("margin", &self.margin),
            ("font_family", &self.font_family),
            ("font_size", &self.font_size),
            ("line_height", &self.line_height),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(anyhow!("Export setting '{}' cannot be empty.", field));
            }
            if value.chars().any(|c| matches!(c, '<' | '>' | '{' | '}' | ';' | '"' | '\\')) {
                return Err(anyhow!("Export setting '{}' contains a disallowed character: '{}'", field, value));
            }
        }
        Ok(())
    }
}

/// Represents the top-level configuration structure for Blackline.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct BlacklineConfig {
    /// Detection rules in declaration order.
    #[serde(default)]
    pub rules: Vec<DetectionRule>,
    /// Export envelope settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Error type for missing rule configurations.
#[derive(Debug)]
pub struct RuleConfigNotFoundError {
    pub config_name: String,
}

impl fmt::Display for RuleConfigNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rule configuration '{}' not found.", self.config_name)
    }
}

impl std::error::Error for RuleConfigNotFoundError {}

impl BlacklineConfig {
    /// Loads detection rules and export settings from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading custom rules from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: BlacklineConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_rules(&config.rules)?;
        config.export.validate()?;
        info!("Loaded {} rules from file {}.", config.rules.len(), path.display());

        Ok(config)
    }

    /// Loads default detection rules from the embedded configuration.
    pub fn load_default_rules() -> Result<Self> {
        debug!("Loading default rules from embedded string...");
        let default_yaml = include_str!("../config/default_rules.yaml");
        let config: BlacklineConfig = serde_yml::from_str(default_yaml)
            .context("Failed to parse default rules")?;

        debug!("Loaded {} default rules.", config.rules.len());
        Ok(config)
    }

    /// Filters active rules based on enable/disable lists provided via CLI.
    pub fn set_active_rules(&mut self, enable_rules: &[String], disable_rules: &[String]) {
        let enable_set: HashSet<&str> = enable_rules.iter().map(String::as_str).collect();
        let disable_set: HashSet<&str> = disable_rules.iter().map(String::as_str).collect();

        let all_rule_names: HashSet<&str> = self.rules.iter().map(|r| r.name.as_str()).collect();
        for rule_name in enable_set.difference(&all_rule_names) {
            warn!("Rule '{}' in `enable_rules` list does not exist.", rule_name);
        }
        for rule_name in disable_set.difference(&all_rule_names) {
            warn!("Rule '{}' in `disable_rules` list does not exist.", rule_name);
        }

        self.rules.retain(|rule| {
            let name = rule.name.as_str();
            !disable_set.contains(name) && (enable_set.contains(name) || rule.active_by_default())
        });
        // Survivors are active by definition; the compiler must not drop them again.
        for rule in &mut self.rules {
            rule.enabled = Some(true);
        }

        debug!("Final active rules count after filtering: {}", self.rules.len());
    }
}

/// Merges user-defined rules and export settings with defaults.
///
/// Rules are matched by name. An overriding rule keeps the position of the rule it
/// replaces and new rules are appended, so declaration order survives the merge.
pub fn merge_rules(default_config: BlacklineConfig, user_config: Option<BlacklineConfig>) -> BlacklineConfig {
    let mut final_rules = default_config.rules;
    let mut export = default_config.export;

    if let Some(user_cfg) = user_config {
        debug!("User config provided. Merging {} user rules.", user_cfg.rules.len());
        for user_rule in user_cfg.rules {
            match final_rules.iter_mut().find(|r| r.name == user_rule.name) {
                Some(existing) => *existing = user_rule,
                None => final_rules.push(user_rule),
            }
        }
        if user_cfg.export != ExportConfig::default() {
            export = user_cfg.export;
        }
    }

    debug!("Final total rules after merge: {}", final_rules.len());
    BlacklineConfig { rules: final_rules, export }
}

/// Locations searched for a user configuration file, most specific first.
pub fn user_config_candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(explicit) = std::env::var("BLACKLINE_CONFIG") {
        paths.push(PathBuf::from(explicit));
    }
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("blackline").join("rules.yaml"));
    }
    paths
}

/// Loads the built-in rules and merges the first user config found, if any.
pub fn load_effective_config(explicit_path: Option<&Path>) -> Result<BlacklineConfig> {
    let defaults = BlacklineConfig::load_default_rules()?;
    let user = match explicit_path {
        Some(path) => Some(BlacklineConfig::load_from_file(path)?),
        None => match user_config_candidate_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Some(BlacklineConfig::load_from_file(&path)?),
            None => None,
        },
    };
    Ok(merge_rules(defaults, user))
}

/// Validates rule integrity (names, regex compilation, pattern length).
fn validate_rules(rules: &[DetectionRule]) -> Result<()> {
    let mut rule_names = HashSet::new();
    let mut errors = Vec::new();

    for rule in rules {
        if rule.name.is_empty() {
            errors.push("A rule has an empty `name` field.".to_string());
        } else if !rule_names.insert(rule.name.clone()) {
            errors.push(format!("Duplicate rule name found: '{}'.", rule.name));
        }

        let pattern = match &rule.pattern {
            Some(p) => p,
            None => {
                errors.push(format!("Rule '{}' is missing the `pattern` field.", rule.name));
                continue;
            }
        };

        if pattern.is_empty() {
            errors.push(format!("Rule '{}' has an empty `pattern` field.", rule.name));
        }
        if pattern.len() > MAX_PATTERN_LENGTH {
            errors.push(format!(
                "Rule '{}': pattern length ({}) exceeds maximum allowed ({}).",
                rule.name,
                pattern.len(),
                MAX_PATTERN_LENGTH
            ));
        }
        if let Err(e) = Regex::new(pattern) {
            errors.push(format!("Rule '{}' has an invalid regex pattern: {}", rule.name, e));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("Rule validation failed:\n{}", errors.join("\n")))
    }
}
