//! A `DetectionEngine` implementation that uses regular expressions
//! to find sensitive values in a document's plain-text projection.
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::debug;
use regex::{Match, Regex};
use std::collections::HashSet;
use std::sync::Arc;

use crate::candidate::{log_captured_match_debug, Candidate};
use crate::config::{BlacklineConfig, Category};
use crate::detectors::compiler::{get_or_compile_rules, CompiledRule, CompiledRules};
use crate::engine::DetectionEngine;

#[derive(Debug)]
pub struct RegexEngine {
    compiled_rules: Arc<CompiledRules>,
    config: BlacklineConfig,
}

impl RegexEngine {
    pub fn new(config: BlacklineConfig) -> Result<Self> {
        let compiled_rules = get_or_compile_rules(&config)
            .context("Failed to compile detection rules for RegexEngine")?;
        Ok(Self { compiled_rules, config })
    }

    /// Engine over the built-in rule set.
    pub fn with_default_rules() -> Result<Self> {
        Self::new(BlacklineConfig::load_default_rules()?)
    }

    /// Collects every non-empty match of one rule, left to right.
    ///
    /// The scan position always moves forward: after an empty match it advances by
    /// one character, so patterns that can match the empty string still terminate.
    fn scan_rule<'t>(&self, rule: &CompiledRule, text: &'t str) -> Vec<Match<'t>> {
        let mut found = Vec::new();
        let mut at = 0;

        while at <= text.len() {
            let Some(m) = rule.regex.find_at(text, at) else { break };
            if m.start() == m.end() {
                at = next_char_boundary(text, m.end());
                continue;
            }

            let chosen = if rule.shift_sentence_initial && is_sentence_start(text, m.start()) {
                second_word_match(&rule.regex, text, m).unwrap_or(m)
            } else {
                m
            };

            log_captured_match_debug(module_path!(), &rule.name, chosen.as_str());
            at = chosen.end();
            found.push(chosen);
        }
        found
    }
}

impl DetectionEngine for RegexEngine {
    fn detect(&self, text: &str) -> Vec<Candidate> {
        let mut seen: HashSet<(String, Category)> = HashSet::new();
        let mut candidates = Vec::new();

        for rule in &self.compiled_rules.rules {
            for m in self.scan_rule(rule, text) {
                if seen.insert((m.as_str().to_string(), rule.category)) {
                    candidates.push(Candidate {
                        text: m.as_str().to_string(),
                        category: rule.category,
                        position: text[..m.start()].chars().count(),
                    });
                }
            }
        }

        debug!("Detection produced {} unique candidates.", candidates.len());
        candidates
    }

    fn compiled_rules(&self) -> &CompiledRules {
        &self.compiled_rules
    }

    fn get_config(&self) -> &BlacklineConfig {
        &self.config
    }
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    text[from..]
        .chars()
        .next()
        .map(|c| from + c.len_utf8())
        .unwrap_or(text.len() + 1)
}

/// A position starts a sentence when only whitespace separates it from the start
/// of the text or from a preceding `.`, `!`, `?` or line break.
fn is_sentence_start(text: &str, pos: usize) -> bool {
    match text[..pos].trim_end_matches([' ', '\t', '\u{a0}']).chars().last() {
        None => true,
        Some(c) => matches!(c, '.' | '!' | '?' | '\n' | '\r'),
    }
}

/// Re-runs the rule from the second word of a sentence-initial match. The shifted
/// match is used only if it begins exactly at that word, so a sentence that really
/// opens with a name keeps its original match.
fn second_word_match<'t>(regex: &Regex, text: &'t str, m: Match<'t>) -> Option<Match<'t>> {
    let matched = m.as_str();
    let gap = matched.find(char::is_whitespace)?;
    let word_offset = matched[gap..].find(|c: char| !c.is_whitespace())? + gap;
    let second = m.start() + word_offset;
    regex.find_at(text, second).filter(|inner| inner.start() == second)
}
