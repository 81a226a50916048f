// blackline-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for using the editor without a user in the loop.
//!
//! A headless run loads a document, detects candidates and accepts every candidate
//! whose category is selected, rejecting the rest. The result is an ordinary
//! [`EditorState`], so it can be inspected, undone or exported like any other.

use anyhow::Result;
use log::debug;

use crate::audit::{AuditAction, AuditLog, AuditRecord};
use crate::config::{BlacklineConfig, Category};
use crate::editor::EditorState;
use crate::engines::regex_engine::RegexEngine;
use crate::marker::live_glyph_count;

/// Loads `content`, detects candidates and decides each one without prompting.
///
/// # Arguments
///
/// * `config` - The merged configuration (defaults + optional user overrides).
/// * `content` - Markup of the converted document.
/// * `upload_name` - Name of the uploaded file, used for the export name.
/// * `categories` - Categories to accept; `None` accepts everything.
/// * `audit_log` - Optional audit trail receiving one record per decision.
pub fn headless_redact_document(
    config: BlacklineConfig,
    content: &str,
    upload_name: &str,
    categories: Option<&[Category]>,
    mut audit_log: Option<&mut AuditLog>,
) -> Result<EditorState> {
    let engine = RegexEngine::new(config)?;
    let mut state = EditorState::new().load(content, upload_name).detect_candidates(&engine)?;
    let source = state.source_filename().to_string();

    if let Some(log) = audit_log.as_mut() {
        log.append(&AuditRecord::event(&source, AuditAction::Load))?;
    }

    while let Some(candidate) = state.candidates().first().cloned() {
        let accept = categories.is_none_or(|selected| selected.contains(&candidate.category));
        let (next, action) = if accept {
            (state.apply_candidate_redaction(0)?, AuditAction::CandidateAccepted)
        } else {
            (state.reject_candidate(0)?, AuditAction::CandidateRejected)
        };
        debug!("Headless decision for {} candidate: {:?}", candidate.category, action);

        if let Some(log) = audit_log.as_mut() {
            let glyphs = if accept { live_glyph_count(candidate.text.chars().count()) } else { 0 };
            log.append(&AuditRecord::redaction(&source, action, Some(candidate.category), glyphs, &candidate.text))?;
        }
        state = next;
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::plain_text;

    const CONTENT: &str = "<p>Mail a@b.io or call 555-123-4567.</p>";

    #[test]
    fn test_headless_redacts_every_candidate() -> Result<()> {
        let config = BlacklineConfig::load_default_rules()?;
        let state = headless_redact_document(config, CONTENT, "memo.html", None, None)?;

        let text = plain_text(state.current().unwrap_or_default());
        assert!(!text.contains("a@b.io"));
        assert!(!text.contains("555-123-4567"));
        assert_eq!(state.redaction_count(), 2);
        assert!(state.candidates().is_empty());
        Ok(())
    }

    #[test]
    fn test_headless_respects_category_selection() -> Result<()> {
        let config = BlacklineConfig::load_default_rules()?;
        let state = headless_redact_document(config, CONTENT, "memo.html", Some(&[Category::Phone]), None)?;

        let text = plain_text(state.current().unwrap_or_default());
        assert!(text.contains("a@b.io"));
        assert!(!text.contains("555-123-4567"));
        assert_eq!(state.redaction_count(), 1);
        Ok(())
    }
}
