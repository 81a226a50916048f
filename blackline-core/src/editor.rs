// blackline-core/src/editor.rs
//! Editor state and its reducers.
//!
//! [`EditorState`] is an immutable value. Every operation is a reducer that takes
//! the current state by reference and returns the next one, so a host can keep the
//! previous value around, compare states, or discard a failed transition without
//! any cleanup. Failed reducers return an error and the caller simply keeps the
//! state it already has.
//!
//! Invariants maintained by every reducer:
//!
//! * `original` never changes after `load`.
//! * `current` only changes through the applier, `undo`, or `reset_all`.
//! * History depth, the action journal and `redaction_count` move in lockstep.

use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use crate::applier;
use crate::candidate::Candidate;
use crate::config::Category;
use crate::engine::DetectionEngine;
use crate::errors::BlacklineError;
use crate::history::History;
use crate::markup::{plain_text, Projection};

/// A loaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    original: String,
    current: String,
    source_filename: String,
}

/// What kind of action produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RedactionAction {
    Manual,
    Candidate(Category),
}

/// Coarse editor phase. `Editing` is `Loaded` with undoable history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Empty,
    Loaded,
    Editing,
}

/// Counts of the redaction actions currently applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RedactionSummary {
    pub manual: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub total: usize,
}

/// One user intent, for hosts that dispatch through [`EditorState::reduce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    Load { content: String, upload_name: String },
    ApplyManual { selection_text: String, range: Range<usize> },
    ApplyCandidate(usize),
    RejectCandidate(usize),
    Undo,
    ResetAll,
    Detect,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    document: Option<Document>,
    history: History,
    actions: Vec<RedactionAction>,
    candidates: Vec<Candidate>,
    redaction_count: usize,
}

/// Derives the base name used for export from an upload file name.
pub fn source_base_name(upload_name: &str) -> String {
    Path::new(upload_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever was loaded with `content`. Unsaved progress is discarded.
    pub fn load(&self, content: impl Into<String>, upload_name: &str) -> Self {
        let content = content.into();
        let source_filename = source_base_name(upload_name);
        info!("Loaded document '{}' ({} bytes of markup).", source_filename, content.len());
        Self {
            document: Some(Document {
                original: content.clone(),
                current: content,
                source_filename,
            }),
            ..Self::default()
        }
    }

    /// Redacts a user selection given as a char range over the plain-text
    /// projection of the current content.
    ///
    /// Leading and trailing whitespace is trimmed from the range. An empty
    /// selection, or no loaded document, is a silent no-op.
    pub fn apply_manual_redaction(&self, selection_text: &str, range: Range<usize>) -> Result<Self, BlacklineError> {
        let Some(doc) = &self.document else {
            return Ok(self.clone());
        };
        if selection_text.trim().is_empty() {
            return Ok(self.clone());
        }

        let projection = Projection::new(&doc.current);
        if range.end > projection.char_len() || range.start > range.end {
            return Err(BlacklineError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: projection.char_len(),
            });
        }
        let trimmed = projection.trim_range(range);
        if trimmed.is_empty() {
            return Ok(self.clone());
        }
        if normalize_whitespace(&projection.slice(trimmed.clone())) != normalize_whitespace(selection_text) {
            return Err(BlacklineError::SelectionMismatch { start: trimmed.start, end: trimmed.end });
        }

        let applied = applier::redact_range(&doc.current, trimmed)?;
        Ok(self.with_redaction(applied.content, RedactionAction::Manual))
    }

    /// Accepts a candidate: every occurrence of its text is redacted as one action.
    ///
    /// The acceptance always counts as one redaction with its own history entry,
    /// even when the text no longer occurs (for example it was redacted by hand).
    pub fn apply_candidate_redaction(&self, index: usize) -> Result<Self, BlacklineError> {
        let candidate = self.candidate_at(index)?;
        let doc = self.document.as_ref().ok_or(BlacklineError::NoDocument)?;

        let applied = applier::redact_all_occurrences(&doc.current, &candidate.text)?;
        debug!(
            "Accepted {} candidate #{}: {} occurrence(s) replaced.",
            candidate.category, index, applied.occurrences
        );

        let mut next = self.with_redaction(applied.content, RedactionAction::Candidate(candidate.category));
        next.candidates.remove(index);
        Ok(next)
    }

    /// Drops a candidate without touching content.
    pub fn reject_candidate(&self, index: usize) -> Result<Self, BlacklineError> {
        self.candidate_at(index)?;
        let mut next = self.clone();
        next.candidates.remove(index);
        Ok(next)
    }

    /// Restores the snapshot taken before the most recent redaction.
    pub fn undo(&self) -> Self {
        let mut next = self.clone();
        let (Some(doc), Some(snapshot)) = (next.document.as_mut(), next.history.pop()) else {
            return self.clone();
        };
        doc.current = snapshot;
        next.actions.pop();
        next.redaction_count = next.redaction_count.saturating_sub(1);
        next
    }

    /// Returns to the content as loaded. Confirmation is the host's job.
    pub fn reset_all(&self) -> Self {
        let mut next = self.clone();
        if let Some(doc) = next.document.as_mut() {
            doc.current = doc.original.clone();
        }
        next.history.clear();
        next.actions.clear();
        next.candidates.clear();
        next.redaction_count = 0;
        next
    }

    /// Runs `engine` over the projection of the current content and replaces the
    /// candidate list.
    pub fn detect_candidates(&self, engine: &dyn DetectionEngine) -> Result<Self, BlacklineError> {
        let doc = self.document.as_ref().ok_or(BlacklineError::NoDocument)?;
        let candidates = engine.detect(&plain_text(&doc.current));
        info!("Detection found {} candidate(s).", candidates.len());
        Ok(Self { candidates, ..self.clone() })
    }

    /// Dispatches one action to its reducer.
    pub fn reduce(&self, action: EditorAction, engine: &dyn DetectionEngine) -> Result<Self, BlacklineError> {
        match action {
            EditorAction::Load { content, upload_name } => Ok(self.load(content, &upload_name)),
            EditorAction::ApplyManual { selection_text, range } => self.apply_manual_redaction(&selection_text, range),
            EditorAction::ApplyCandidate(index) => self.apply_candidate_redaction(index),
            EditorAction::RejectCandidate(index) => self.reject_candidate(index),
            EditorAction::Undo => Ok(self.undo()),
            EditorAction::ResetAll => Ok(self.reset_all()),
            EditorAction::Detect => self.detect_candidates(engine),
        }
    }

    fn with_redaction(&self, content: String, action: RedactionAction) -> Self {
        let mut next = self.clone();
        if let Some(doc) = next.document.as_mut() {
            let previous = std::mem::replace(&mut doc.current, content);
            next.history.push(previous);
            next.actions.push(action);
            next.redaction_count += 1;
        }
        next
    }

    fn candidate_at(&self, index: usize) -> Result<&Candidate, BlacklineError> {
        self.candidates.get(index).ok_or(BlacklineError::CandidateOutOfRange {
            index,
            len: self.candidates.len(),
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn phase(&self) -> EditorPhase {
        match (&self.document, self.history.is_empty()) {
            (None, _) => EditorPhase::Empty,
            (Some(_), true) => EditorPhase::Loaded,
            (Some(_), false) => EditorPhase::Editing,
        }
    }

    pub fn original(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.original.as_str())
    }

    pub fn current(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.current.as_str())
    }

    /// Base name of the uploaded file; empty when unknown.
    pub fn source_filename(&self) -> &str {
        self.document.as_ref().map(|d| d.source_filename.as_str()).unwrap_or("")
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn redaction_count(&self) -> usize {
        self.redaction_count
    }

    pub fn history_depth(&self) -> usize {
        self.history.depth()
    }

    /// Plain-text projection of the current content.
    pub fn current_text(&self) -> String {
        self.current().map(plain_text).unwrap_or_default()
    }

    pub fn summary(&self) -> RedactionSummary {
        let mut summary = RedactionSummary::default();
        for action in &self.actions {
            match action {
                RedactionAction::Manual => summary.manual += 1,
                RedactionAction::Candidate(category) => *summary.by_category.entry(*category).or_default() += 1,
            }
        }
        summary.total = self.actions.len();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::regex_engine::RegexEngine;

    const DOC: &str = "<p>Call 555-123-4567 or mail a@b.io</p>";

    #[test]
    fn source_base_name_strips_extension() {
        assert_eq!(source_base_name("contract.final.docx"), "contract.final");
        assert_eq!(source_base_name("notes"), "notes");
        assert_eq!(source_base_name(""), "");
    }

    #[test]
    fn manual_redaction_without_document_is_noop() {
        let state = EditorState::new();
        let next = state.apply_manual_redaction("x", 0..1).unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn whitespace_only_selection_is_noop() {
        let state = EditorState::new().load(DOC, "a.docx");
        let next = state.apply_manual_redaction("   ", 4..5).unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn selection_is_trimmed_before_redacting() {
        let state = EditorState::new().load(DOC, "a.docx");
        // " 555-123-4567 " including surrounding spaces.
        let next = state.apply_manual_redaction(" 555-123-4567 ", 4..18).unwrap();
        assert_eq!(next.current_text(), "Call ████ or mail a@b.io\n");
        assert_eq!(next.phase(), EditorPhase::Editing);
    }

    #[test]
    fn mismatched_selection_is_rejected_and_state_kept() {
        let state = EditorState::new().load(DOC, "a.docx");
        let err = state.apply_manual_redaction("Call", 5..9).unwrap_err();
        assert!(matches!(err, BlacklineError::SelectionMismatch { .. }));
    }

    #[test]
    fn candidate_with_no_remaining_occurrence_still_counts_once() {
        let engine = RegexEngine::with_default_rules().unwrap();
        let state = EditorState::new().load(DOC, "a.docx").detect_candidates(&engine).unwrap();
        let phone = state.candidates().iter().position(|c| c.category == Category::Phone).unwrap();
        let manual = state.apply_manual_redaction("555-123-4567", 5..17).unwrap();
        let next = manual.apply_candidate_redaction(phone).unwrap();
        assert_eq!(next.current(), manual.current());
        assert_eq!(next.redaction_count(), 2);
        assert_eq!(next.history_depth(), 2);
        assert_eq!(next.candidates().len(), state.candidates().len() - 1);

        let undone = next.undo();
        assert_eq!(undone.current(), manual.current());
        assert_eq!(undone.redaction_count(), 1);
    }

    #[test]
    fn reject_out_of_range_is_an_error() {
        let state = EditorState::new().load(DOC, "a.docx");
        let err = state.reject_candidate(0).unwrap_err();
        assert!(matches!(err, BlacklineError::CandidateOutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn detect_without_document_is_an_error() {
        let engine = RegexEngine::with_default_rules().unwrap();
        let err = EditorState::new().detect_candidates(&engine).unwrap_err();
        assert!(matches!(err, BlacklineError::NoDocument));
    }

    #[test]
    fn summary_tracks_undo() {
        let engine = RegexEngine::with_default_rules().unwrap();
        let state = EditorState::new().load(DOC, "a.docx").detect_candidates(&engine).unwrap();
        let email = state.candidates().iter().position(|c| c.category == Category::Email).unwrap();
        let state = state.apply_candidate_redaction(email).unwrap();
        let state = state.apply_manual_redaction("Call", 0..4).unwrap();
        let summary = state.summary();
        assert_eq!(summary.manual, 1);
        assert_eq!(summary.by_category.get(&Category::Email), Some(&1));
        assert_eq!(summary.total, 2);

        let summary = state.undo().summary();
        assert_eq!(summary.manual, 0);
        assert_eq!(summary.total, 1);
    }

    #[test]
    fn reduce_dispatches_to_reducers() {
        let engine = RegexEngine::with_default_rules().unwrap();
        let state = EditorState::new()
            .reduce(
                EditorAction::Load { content: DOC.to_string(), upload_name: "memo.docx".to_string() },
                &engine,
            )
            .unwrap();
        assert_eq!(state.source_filename(), "memo");
        let state = state.reduce(EditorAction::Detect, &engine).unwrap();
        assert!(!state.candidates().is_empty());
        let state = state.reduce(EditorAction::ApplyCandidate(0), &engine).unwrap();
        assert_eq!(state.redaction_count(), 1);
        let state = state.reduce(EditorAction::Undo, &engine).unwrap();
        assert_eq!(state.current(), Some(DOC));
    }
}
