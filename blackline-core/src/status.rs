// blackline-core/src/status.rs
//! Advisory status messages and the confirmation gate used before destructive actions.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

use crate::editor::EditorState;
use crate::errors::BlacklineError;

/// How long a status message stays visible, in seconds.
pub const DISMISS_AFTER_SECS: i64 = 3;

pub const RESET_PROMPT: &str = "Are you sure you want to clear all redactions?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
    pub issued_at: DateTime<Utc>,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self { text: text.into(), severity, issued_at: Utc::now() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Info)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Success)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Error)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at >= Duration::seconds(DISMISS_AFTER_SECS)
    }
}

impl From<&BlacklineError> for StatusMessage {
    fn from(err: &BlacklineError) -> Self {
        StatusMessage::error(err.to_string())
    }
}

/// Asks the user to confirm an action.
pub trait ConfirmationGate {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// A gate that always gives the same answer. Used for `--yes` and scripted input.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl ConfirmationGate for FixedAnswer {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

/// Resets all redactions if `gate` confirms; otherwise returns `state` unchanged.
pub fn confirm_reset(state: &EditorState, gate: &mut dyn ConfirmationGate) -> (EditorState, bool) {
    if gate.confirm(RESET_PROMPT) {
        (state.reset_all(), true)
    } else {
        (state.clone(), false)
    }
}
