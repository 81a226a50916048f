// blackline-core/src/audit.rs
//! Append-only audit trail of editor actions, one JSON object per line.
//!
//! Records never contain redacted text. Where a value must be identifiable
//! across records it is represented by `match_hash`, a SHA-256 digest of the
//! category label and the normalized text.
//!
//! License: MIT OR APACHE 2.0

use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::candidate::canonical_sample_hash;
use crate::config::Category;
use crate::errors::BlacklineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Load,
    ManualRedaction,
    CandidateAccepted,
    CandidateRejected,
    Undo,
    Reset,
    Export,
}

/// One line of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub source: String,
    pub action: AuditAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glyphs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_hash: Option<String>,
}

impl AuditRecord {
    /// A record for an action that involves no redacted value.
    pub fn event(source: &str, action: AuditAction) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            source: source.to_string(),
            action,
            category: None,
            glyphs: None,
            match_hash: None,
        }
    }

    /// A record for an action on `text`. Only its digest is kept.
    pub fn redaction(source: &str, action: AuditAction, category: Option<Category>, glyphs: usize, text: &str) -> Self {
        let label = category.map(|c| c.as_str()).unwrap_or("Manual");
        Self {
            category,
            glyphs: Some(glyphs),
            match_hash: Some(canonical_sample_hash(label, text)),
            ..Self::event(source, action)
        }
    }
}

/// Writer for the audit trail.
pub struct AuditLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl AuditLog {
    /// Opens `path` for appending, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BlacklineError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Audit log opened at {}", path.display());
        Ok(Self { path, writer: BufWriter::new(file) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one record and flushes it.
    pub fn append(&mut self, record: &AuditRecord) -> Result<(), BlacklineError> {
        let line = serde_json::to_string(record).map_err(|e| BlacklineError::SerializationError(e.to_string()))?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Reads every record of an audit file.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<AuditRecord>, BlacklineError> {
    let text = std::fs::read_to_string(path)?;
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(|e| BlacklineError::SerializationError(e.to_string())))
        .collect()
}
