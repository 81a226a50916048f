// blackline-core/src/history.rs
//! Undo history: a plain LIFO stack of whole-content snapshots.
//!
//! Each snapshot is the document content captured immediately before a redaction.
//! There is no cap and no compaction; a session edits one document.

/// Linear undo stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    snapshots: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: String) {
        self.snapshots.push(snapshot);
    }

    pub fn pop(&mut self) -> Option<String> {
        self.snapshots.pop()
    }

    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
