// blackline-core/src/engine.rs
//! Defines the core `DetectionEngine` trait.
//!
//! The trait decouples the editor from the way candidates are found. The shipped
//! implementation is regex based; anything satisfying the contract below can be
//! plugged into [`crate::editor::EditorState::detect_candidates`].
//!
//! License: MIT OR APACHE 2.0

use crate::candidate::Candidate;
use crate::config::BlacklineConfig;
use crate::detectors::compiler::CompiledRules;

/// A trait that defines the core functionality of a detection engine.
///
/// Implementations must be pure: the same text always yields the same list, and
/// the text is never modified.
pub trait DetectionEngine: Send + Sync {
    /// Scans plain text and returns deduplicated candidates.
    ///
    /// Ordering is rule declaration order first, then match order within a rule.
    /// Candidates are unique by `(text, category)`; the first occurrence wins.
    fn detect(&self, text: &str) -> Vec<Candidate>;

    /// Returns a reference to the `CompiledRules` used by the engine.
    fn compiled_rules(&self) -> &CompiledRules;

    /// Returns a reference to the engine's configuration.
    fn get_config(&self) -> &BlacklineConfig;
}
