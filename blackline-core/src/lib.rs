// blackline-core/src/lib.rs
//! # Blackline Core Library
//!
//! `blackline-core` provides the platform-independent logic of a document redaction
//! editor. A document arrives as converted markup; the library detects likely
//! sensitive spans, replaces user-approved spans with opaque redaction markers,
//! keeps an undo history, and exports a redacted copy that a word processor opens.
//!
//! The editor is an immutable value. Every operation is a pure reducer returning a
//! new [`EditorState`], so a failed operation simply leaves the previous state in
//! place. The only asynchronous step, document conversion, is an injected
//! capability behind the [`DocumentConverter`] trait.
//!
//! ## Modules
//!
//! * `config`: Defines `DetectionRule`s, `ExportConfig` and `BlacklineConfig`.
//! * `detectors`: Compiles detection rules into cached regular expressions.
//! * `engine`: Defines the `DetectionEngine` trait.
//! * `engines`: Contains the regex implementation of `DetectionEngine`.
//! * `candidate`: Candidate suggestions and PII-safe logging helpers.
//! * `markup`: Markup segmentation and the plain-text projection.
//! * `marker`: Redaction marker sizing, rendering and inventory.
//! * `applier`: Writes markers into content.
//! * `history`: The undo stack.
//! * `editor`: `EditorState` and its reducers.
//! * `exporter`: The word-processor export.
//! * `converter`: The conversion seam and the bundled markup converter.
//! * `status`: Status messages and the confirmation gate.
//! * `audit`: JSON-lines audit trail.
//! * `headless`: One-shot, non-interactive redaction.
//!
//! ## Usage Example
//!
//! ```rust
//! use blackline_core::{export_document, BlacklineConfig, EditorState, RegexEngine};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let config = BlacklineConfig::load_default_rules()?;
//!     let engine = RegexEngine::new(config.clone())?;
//!
//!     let state = EditorState::new()
//!         .load("<p>Contact John Smith at john.smith@example.com</p>", "memo.html")
//!         .detect_candidates(&engine)?;
//!     let state = state.apply_candidate_redaction(0)?;
//!
//!     let file = export_document(&state, &config.export)?;
//!     assert_eq!(file.filename, "memo_redacted.doc");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Operations return [`BlacklineError`]; configuration loading uses `anyhow::Error`
//! with context. Converters report [`ConversionError`].
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod applier;
pub mod audit;
pub mod candidate;
pub mod config;
pub mod converter;
pub mod detectors;
pub mod editor;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod exporter;
pub mod headless;
pub mod history;
pub mod marker;
pub mod markup;
pub mod status;

/// Re-exports the public configuration types and functions.
pub use config::{
    load_effective_config,
    merge_rules,
    BlacklineConfig,
    Category,
    DetectionRule,
    ExportConfig,
    RuleConfigNotFoundError,
    MAX_PATTERN_LENGTH,
};

pub use errors::{BlacklineError, ConversionError};

pub use engine::DetectionEngine;
pub use engines::regex_engine::RegexEngine;
pub use detectors::compiler::{compile_rules, CompiledRule, CompiledRules};

pub use candidate::{redact_sensitive, Candidate};
pub use marker::{list_markers, MarkerRecord, RedactionMarker};
pub use markup::{plain_text, Projection};

pub use editor::{EditorAction, EditorPhase, EditorState, RedactionSummary};
pub use exporter::{export_document, ExportedFile};
pub use converter::{load_document, DocumentConverter, MarkupFileConverter};
pub use status::{ConfirmationGate, Severity, StatusMessage};
pub use audit::{AuditAction, AuditLog, AuditRecord};
pub use headless::headless_redact_document;
