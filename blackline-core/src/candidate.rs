// blackline-core/src/candidate.rs
//! Candidate suggestions and the helpers used to log them without leaking PII.

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Category;

lazy_static! {
    /// Whether sensitive values may appear verbatim in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("BLACKLINE_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// A span of document text that matched a detection rule and awaits a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// The matched text, exactly as it appears in the plain-text projection.
    pub text: String,
    pub category: Category,
    /// Char offset of the first occurrence in the plain-text projection.
    pub position: usize,
}

/// Masks a sensitive value for display in logs.
pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    let len = s.chars().count();
    if len <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", len)
    }
}

fn get_loggable_content(sensitive_content: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        sensitive_content.to_string()
    } else {
        redact_sensitive(sensitive_content)
    }
}

pub fn log_captured_match_debug(module_path: &str, rule_name: &str, original_sensitive_content: &str) {
    debug!(
        "{} Captured match for rule '{}' (original): '{}'",
        module_path,
        rule_name,
        get_loggable_content(original_sensitive_content)
    );
}

pub fn log_redaction_action_debug(
    module_path: &str,
    original_sensitive_content: &str,
    glyph_count: usize,
    origin: &str,
) {
    debug!(
        "{} Redaction action: Original='{}', Glyphs={} via {}",
        module_path,
        get_loggable_content(original_sensitive_content),
        glyph_count,
        origin
    );
}

/// Stable digest of a redacted value, used where an identifier is needed but the
/// value itself must not be stored. Whitespace and case are normalized first.
pub fn canonical_sample_hash(label: &str, snippet: &str) -> String {
    let normalized = snippet
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut hasher = Sha256::new();
    hasher.update(label.as_bytes());
    hasher.update(b":");
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_sensitive_short_string() {
        assert_eq!(redact_sensitive("abc"), "[REDACTED]".to_string());
    }

    #[test]
    fn test_redact_sensitive_long_string() {
        assert_eq!(redact_sensitive("123456789"), "[REDACTED: 9 chars]".to_string());
    }

    #[test]
    fn test_canonical_sample_hash_consistency() {
        let h1 = canonical_sample_hash("Email", "Test@Example.COM ");
        let h2 = canonical_sample_hash("Email", "test@example.com");
        assert_eq!(h1, h2);
        assert_ne!(h1, canonical_sample_hash("Name", "test@example.com"));
    }
}
