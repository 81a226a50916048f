// blackline-core/src/applier.rs
//! The redaction applier: the only code that writes markers into content.
//!
//! Two entry points share one splice primitive:
//!
//! * [`redact_range`] replaces a char range of the plain-text projection (the
//!   manual selection path).
//! * [`redact_all_occurrences`] replaces every literal occurrence of a string in
//!   the projection (the accepted-candidate path), then masks the same string in
//!   the attribute values of ordinary tags (`href`, `title`, ...).
//!
//! Splicing removes the text inside the span but keeps every tag that lies inside
//! it, so elements opened or closed within a selection stay balanced. The marker
//! lands where the span's first character was. Neither function touches history or
//! counters; that belongs to the editor.

use log::debug;
use regex::Regex;
use std::ops::Range;

use crate::candidate::log_redaction_action_debug;
use crate::errors::BlacklineError;
use crate::marker::RedactionMarker;
use crate::markup::{self, Projection, Segment};

/// Result of a range redaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedRedaction {
    pub content: String,
    /// The projected text that was replaced.
    pub original_text: String,
    pub glyph_count: usize,
}

/// Result of a literal, document-wide redaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalRedaction {
    pub content: String,
    pub occurrences: usize,
}

/// Replaces the projected char range `range` of `content` with a marker.
pub fn redact_range(content: &str, range: Range<usize>) -> Result<AppliedRedaction, BlacklineError> {
    let projection = Projection::new(content);
    check_range(&projection, &range)?;

    let bytes = projection
        .markup_range(range.clone())
        .ok_or(BlacklineError::EmptySpan)?;
    let original_text = projection.source_slice(range);
    if original_text.is_empty() {
        return Err(BlacklineError::EmptySpan);
    }
    let marker = RedactionMarker::new(&original_text);
    let segments = markup::segments(content);
    let new_content = splice_marker(content, &segments, bytes, &marker);

    log_redaction_action_debug(module_path!(), &original_text, marker.display_text.chars().count(), "range");
    Ok(AppliedRedaction {
        content: new_content,
        glyph_count: marker.display_text.chars().count(),
        original_text,
    })
}

/// Validates a char range against a projection: non-empty, in bounds, and clear of
/// existing markers.
pub fn check_range(projection: &Projection, range: &Range<usize>) -> Result<(), BlacklineError> {
    if range.is_empty() {
        return Err(BlacklineError::EmptySpan);
    }
    if range.end > projection.char_len() {
        return Err(BlacklineError::RangeOutOfBounds {
            start: range.start,
            end: range.end,
            len: projection.char_len(),
        });
    }
    if projection.overlaps_marker(range.clone()) {
        return Err(BlacklineError::RangeOverlapsRedaction { start: range.start, end: range.end });
    }
    Ok(())
}

/// Replaces every occurrence of `literal` in `content`.
///
/// Text occurrences are found on the projection and become markers. The literal is
/// escaped before it is compiled, so characters such as `(`, `+` or `.` in a
/// detected value are matched as themselves. Occurrences that touch an existing
/// marker are left alone. Occurrences inside attribute values of non-marker tags
/// are replaced by the marker glyphs in place. `occurrences` counts both kinds.
pub fn redact_all_occurrences(content: &str, literal: &str) -> Result<GlobalRedaction, BlacklineError> {
    if literal.is_empty() {
        return Err(BlacklineError::EmptySpan);
    }
    let matcher = Regex::new(&regex::escape(literal))
        .map_err(|e| BlacklineError::RuleCompilationError(literal.to_string(), e))?;

    let projection = Projection::new(content);
    let text = projection.text();

    let mut spans: Vec<Range<usize>> = Vec::new();
    let mut char_pos = 0;
    let mut byte_pos = 0;
    for m in matcher.find_iter(text) {
        char_pos += text[byte_pos..m.start()].chars().count();
        let len = m.as_str().chars().count();
        let range = char_pos..char_pos + len;
        char_pos += len;
        byte_pos = m.end();

        if projection.overlaps_marker(range.clone()) {
            debug!("Skipping occurrence at {:?}: overlaps an existing redaction.", range);
            continue;
        }
        if let Some(bytes) = projection.markup_range(range) {
            spans.push(bytes);
        }
    }

    let segments = markup::segments(content);
    let marker = RedactionMarker::new(literal);
    let mut new_content = content.to_string();
    // Right to left, so the byte ranges still to be processed stay valid.
    for bytes in spans.iter().rev() {
        new_content = splice_marker(&new_content, &segments, bytes.clone(), &marker);
    }

    let (new_content, in_attributes) = redact_attribute_values(&new_content, literal, &marker.display_text);
    if in_attributes > 0 {
        debug!("Masked {} occurrence(s) inside attribute values.", in_attributes);
    }

    let occurrences = spans.len() + in_attributes;
    if occurrences > 0 {
        log_redaction_action_debug(module_path!(), literal, marker.display_text.chars().count(), "literal");
    }
    Ok(GlobalRedaction { content: new_content, occurrences })
}

/// Replaces `literal` with `glyphs` inside the attribute values of every tag that
/// is not a redaction marker. Returns the new content and the number of
/// replacements.
fn redact_attribute_values(content: &str, literal: &str, glyphs: &str) -> (String, usize) {
    let mut replaced = 0;
    let mut out = String::with_capacity(content.len());
    for segment in markup::segments(content) {
        let raw = segment.raw();
        let rewritten = match segment {
            Segment::Tag { .. } if !markup::is_marker_open_tag(raw) => markup::rewrite_attribute_values(raw, |value| {
                let hits = value.matches(literal).count();
                replaced += hits;
                (hits > 0).then(|| value.replace(literal, glyphs))
            }),
            _ => None,
        };
        out.push_str(rewritten.as_deref().unwrap_or(raw));
    }
    (out, replaced)
}

/// Builds `content[..start] + marker + (tags within span) + content[end..]`.
///
/// `segments` may come from an earlier version of `content` as long as everything
/// before `bytes.end` is unchanged.
fn splice_marker(content: &str, segments: &[Segment<'_>], bytes: Range<usize>, marker: &RedactionMarker) -> String {
    let kept_tags: String = segments
        .iter()
        .filter(|s| matches!(s, Segment::Tag { .. }) && s.start() >= bytes.start && s.end() <= bytes.end)
        .map(|s| s.raw())
        .collect();

    let mut out = String::with_capacity(content.len() + 160);
    out.push_str(&content[..bytes.start]);
    out.push_str(&marker.to_markup());
    out.push_str(&kept_tags);
    out.push_str(&content[bytes.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::list_markers;
    use crate::markup::plain_text;

    #[test]
    fn range_redaction_replaces_text_with_glyphs() {
        let content = "<p>Call 555-123-4567 now</p>";
        let applied = redact_range(content, 5..17).unwrap();
        assert_eq!(applied.original_text, "555-123-4567");
        assert_eq!(applied.glyph_count, 4);
        assert_eq!(plain_text(&applied.content), "Call ████ now\n");
    }

    #[test]
    fn range_across_elements_keeps_tags_balanced() {
        let content = "<p>Dear <b>Jane</b> Roe,</p>";
        // "Jane Roe"
        let applied = redact_range(content, 5..13).unwrap();
        assert_eq!(applied.original_text, "Jane Roe");
        // The marker opens inside <b>; the </b> from within the span is kept after it.
        assert!(applied.content.starts_with("<p>Dear <b><span"));
        assert!(applied.content.ends_with("</span></b>,</p>"));
        assert_eq!(plain_text(&applied.content), "Dear ███,\n");
    }

    #[test]
    fn range_across_paragraphs_records_only_document_text() {
        let content = "<p>ab</p><p>cd</p>";
        // "b", the paragraph break, "c"
        let applied = redact_range(content, 1..4).unwrap();
        assert_eq!(applied.original_text, "bc");
        assert_eq!(applied.glyph_count, 1);
        assert!(!applied.content.contains("&#10;"));
        assert_eq!(list_markers(&applied.content)[0].original_text, "bc");
    }

    #[test]
    fn range_of_only_a_paragraph_break_is_empty() {
        let err = redact_range("<p>ab</p><p>cd</p>", 2..3).unwrap_err();
        assert!(matches!(err, BlacklineError::EmptySpan));
    }

    #[test]
    fn range_outside_text_is_rejected() {
        let err = redact_range("<p>abc</p>", 2..10).unwrap_err();
        assert!(matches!(err, BlacklineError::RangeOutOfBounds { len: 4, .. }));
    }

    #[test]
    fn range_over_existing_marker_is_rejected() {
        let first = redact_range("<p>one two</p>", 0..3).unwrap();
        let err = redact_range(&first.content, 0..3).unwrap_err();
        assert!(matches!(err, BlacklineError::RangeOverlapsRedaction { .. }));
    }

    #[test]
    fn literal_redaction_replaces_every_occurrence() {
        let content = "<p>Mail a@b.io</p><p>Again: a@b.io.</p>";
        let applied = redact_all_occurrences(content, "a@b.io").unwrap();
        assert_eq!(applied.occurrences, 2);
        assert!(!plain_text(&applied.content).contains("a@b.io"));
        assert_eq!(list_markers(&applied.content).len(), 2);
    }

    #[test]
    fn literal_redaction_treats_metacharacters_literally() {
        let content = "<p>(555) 123+4567 and 555a123b4567</p>";
        let applied = redact_all_occurrences(content, "(555) 123+4567").unwrap();
        assert_eq!(applied.occurrences, 1);
        assert!(plain_text(&applied.content).contains("555a123b4567"));
    }

    #[test]
    fn literal_redaction_matches_entity_encoded_text() {
        let content = "<p>AT&amp;T Labs</p>";
        let applied = redact_all_occurrences(content, "AT&T").unwrap();
        assert_eq!(applied.occurrences, 1);
        assert_eq!(plain_text(&applied.content), "██ Labs\n");
        assert_eq!(list_markers(&applied.content)[0].original_text, "AT&T");
    }

    #[test]
    fn literal_redaction_masks_attribute_values() {
        let content = r#"<p>Mail <a href="mailto:a@b.io" title='a@b.io'>a@b.io</a></p>"#;
        let applied = redact_all_occurrences(content, "a@b.io").unwrap();
        assert_eq!(applied.occurrences, 3);
        assert!(applied.content.starts_with(r#"<p>Mail <a href="mailto:██" title="██"><span"#));
        assert_eq!(list_markers(&applied.content).len(), 1);
        assert_eq!(plain_text(&applied.content), "Mail ██\n");
    }

    #[test]
    fn literal_redaction_leaves_marker_attributes_alone() {
        let first = redact_all_occurrences("<p>John Smith, Smith</p>", "John Smith").unwrap();
        let second = redact_all_occurrences(&first.content, "Smith").unwrap();
        assert_eq!(second.occurrences, 1);
        let markers = list_markers(&second.content);
        assert_eq!(markers[0].original_text, "John Smith");
        assert_eq!(markers[1].original_text, "Smith");
    }

    #[test]
    fn literal_redaction_without_match_leaves_content_alone() {
        let content = "<p>nothing here</p>";
        let applied = redact_all_occurrences(content, "secret").unwrap();
        assert_eq!(applied.occurrences, 0);
        assert_eq!(applied.content, content);
    }
}
