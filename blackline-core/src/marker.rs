// blackline-core/src/marker.rs
//! Redaction markers: sizing, rendering and inventory.
//!
//! A marker is an inline `<span class="redacted-text">` whose only text is a run of
//! block glyphs. The text it replaced is kept in the `data-original` attribute for
//! audit tooling; it is never part of the rendered text and is dropped on export.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::markup::{self, escape_attribute, Segment, MARKER_CLASS};

/// The glyph used for marker display text.
pub const BLOCK_GLYPH: char = '█';

/// Inline style of a marker while editing. Concealment relies on matching colors,
/// which is why the exporter replaces it.
pub const LIVE_STYLE: &str =
    "background: #000; color: #000; padding: 2px 4px; border-radius: 2px; user-select: none;";

/// Glyph count shown in the editor: `max(1, ceil(len / 3))`.
pub fn live_glyph_count(original_len: usize) -> usize {
    original_len.div_ceil(3).max(1)
}

/// Glyph count written to an exported file: `max(3, ceil(len / 3))`.
pub fn export_glyph_count(original_len: usize) -> usize {
    original_len.div_ceil(3).max(3)
}

pub fn glyphs(count: usize) -> String {
    std::iter::repeat(BLOCK_GLYPH).take(count).collect()
}

/// A marker about to be inserted into the live document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionMarker {
    pub display_text: String,
    pub original_text: String,
}

impl RedactionMarker {
    pub fn new(original_text: &str) -> Self {
        Self {
            display_text: glyphs(live_glyph_count(original_text.chars().count())),
            original_text: original_text.to_string(),
        }
    }

    /// Markup for the live editor.
    pub fn to_markup(&self) -> String {
        format!(
            r#"<span class="{}" data-original="{}" style="{}">{}</span>"#,
            MARKER_CLASS,
            escape_attribute(&self.original_text),
            LIVE_STYLE,
            self.display_text
        )
    }
}

/// An existing marker found in document markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRecord {
    /// Text recovered from `data-original`; empty if the attribute is absent.
    pub original_text: String,
    /// Glyphs currently displayed.
    pub glyph_count: usize,
    /// Byte range of the whole element, opening tag through `</span>`.
    pub markup_range: Range<usize>,
}

/// Lists every marker in `content`, in document order.
pub fn list_markers(content: &str) -> Vec<MarkerRecord> {
    let mut records = Vec::new();
    let mut open: Option<(usize, String, usize)> = None;

    for segment in markup::segments(content) {
        match segment {
            Segment::Tag { start, raw } if open.is_none() => {
                if markup::is_marker_open_tag(raw) {
                    let original = markup::attribute(raw, "data-original").unwrap_or_default();
                    open = Some((start, original, 0));
                }
            }
            Segment::Tag { raw, .. } => {
                if is_close_span(raw) {
                    if let Some((start, original_text, glyph_count)) = open.take() {
                        records.push(MarkerRecord {
                            original_text,
                            glyph_count,
                            markup_range: start..segment.end(),
                        });
                    }
                }
            }
            Segment::Text { raw, .. } => {
                if let Some((_, _, count)) = open.as_mut() {
                    *count += markup::decode_entities(raw).chars().count();
                }
            }
        }
    }
    records
}

fn is_close_span(raw: &str) -> bool {
    markup::tag_head(raw).is_some_and(|head| head.closing && head.name == "span")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_counts_follow_the_sizing_policy() {
        assert_eq!(live_glyph_count(1), 1);
        assert_eq!(live_glyph_count(3), 1);
        assert_eq!(live_glyph_count(4), 2);
        assert_eq!(live_glyph_count(12), 4);
        assert_eq!(live_glyph_count(23), 8);
        assert_eq!(export_glyph_count(1), 3);
        assert_eq!(export_glyph_count(9), 3);
        assert_eq!(export_glyph_count(10), 4);
        assert_eq!(export_glyph_count(23), 8);
    }

    #[test]
    fn marker_markup_hides_original_in_attribute_only() {
        let marker = RedactionMarker::new(r#"<b>"x"</b>"#);
        let html = marker.to_markup();
        assert!(html.contains(r#"data-original="&lt;b&gt;&quot;x&quot;&lt;/b&gt;""#));
        assert_eq!(markup::plain_text(&html), "████");
    }

    #[test]
    fn list_markers_recovers_original_text() {
        let content = format!(
            "<p>Call {} or {}</p>",
            RedactionMarker::new("555-123-4567").to_markup(),
            RedactionMarker::new("a&b").to_markup()
        );
        let records = list_markers(&content);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].original_text, "555-123-4567");
        assert_eq!(records[0].glyph_count, 4);
        assert_eq!(records[1].original_text, "a&b");
        assert_eq!(records[1].glyph_count, 1);
        assert!(content[records[1].markup_range.clone()].ends_with("</span>"));
    }
}
