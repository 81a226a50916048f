// blackline-core/src/markup.rs
//! Markup segmentation and the plain-text projection.
//!
//! Converted documents arrive as HTML-like markup. Detection and manual selection
//! both work on the *plain-text projection*: the text content with tags removed and
//! character entities decoded. Every projected character remembers the byte range
//! of markup it came from, so a character range chosen on the projection can be
//! mapped back onto the markup without re-parsing.
//!
//! Closing block elements (`</p>`, `</li>`, headings, ...) and `<br>` contribute a
//! virtual `'\n'` with an empty markup range. This keeps words from adjacent
//! paragraphs apart so patterns never match across a paragraph break.
//!
//! The tokenizer is deliberately lenient: converted documents are HTML, not XML, so
//! void elements and stray `<` characters must not abort a scan. Entity decoding and
//! escaping go through `quick_xml::escape`, with the HTML names a converter commonly
//! emits resolved here.

use lazy_static::lazy_static;
use quick_xml::escape::{escape, partial_escape, unescape_with};
use regex::Regex;
use std::ops::Range;

/// Class attribute value that identifies a redaction marker element.
pub const MARKER_CLASS: &str = "redacted-text";

const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table", "blockquote", "pre",
];

lazy_static! {
    static ref ATTRIBUTE_REGEX: Regex = Regex::new(
        r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#
    )
    .expect("attribute pattern is valid");
}

/// A piece of markup: either a tag (including comments) or a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Tag { start: usize, raw: &'a str },
    Text { start: usize, raw: &'a str },
}

impl<'a> Segment<'a> {
    pub fn start(&self) -> usize {
        match self {
            Segment::Tag { start, .. } | Segment::Text { start, .. } => *start,
        }
    }

    pub fn raw(&self) -> &'a str {
        match self {
            Segment::Tag { raw, .. } | Segment::Text { raw, .. } => raw,
        }
    }

    pub fn end(&self) -> usize {
        self.start() + self.raw().len()
    }
}

/// A parsed tag head: its lower-cased element name and whether it closes an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHead {
    pub name: String,
    pub closing: bool,
}

/// Splits markup into tags and text runs. A `<` that does not start a well-formed
/// tag is kept as text.
pub fn segments(markup: &str) -> Vec<Segment<'_>> {
    let bytes = markup.as_bytes();
    let mut out = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'<' {
            if let Some(end) = tag_end(markup, i) {
                if text_start < i {
                    out.push(Segment::Text { start: text_start, raw: &markup[text_start..i] });
                }
                out.push(Segment::Tag { start: i, raw: &markup[i..end] });
                i = end;
                text_start = end;
                continue;
            }
        }
        i += 1;
    }
    if text_start < bytes.len() {
        out.push(Segment::Text { start: text_start, raw: &markup[text_start..] });
    }
    out
}

fn tag_end(markup: &str, open: usize) -> Option<usize> {
    let rest = &markup[open..];
    if rest.starts_with("<!--") {
        return rest.find("-->").map(|p| open + p + 3);
    }
    let next = *rest.as_bytes().get(1)?;
    if !(next.is_ascii_alphabetic() || matches!(next, b'/' | b'!' | b'?')) {
        return None;
    }
    let mut quote: Option<u8> = None;
    for (offset, &b) in rest.as_bytes().iter().enumerate().skip(1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(open + offset + 1),
            None => {}
        }
    }
    None
}

/// Parses the element name of a tag. Comments and declarations yield `None`.
pub fn tag_head(raw: &str) -> Option<TagHead> {
    let inner = raw.strip_prefix('<')?;
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    if name.is_empty() {
        None
    } else {
        Some(TagHead { name, closing })
    }
}

/// The attribute part of an opening tag and its byte offset within `raw`.
fn attribute_body(raw: &str) -> Option<(usize, &str)> {
    let head = tag_head(raw)?;
    if head.closing {
        return None;
    }
    // Skip "<" and the element name; strip the closing "/>" or ">".
    let body_start = 1 + head.name.len();
    let body = raw.get(body_start..)?.trim_end_matches('>').trim_end_matches('/');
    Some((body_start, body))
}

/// Returns the attributes of an opening tag with entity-decoded values.
pub fn attributes(raw: &str) -> Vec<(String, String)> {
    let Some((_, body)) = attribute_body(raw) else {
        return Vec::new();
    };

    ATTRIBUTE_REGEX
        .captures_iter(body)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            Some((name, value))
        })
        .collect()
}

/// Rewrites attribute values of an opening tag.
///
/// `rewrite` sees each entity-decoded value and returns `Some(new_value)` for the
/// values it changes. Changed values are re-escaped and double-quoted; everything
/// else is copied verbatim. Returns `None` when no value changed.
pub fn rewrite_attribute_values<F>(raw: &str, mut rewrite: F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let (body_start, body) = attribute_body(raw)?;
    let mut out = String::with_capacity(raw.len());
    let mut copied = 0;

    for caps in ATTRIBUTE_REGEX.captures_iter(body) {
        let (value, quoted) = match (caps.get(2).or_else(|| caps.get(3)), caps.get(4)) {
            (Some(m), _) => (m, true),
            (None, Some(m)) => (m, false),
            (None, None) => continue,
        };
        let Some(replacement) = rewrite(&decode_entities(value.as_str())) else {
            continue;
        };
        let quote_len = usize::from(quoted);
        let start = body_start + value.start() - quote_len;
        let end = body_start + value.end() + quote_len;
        out.push_str(&raw[copied..start]);
        out.push('"');
        out.push_str(&escape_attribute(&replacement));
        out.push('"');
        copied = end;
    }

    if copied == 0 {
        return None;
    }
    out.push_str(&raw[copied..]);
    Some(out)
}

/// Looks up one attribute by (case-insensitive) name.
pub fn attribute(raw: &str, name: &str) -> Option<String> {
    attributes(raw)
        .into_iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}

/// True when `raw` opens a redaction marker element.
pub fn is_marker_open_tag(raw: &str) -> bool {
    match tag_head(raw) {
        Some(head) if head.name == "span" && !head.closing => attribute(raw, "class")
            .map(|class| class.split_ascii_whitespace().any(|c| c == MARKER_CLASS))
            .unwrap_or(false),
        _ => false,
    }
}

fn is_span_close(raw: &str) -> bool {
    matches!(tag_head(raw), Some(TagHead { ref name, closing: true }) if name == "span")
}

fn ends_block(raw: &str) -> bool {
    match tag_head(raw) {
        Some(head) if head.closing => BLOCK_ELEMENTS.contains(&head.name.as_str()),
        Some(head) => head.name == "br",
        None => false,
    }
}

/// Named entities understood in documents. Numeric references are handled by
/// `quick_xml` itself.
fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "copy" => "©",
        "reg" => "®",
        "ndash" => "–",
        "mdash" => "\u{2014}",
        "hellip" => "…",
        "lsquo" => "‘",
        "rsquo" => "’",
        "ldquo" => "“",
        "rdquo" => "”",
        _ => return None,
    })
}

/// Decodes the entity starting at the beginning of `s` (which must start with `&`).
/// Returns the decoded character and the entity's byte length.
fn decode_entity(s: &str) -> Option<(char, usize)> {
    let semi = s.as_bytes().iter().take(12).position(|&b| b == b';')?;
    let decoded = unescape_with(&s[..=semi], named_entity).ok()?;
    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some((c, semi + 1)),
        _ => None,
    }
}

/// Decodes character entities in a text run or attribute value.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        match decode_entity(&rest[pos..]) {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[pos + len..];
            }
            None => {
                out.push('&');
                rest = &rest[pos + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escapes text for use as element content.
pub fn escape_text(s: &str) -> String {
    partial_escape(s).into_owned()
}

/// Escapes text for use inside a quoted attribute value. Line breaks become
/// character references so the value stays on one line.
pub fn escape_attribute(s: &str) -> String {
    escape(s).replace('\n', "&#10;")
}

/// Where one projected character came from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CharSource {
    /// Byte range in the markup. Empty for virtual block separators.
    markup: Range<usize>,
    /// True when the character is a glyph inside a redaction marker.
    in_marker: bool,
}

/// The plain-text projection of a markup string with its offset map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    text: String,
    sources: Vec<CharSource>,
}

impl Projection {
    /// Builds the projection of `markup`.
    pub fn new(markup: &str) -> Self {
        let mut text = String::with_capacity(markup.len());
        let mut sources = Vec::new();
        let mut in_marker = false;

        for segment in segments(markup) {
            match segment {
                Segment::Tag { raw, .. } => {
                    if is_marker_open_tag(raw) {
                        in_marker = true;
                    } else if in_marker && is_span_close(raw) {
                        in_marker = false;
                    }
                    if ends_block(raw) && !text.is_empty() && !text.ends_with('\n') {
                        let at = segment.end();
                        text.push('\n');
                        sources.push(CharSource { markup: at..at, in_marker: false });
                    }
                }
                Segment::Text { start, raw } => {
                    let mut offset = 0;
                    while offset < raw.len() {
                        let rest = &raw[offset..];
                        let (c, len) = if rest.starts_with('&') {
                            decode_entity(rest).unwrap_or(('&', 1))
                        } else {
                            let c = rest.chars().next().unwrap_or_default();
                            (c, c.len_utf8())
                        };
                        text.push(c);
                        sources.push(CharSource {
                            markup: start + offset..start + offset + len,
                            in_marker,
                        });
                        offset += len;
                    }
                }
            }
        }

        Self { text, sources }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of projected characters.
    pub fn char_len(&self) -> usize {
        self.sources.len()
    }

    /// The projected text of a char range. Caller guarantees the range is in bounds.
    pub fn slice(&self, range: Range<usize>) -> String {
        self.text.chars().skip(range.start).take(range.len()).collect()
    }

    /// Like [`Projection::slice`], but leaves out virtual block separators, so the
    /// result is exactly the document text the range covers.
    pub fn source_slice(&self, range: Range<usize>) -> String {
        self.text
            .chars()
            .zip(&self.sources)
            .skip(range.start)
            .take(range.len())
            .filter(|(_, source)| !source.markup.is_empty())
            .map(|(c, _)| c)
            .collect()
    }

    /// Maps a non-empty char range to the markup byte range covering it.
    pub fn markup_range(&self, range: Range<usize>) -> Option<Range<usize>> {
        if range.is_empty() || range.end > self.sources.len() {
            return None;
        }
        let first = self.sources.get(range.start)?;
        let last = self.sources.get(range.end - 1)?;
        Some(first.markup.start..last.markup.end)
    }

    /// True when any character of `range` belongs to an existing redaction marker.
    pub fn overlaps_marker(&self, range: Range<usize>) -> bool {
        self.sources
            .get(range)
            .map(|chars| chars.iter().any(|c| c.in_marker))
            .unwrap_or(false)
    }

    /// Shrinks a char range so it neither starts nor ends on whitespace.
    pub fn trim_range(&self, range: Range<usize>) -> Range<usize> {
        let chars: Vec<char> = self.text.chars().collect();
        let mut start = range.start.min(chars.len());
        let mut end = range.end.min(chars.len());
        while start < end && chars[start].is_whitespace() {
            start += 1;
        }
        while end > start && chars[end - 1].is_whitespace() {
            end -= 1;
        }
        start..end
    }
}

/// Convenience wrapper returning only the projected text.
pub fn plain_text(markup: &str) -> String {
    Projection::new(markup).text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_split_tags_and_text() {
        let segs = segments("<p>a <b>b</b></p>");
        let raws: Vec<&str> = segs.iter().map(|s| s.raw()).collect();
        assert_eq!(raws, ["<p>", "a ", "<b>", "b", "</b>", "</p>"]);
    }

    #[test]
    fn stray_angle_bracket_stays_text() {
        let segs = segments("1 < 2");
        assert_eq!(segs, vec![Segment::Text { start: 0, raw: "1 < 2" }]);
    }

    #[test]
    fn quoted_gt_does_not_end_tag() {
        let segs = segments(r#"<a title="x>y">t</a>"#);
        assert_eq!(segs[0].raw(), r#"<a title="x>y">"#);
    }

    #[test]
    fn projection_decodes_entities_and_separates_paragraphs() {
        let p = Projection::new("<p>AT&amp;T</p><p>Next</p>");
        assert_eq!(p.text(), "AT&T\nNext\n");
        // "&" maps back to the whole entity.
        assert_eq!(p.markup_range(2..3), Some(5..10));
    }

    #[test]
    fn projection_flags_marker_glyphs() {
        let markup = r#"<p>x <span class="redacted-text" data-original="abc">█</span> y</p>"#;
        let p = Projection::new(markup);
        assert_eq!(p.text(), "x █ y\n");
        assert!(p.overlaps_marker(2..3));
        assert!(!p.overlaps_marker(0..2));
        assert!(!p.overlaps_marker(3..5));
    }

    #[test]
    fn attributes_are_decoded() {
        let tag = r#"<span class="redacted-text" data-original="a &amp; &quot;b&quot;">"#;
        assert_eq!(attribute(tag, "data-original").as_deref(), Some(r#"a & "b""#));
        assert!(is_marker_open_tag(tag));
        assert!(!is_marker_open_tag("<span class=\"other\">"));
    }

    #[test]
    fn escape_attribute_round_trips_through_decode() {
        let original = "O'Brien <o@x.io> & \"co\"";
        assert_eq!(decode_entities(&escape_attribute(original)), original);
    }

    #[test]
    fn unknown_entities_stay_literal() {
        assert_eq!(decode_entities("AT&T &bogus; &lt;b&gt; &#65;&#x42;"), "AT&T &bogus; <b> AB");
        assert_eq!(plain_text("<p>a&nbsp;b &mdash; c</p>"), "a\u{a0}b \u{2014} c\n");
    }

    #[test]
    fn rewrite_touches_only_changed_values() {
        let tag = r#"<a class=link href='mailto:a@b.io' title="x &amp; a@b.io">"#;
        let rewritten = rewrite_attribute_values(tag, |v| v.contains("a@b.io").then(|| v.replace("a@b.io", "##")));
        assert_eq!(rewritten.as_deref(), Some(r#"<a class=link href="mailto:##" title="x &amp; ##">"#));
        assert_eq!(rewrite_attribute_values(tag, |_| None), None);
        assert_eq!(rewrite_attribute_values("</a>", |_| Some(String::new())), None);
    }

    #[test]
    fn source_slice_drops_block_separators() {
        let p = Projection::new("<p>ab</p><p>cd</p>");
        assert_eq!(p.slice(1..4), "b\nc");
        assert_eq!(p.source_slice(1..4), "bc");
    }

    #[test]
    fn trim_range_skips_whitespace() {
        let p = Projection::new("<p>  hello  </p>");
        assert_eq!(p.trim_range(0..9), 2..7);
    }
}
