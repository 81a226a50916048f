// blackline-core/src/exporter.rs
//! Exporter: turns the current editor content into a word-processor document.
//!
//! Export does three things to the live markup:
//!
//! 1. every marker is resized to its export glyph count,
//! 2. its live style is swapped for a fixed opaque one and `data-original` is dropped,
//! 3. the result is wrapped in an HTML envelope that Word opens as a `.doc`.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, info};

use crate::config::ExportConfig;
use crate::editor::EditorState;
use crate::errors::BlacklineError;
use crate::marker::{export_glyph_count, glyphs, list_markers};
use crate::markup::{escape_text, MARKER_CLASS};

pub const EXPORT_MIME_TYPE: &str = "application/msword";

/// Style written on exported markers. Glyphs are black on a transparent
/// background, so concealment does not depend on two colors matching.
pub const EXPORT_MARKER_STYLE: &str = "color:#000000;background-color:transparent";

const FALLBACK_BASE_NAME: &str = "document";

/// A finished export, ready to be written or handed to a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Exports the current content of `state`.
pub fn export_document(state: &EditorState, config: &ExportConfig) -> Result<ExportedFile, BlacklineError> {
    let content = state
        .current()
        .filter(|c| !c.trim().is_empty())
        .ok_or(BlacklineError::EmptyExport)?;

    let base = match state.source_filename() {
        "" => FALLBACK_BASE_NAME,
        name => name,
    };
    let title = format!("{}_redacted", base);
    let body = normalize_markers(content);
    let html = render_envelope(&title, &body, config);

    info!("Exported '{}.doc' ({} bytes).", title, html.len());
    Ok(ExportedFile {
        filename: format!("{}.doc", title),
        mime_type: EXPORT_MIME_TYPE,
        bytes: html.into_bytes(),
    })
}

/// Rewrites every marker in `content` for export.
pub fn normalize_markers(content: &str) -> String {
    let markers = list_markers(content);
    debug!("Normalizing {} marker(s) for export.", markers.len());

    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    for marker in markers {
        out.push_str(&content[cursor..marker.markup_range.start]);
        let count = export_glyph_count(marker.original_text.chars().count());
        out.push_str(&format!(
            r#"<span class="{}" style="{}">{}</span>"#,
            MARKER_CLASS,
            EXPORT_MARKER_STYLE,
            glyphs(count)
        ));
        cursor = marker.markup_range.end;
    }
    out.push_str(&content[cursor..]);
    out
}

/// Wraps `body` in a Word-compatible HTML document.
pub fn render_envelope(title: &str, body: &str, config: &ExportConfig) -> String {
    format!(
        r#"<!DOCTYPE html>
<html xmlns:v="urn:schemas-microsoft-com:vml"
xmlns:o="urn:schemas-microsoft-com:office:office"
xmlns:w="urn:schemas-microsoft-com:office:word"
xmlns:m="http://schemas.microsoft.com/office/2004/12/omml"
xmlns="http://www.w3.org/TR/REC-html40">
<head>
<meta charset="UTF-8">
<meta name=ProgId content=Word.Document>
<meta name=Generator content="Microsoft Word 15">
<meta name=Originator content="Microsoft Word 15">
<title>{title}</title>
<style>
@page WordSection1 {{
  size:{width} {height};
  margin:{margin} {margin} {margin} {margin};
  mso-header-margin:.5in;
  mso-footer-margin:.5in;
  mso-paper-source:0;
}}
div.WordSection1 {{ page:WordSection1; }}
body {{
  font-family: "{font}", serif;
  font-size: {size};
  line-height: {line_height};
  margin: 0;
}}
p {{ margin: 0; margin-bottom: 8pt; }}
strong, b {{ font-weight: bold; }}
em, i {{ font-style: italic; }}
ul, ol {{ margin-left: 36pt; }}
.{class} {{ {marker_style}; }}
</style>
</head>
<body lang=EN-US style='tab-interval:.5in'>
<div class=WordSection1>
{body}
</div>
</body>
</html>"#,
        title = escape_text(title),
        width = config.page_width,
        height = config.page_height,
        margin = config.margin,
        font = config.font_family,
        size = config.font_size,
        line_height = config.line_height,
        class = MARKER_CLASS,
        marker_style = EXPORT_MARKER_STYLE,
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::plain_text;

    fn exported_text(file: &ExportedFile) -> String {
        plain_text(std::str::from_utf8(&file.bytes).unwrap())
    }

    #[test]
    fn export_without_document_is_an_error() {
        let err = export_document(&EditorState::new(), &ExportConfig::default()).unwrap_err();
        assert!(matches!(err, BlacklineError::EmptyExport));
    }

    #[test]
    fn export_of_blank_document_is_an_error() {
        let state = EditorState::new().load("   ", "blank.docx");
        assert!(matches!(
            export_document(&state, &ExportConfig::default()),
            Err(BlacklineError::EmptyExport)
        ));
    }

    #[test]
    fn filename_falls_back_when_no_name_was_captured() {
        let state = EditorState::new().load("<p>hi</p>", "");
        let file = export_document(&state, &ExportConfig::default()).unwrap();
        assert_eq!(file.filename, "document_redacted.doc");
        assert_eq!(file.mime_type, "application/msword");

        let state = EditorState::new().load("<p>hi</p>", "memo.docx");
        let file = export_document(&state, &ExportConfig::default()).unwrap();
        assert_eq!(file.filename, "memo_redacted.doc");
    }

    #[test]
    fn markers_are_resized_and_stripped_of_originals() {
        let state = EditorState::new().load("<p>Id: 42 and secret-value-x</p>", "a.docx");
        let state = state.apply_manual_redaction("42", 4..6).unwrap();
        let state = state.apply_manual_redaction("secret-value-x", 10..24).unwrap();
        let file = export_document(&state, &ExportConfig::default()).unwrap();
        let html = String::from_utf8(file.bytes.clone()).unwrap();

        assert!(!html.contains("data-original"));
        assert!(!html.contains("secret-value-x"));
        assert!(html.contains(EXPORT_MARKER_STYLE));
        // "42" grows from 1 glyph to 3; the 14-char value stays at 5.
        assert!(exported_text(&file).contains("Id: ███ and █████"));
    }

    #[test]
    fn envelope_uses_export_config() {
        let config = ExportConfig {
            page_width: "210mm".to_string(),
            page_height: "297mm".to_string(),
            font_family: "Arial".to_string(),
            ..ExportConfig::default()
        };
        let html = render_envelope("t", "<p>x</p>", &config);
        assert!(html.contains("size:210mm 297mm;"));
        assert!(html.contains(r#"font-family: "Arial", serif;"#));
        assert!(html.contains("<meta name=ProgId content=Word.Document>"));
        assert!(html.contains("<div class=WordSection1>\n<p>x</p>\n</div>"));
    }
}
