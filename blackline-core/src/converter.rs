// blackline-core/src/converter.rs
//! The document converter seam.
//!
//! Turning an uploaded binary into markup is the one asynchronous step of the
//! pipeline. The editor never converts anything itself; a host injects a
//! [`DocumentConverter`] and calls [`load_document`], which only produces a new
//! editor state once conversion has succeeded.

use async_trait::async_trait;
use log::{info, warn};
use std::path::Path;

use crate::editor::EditorState;
use crate::errors::{BlacklineError, ConversionError};

/// Converts uploaded bytes into editor markup.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this converter handles files named `upload_name`.
    fn accepts(&self, upload_name: &str) -> bool;

    async fn convert(&self, bytes: &[u8]) -> Result<String, ConversionError>;
}

fn extension_of(upload_name: &str) -> String {
    Path::new(upload_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Accepts markup that has already been converted (`.html`, `.htm`, `.xhtml`).
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupFileConverter;

impl MarkupFileConverter {
    pub const EXTENSIONS: [&'static str; 3] = ["html", "htm", "xhtml"];
}

#[async_trait]
impl DocumentConverter for MarkupFileConverter {
    fn name(&self) -> &str {
        "markup"
    }

    fn accepts(&self, upload_name: &str) -> bool {
        Self::EXTENSIONS.contains(&extension_of(upload_name).as_str())
    }

    async fn convert(&self, bytes: &[u8]) -> Result<String, ConversionError> {
        let text = std::str::from_utf8(bytes).map_err(|e| ConversionError::InvalidEncoding(e.to_string()))?;
        if text.to_ascii_lowercase().contains("<script") {
            return Err(ConversionError::DisallowedContent("script element".to_string()));
        }
        Ok(text.to_string())
    }
}

/// Converts `bytes` and loads the result into a fresh state derived from `state`.
///
/// On any failure the error is returned and `state` remains the valid state.
pub async fn load_document(
    state: &EditorState,
    converter: &dyn DocumentConverter,
    upload_name: &str,
    bytes: &[u8],
) -> Result<EditorState, BlacklineError> {
    if !converter.accepts(upload_name) {
        warn!("Converter '{}' does not accept '{}'.", converter.name(), upload_name);
        return Err(ConversionError::UnsupportedExtension(extension_of(upload_name)).into());
    }
    let markup = converter.convert(bytes).await?;
    info!("Converted '{}' with '{}' converter.", upload_name, converter.name());
    Ok(state.load(markup, upload_name))
}
