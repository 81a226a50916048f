// blackline/src/commands/mod.rs
//! Command implementations and the helpers they share.

pub mod redact;
pub mod scan;
pub mod session;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::debug;
use std::io::{self, Read};
use std::path::Path;

use blackline_core::{load_document, load_effective_config, BlacklineConfig, EditorState, MarkupFileConverter};

use crate::cli::RuleArgs;
use crate::ui::output_format;
use crate::ui::theme::ThemeMap;

/// Upload name used when the document comes from stdin.
pub const STDIN_UPLOAD_NAME: &str = "document.html";

/// Helper for printing info messages to stderr.
pub fn info_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let supports_color = io::stderr().is_terminal();
    let _ = output_format::print_info_message(&mut io::stderr(), msg.as_ref(), theme, supports_color);
}

/// Helper for printing warning messages to stderr.
pub fn warn_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let supports_color = io::stderr().is_terminal();
    let _ = output_format::print_warn_message(&mut io::stderr(), msg.as_ref(), theme, supports_color);
}

/// Helper for printing error messages to stderr.
pub fn error_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let supports_color = io::stderr().is_terminal();
    let _ = output_format::print_error_message(&mut io::stderr(), msg.as_ref(), theme, supports_color);
}

/// Loads the effective rule configuration and applies `--enable` / `--disable`.
pub fn build_config(args: &RuleArgs) -> Result<BlacklineConfig> {
    let mut config = load_effective_config(args.config.as_deref()).context("Failed to load rule configuration")?;
    config.set_active_rules(&args.enable, &args.disable);
    debug!("{} active rule(s).", config.rules.len());
    Ok(config)
}

/// Reads raw document bytes from a file, or stdin when no path is given.
/// Returns the bytes with the upload name to use for them.
pub fn read_input(path: Option<&Path>) -> Result<(Vec<u8>, String)> {
    match path {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("Failed to read input file {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| STDIN_UPLOAD_NAME.to_string());
            Ok((bytes, name))
        }
        None => {
            let mut bytes = Vec::new();
            io::stdin().read_to_end(&mut bytes).context("Failed to read document from stdin")?;
            Ok((bytes, STDIN_UPLOAD_NAME.to_string()))
        }
    }
}

/// Converts and loads a document into a fresh editor state.
pub async fn open_document(path: Option<&Path>) -> Result<EditorState> {
    let (bytes, upload_name) = read_input(path)?;
    let state = load_document(&EditorState::new(), &MarkupFileConverter, &upload_name, &bytes)
        .await
        .with_context(|| format!("Failed to load '{}'", upload_name))?;
    Ok(state)
}
