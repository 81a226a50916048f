// blackline/src/commands/redact.rs
//! `redact`: one-shot redaction of every selected candidate, followed by export.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};

use blackline_core::{
    export_document, headless_redact_document, load_document, plain_text, AuditAction, AuditLog, AuditRecord,
    EditorState, ExportedFile, MarkupFileConverter,
};

use crate::cli::RedactCommand;
use crate::commands::{build_config, info_msg, read_input, warn_msg};
use crate::ui::diff_viewer;
use crate::ui::redaction_summary;
use crate::ui::theme::ThemeMap;

pub async fn run_redact(cmd: RedactCommand, theme_map: &ThemeMap, quiet: bool) -> Result<()> {
    let config = build_config(&cmd.rules)?;
    let export_config = config.export.clone();

    let (bytes, upload_name) = read_input(cmd.input_file.as_deref())?;
    // Only the converted markup is kept; the headless run loads it again.
    let loaded = load_document(&EditorState::new(), &MarkupFileConverter, &upload_name, &bytes)
        .await
        .with_context(|| format!("Failed to load '{}'", upload_name))?;
    let content = loaded.current().unwrap_or_default().to_string();

    let mut audit = match &cmd.audit_log {
        Some(path) => Some(AuditLog::open(path).with_context(|| format!("Failed to open audit log {}", path.display()))?),
        None => None,
    };

    let categories = (!cmd.categories.is_empty()).then_some(cmd.categories.as_slice());
    let state = headless_redact_document(config, &content, &upload_name, categories, audit.as_mut())?;

    if state.redaction_count() == 0 && !quiet {
        warn_msg("No candidates were redacted.", theme_map);
    }

    let file = export_document(&state, &export_config)?;
    let path = write_export(&file, &cmd.output_dir)?;
    if let Some(log) = audit.as_mut() {
        log.append(&AuditRecord::event(state.source_filename(), AuditAction::Export))?;
    }

    if cmd.diff {
        let original = plain_text(state.original().unwrap_or_default());
        let stdout = io::stdout();
        let supports_color = stdout.is_terminal();
        diff_viewer::print_diff(&original, &state.current_text(), &mut stdout.lock(), theme_map, supports_color)?;
    }

    if !cmd.no_summary && !quiet {
        let supports_color = io::stderr().is_terminal();
        redaction_summary::print_summary(&state.summary(), &mut io::stderr(), theme_map, supports_color)?;
        info_msg(format!("Redacted document written to {}", path.display()), theme_map);
    }
    Ok(())
}

/// Writes an export into `dir` under its own file name.
///
/// The bytes go to a staging file that is renamed into place, so a failed write
/// never leaves a truncated export behind.
pub fn write_export(file: &ExportedFile, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(&file.filename);
    let staging = dir.join(format!(".{}.partial", file.filename));
    let written = std::fs::write(&staging, &file.bytes).and_then(|_| std::fs::rename(&staging, &path));
    if let Err(e) = written {
        if let Err(cleanup) = std::fs::remove_file(&staging) {
            warn!("Could not remove staging file {}: {}", staging.display(), cleanup);
        }
        return Err(e).with_context(|| format!("Failed to write {}", path.display()));
    }
    info!("Wrote {} ({}, {} bytes).", path.display(), file.mime_type, file.bytes.len());
    Ok(path)
}
