// blackline/src/commands/session.rs
//! `session`: a line-oriented redaction session.
//!
//! Each input line is one command. The session keeps a single [`EditorState`] and
//! replaces it with whatever the reducer for the command returns; a failed command
//! reports an error status and leaves the state untouched. Commands can come from
//! a terminal or from a script file, which makes whole editing sessions
//! reproducible.

use anyhow::{Context, Result};
use chrono::Utc;
use is_terminal::IsTerminal;
use log::{debug, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use blackline_core::marker::live_glyph_count;
use blackline_core::status::{confirm_reset, FixedAnswer};
use blackline_core::{
    export_document, list_markers, load_document, AuditAction, AuditLog, AuditRecord, BlacklineConfig,
    ConfirmationGate, EditorState, ExportConfig, MarkupFileConverter, RegexEngine, StatusMessage,
};

use crate::cli::SessionCommand;
use crate::commands::build_config;
use crate::commands::redact::write_export;
use crate::ui::output_format::{paint, print_error_message, print_status};
use crate::ui::redaction_summary::{candidate_table, marker_table, print_summary};
use crate::ui::theme::{ThemeEntry, ThemeMap};

const HELP: &str = "\
Commands:
  load FILE               load a converted document (.html, .htm, .xhtml)
  detect                  find redaction candidates
  list                    list candidates
  accept N                redact every occurrence of candidate N
  reject N                drop candidate N
  redact START END TEXT   redact characters START..END of the text (TEXT must match)
  undo                    undo the last redaction
  reset                   clear all redactions (asks for confirmation)
  show                    print the document text and counters
  markers                 list redaction markers
  summary                 print the redaction summary
  status                  repeat the last status message if still current
  export [DIR]            export the redacted document
  help                    show this help
  quit                    end the session";

/// One parsed session command. Candidate numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Load(PathBuf),
    Detect,
    List,
    Accept(usize),
    Reject(usize),
    Redact { start: usize, end: usize, text: String },
    Undo,
    Reset,
    Show,
    Markers,
    Summary,
    Status,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("Unknown command '{0}'. Type `help` for a list of commands.")]
    Unknown(String),

    #[error("`{command}` needs a {argument}.")]
    MissingArgument { command: &'static str, argument: &'static str },

    #[error("'{value}' is not a valid {argument}.")]
    InvalidNumber { argument: &'static str, value: String },
}

fn parse_number(value: Option<&str>, command: &'static str, argument: &'static str) -> Result<usize, ParseCommandError> {
    let value = value.ok_or(ParseCommandError::MissingArgument { command, argument })?;
    value
        .parse()
        .map_err(|_| ParseCommandError::InvalidNumber { argument, value: value.to_string() })
}

fn parse_candidate_number(value: Option<&str>, command: &'static str) -> Result<usize, ParseCommandError> {
    let n = parse_number(value, command, "candidate number")?;
    if n == 0 {
        return Err(ParseCommandError::InvalidNumber { argument: "candidate number (numbers start at 1)", value: "0".into() });
    }
    Ok(n)
}

impl FromStr for SessionAction {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim_start();
        let mut args = rest.split_whitespace();

        match word.to_ascii_lowercase().as_str() {
            "load" => match rest {
                "" => Err(ParseCommandError::MissingArgument { command: "load", argument: "file path" }),
                path => Ok(SessionAction::Load(PathBuf::from(path))),
            },
            "detect" => Ok(SessionAction::Detect),
            "list" => Ok(SessionAction::List),
            "accept" => Ok(SessionAction::Accept(parse_candidate_number(args.next(), "accept")?)),
            "reject" => Ok(SessionAction::Reject(parse_candidate_number(args.next(), "reject")?)),
            "redact" => {
                let start = parse_number(args.next(), "redact", "start offset")?;
                let end = parse_number(args.next(), "redact", "end offset")?;
                // TEXT is everything after the two offsets, spaces included.
                let text = rest
                    .split_once(char::is_whitespace)
                    .and_then(|(_, r)| r.trim_start().split_once(char::is_whitespace))
                    .map(|(_, t)| t.trim())
                    .unwrap_or_default();
                if text.is_empty() {
                    return Err(ParseCommandError::MissingArgument { command: "redact", argument: "selected text" });
                }
                Ok(SessionAction::Redact { start, end, text: text.to_string() })
            }
            "undo" => Ok(SessionAction::Undo),
            "reset" => Ok(SessionAction::Reset),
            "show" => Ok(SessionAction::Show),
            "markers" => Ok(SessionAction::Markers),
            "summary" => Ok(SessionAction::Summary),
            "status" => Ok(SessionAction::Status),
            "export" => Ok(SessionAction::Export((!rest.is_empty()).then(|| PathBuf::from(rest)))),
            "help" | "?" => Ok(SessionAction::Help),
            "quit" | "exit" => Ok(SessionAction::Quit),
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Asks on the session's own input and output streams.
struct PromptGate<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
    theme_map: &'a ThemeMap,
    supports_color: bool,
}

impl<R: BufRead, W: Write> ConfirmationGate for PromptGate<'_, R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        let question = format!("{} [y/N] ", prompt);
        if write!(self.output, "{}", paint(&question, ThemeEntry::Prompt, self.theme_map, self.supports_color)).is_err()
            || self.output.flush().is_err()
        {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }
}

/// Settings a session is created with.
pub struct SessionOptions {
    pub output_dir: PathBuf,
    pub assume_yes: bool,
    pub interactive: bool,
    pub supports_color: bool,
}

pub struct Session {
    state: EditorState,
    engine: RegexEngine,
    export_config: ExportConfig,
    options: SessionOptions,
    audit: Option<AuditLog>,
    status: Option<StatusMessage>,
    theme_map: ThemeMap,
}

impl Session {
    pub fn new(config: BlacklineConfig, theme_map: ThemeMap, options: SessionOptions, audit: Option<AuditLog>) -> Result<Self> {
        let export_config = config.export.clone();
        Ok(Self {
            state: EditorState::new(),
            engine: RegexEngine::new(config)?,
            export_config,
            options,
            audit,
            status: None,
            theme_map,
        })
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    fn report<W: Write>(&mut self, output: &mut W, status: StatusMessage) -> Result<()> {
        print_status(output, &status, &self.theme_map, self.options.supports_color)?;
        self.status = Some(status);
        Ok(())
    }

    fn audit(&mut self, record: AuditRecord) {
        if let Some(log) = self.audit.as_mut() {
            if let Err(e) = log.append(&record) {
                warn!("Failed to write audit record: {}", e);
            }
        }
    }

    /// Runs one command. Only I/O failures on the session's own streams are errors;
    /// everything else becomes a status message.
    pub async fn execute<R: BufRead, W: Write>(&mut self, action: SessionAction, input: &mut R, output: &mut W) -> Result<Flow> {
        debug!("Session command: {:?}", action);
        let source = self.state.source_filename().to_string();
        let color = self.options.supports_color;

        let status = match action {
            SessionAction::Load(path) => self.load(&path).await,
            SessionAction::Detect => match self.state.detect_candidates(&self.engine) {
                Ok(next) => {
                    self.state = next;
                    StatusMessage::info(format!("Found {} candidate(s).", self.state.candidates().len()))
                }
                Err(e) => StatusMessage::from(&e),
            },
            SessionAction::List => {
                if self.state.candidates().is_empty() {
                    StatusMessage::info("No candidates. Run `detect` first.")
                } else {
                    writeln!(output, "{}", candidate_table(self.state.candidates()))?;
                    return Ok(Flow::Continue);
                }
            }
            SessionAction::Accept(n) => {
                let candidate = self.state.candidates().get(n - 1).cloned();
                match (self.state.apply_candidate_redaction(n - 1), candidate) {
                    (Ok(next), Some(candidate)) => {
                        let applied = next.redaction_count() > self.state.redaction_count();
                        self.state = next;
                        if applied {
                            let glyphs = live_glyph_count(candidate.text.chars().count());
                            self.audit(AuditRecord::redaction(
                                &source,
                                AuditAction::CandidateAccepted,
                                Some(candidate.category),
                                glyphs,
                                &candidate.text,
                            ));
                            StatusMessage::success(format!("Redacted {} candidate #{}.", candidate.category, n))
                        } else {
                            StatusMessage::info(format!("Candidate #{} no longer occurs in the document; dropped.", n))
                        }
                    }
                    (Err(e), _) => StatusMessage::from(&e),
                    (Ok(next), None) => {
                        self.state = next;
                        StatusMessage::info("Nothing to accept.")
                    }
                }
            }
            SessionAction::Reject(n) => {
                let candidate = self.state.candidates().get(n - 1).cloned();
                match self.state.reject_candidate(n - 1) {
                    Ok(next) => {
                        self.state = next;
                        if let Some(candidate) = candidate {
                            self.audit(AuditRecord::redaction(
                                &source,
                                AuditAction::CandidateRejected,
                                Some(candidate.category),
                                0,
                                &candidate.text,
                            ));
                        }
                        StatusMessage::info(format!("Rejected candidate #{}.", n))
                    }
                    Err(e) => StatusMessage::from(&e),
                }
            }
            SessionAction::Redact { start, end, text } => match self.state.apply_manual_redaction(&text, start..end) {
                Ok(next) => {
                    let applied = next.redaction_count() > self.state.redaction_count();
                    self.state = next;
                    if applied {
                        let glyphs = live_glyph_count(text.trim().chars().count());
                        self.audit(AuditRecord::redaction(&source, AuditAction::ManualRedaction, None, glyphs, &text));
                        StatusMessage::success(format!("Redacted characters {}..{}.", start, end))
                    } else {
                        StatusMessage::info("Nothing to redact.")
                    }
                }
                Err(e) => StatusMessage::from(&e),
            },
            SessionAction::Undo => {
                if self.state.history_depth() == 0 {
                    StatusMessage::info("Nothing to undo.")
                } else {
                    self.state = self.state.undo();
                    self.audit(AuditRecord::event(&source, AuditAction::Undo));
                    StatusMessage::success("Undid the last redaction.")
                }
            }
            SessionAction::Reset => {
                if !self.state.is_loaded() {
                    StatusMessage::info("No document is loaded.")
                } else {
                    let (next, confirmed) = if self.options.assume_yes {
                        confirm_reset(&self.state, &mut FixedAnswer(true))
                    } else {
                        let mut gate = PromptGate {
                            input: &mut *input,
                            output: &mut *output,
                            theme_map: &self.theme_map,
                            supports_color: color,
                        };
                        confirm_reset(&self.state, &mut gate)
                    };
                    self.state = next;
                    if confirmed {
                        self.audit(AuditRecord::event(&source, AuditAction::Reset));
                        StatusMessage::success("All redactions cleared.")
                    } else {
                        StatusMessage::info("Reset cancelled.")
                    }
                }
            }
            SessionAction::Show => {
                self.show(output)?;
                return Ok(Flow::Continue);
            }
            SessionAction::Markers => {
                let markers = self.state.current().map(list_markers).unwrap_or_default();
                if markers.is_empty() {
                    StatusMessage::info("No redaction markers.")
                } else {
                    writeln!(output, "{}", marker_table(&markers))?;
                    return Ok(Flow::Continue);
                }
            }
            SessionAction::Summary => {
                print_summary(&self.state.summary(), output, &self.theme_map, color)?;
                return Ok(Flow::Continue);
            }
            SessionAction::Status => {
                match self.status.as_ref().filter(|s| !s.is_expired(Utc::now())) {
                    Some(status) => print_status(output, status, &self.theme_map, color)?,
                    None => writeln!(output, "No recent status.")?,
                }
                return Ok(Flow::Continue);
            }
            SessionAction::Export(dir) => self.export(dir.as_deref()),
            SessionAction::Help => {
                writeln!(output, "{}", HELP)?;
                return Ok(Flow::Continue);
            }
            SessionAction::Quit => return Ok(Flow::Quit),
        };

        self.report(output, status)?;
        Ok(Flow::Continue)
    }

    async fn load(&mut self, path: &Path) -> StatusMessage {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => return StatusMessage::error(format!("Failed to read {}: {}", path.display(), e)),
        };
        let upload_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match load_document(&self.state, &MarkupFileConverter, &upload_name, &bytes).await {
            Ok(next) => {
                self.state = next;
                let source = self.state.source_filename().to_string();
                self.audit(AuditRecord::event(&source, AuditAction::Load));
                StatusMessage::success(format!("Loaded '{}'. Run `detect` to find candidates.", upload_name))
            }
            Err(e) => StatusMessage::error(format!("{} Please try again.", e)),
        }
    }

    fn export(&mut self, dir: Option<&Path>) -> StatusMessage {
        let file = match export_document(&self.state, &self.export_config) {
            Ok(file) => file,
            Err(e) => return StatusMessage::from(&e),
        };
        let dir = dir.unwrap_or(&self.options.output_dir).to_path_buf();
        match write_export(&file, &dir) {
            Ok(path) => {
                let source = self.state.source_filename().to_string();
                self.audit(AuditRecord::event(&source, AuditAction::Export));
                StatusMessage::success(format!("Exported to {}. The file opens in Microsoft Word.", path.display()))
            }
            Err(e) => StatusMessage::error(format!("{:#}", e)),
        }
    }

    fn show<W: Write>(&self, output: &mut W) -> Result<()> {
        if !self.state.is_loaded() {
            writeln!(output, "No document is loaded.")?;
            return Ok(());
        }
        writeln!(output, "{}", paint("Document:", ThemeEntry::Header, &self.theme_map, self.options.supports_color))?;
        writeln!(output, "{}", self.state.current_text().trim_end())?;
        writeln!(
            output,
            "Redactions: {} | Undo depth: {} | Candidates: {}",
            self.state.redaction_count(),
            self.state.history_depth(),
            self.state.candidates().len()
        )?;
        Ok(())
    }
}

/// Reads commands from `input` until end of input or `quit`.
pub async fn run_session_loop<R: BufRead, W: Write>(session: &mut Session, input: &mut R, output: &mut W) -> Result<()> {
    let mut line = String::new();
    loop {
        if session.options.interactive {
            write!(output, "blackline> ")?;
            output.flush()?;
        }
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match trimmed.parse::<SessionAction>() {
            Ok(action) => {
                if session.execute(action, input, output).await? == Flow::Quit {
                    break;
                }
            }
            Err(e) => print_error_message(output, &e.to_string(), &session.theme_map, session.options.supports_color)?,
        }
    }
    Ok(())
}

pub async fn run_session(cmd: SessionCommand, theme_map: ThemeMap) -> Result<()> {
    let config = build_config(&cmd.rules)?;
    let audit = match &cmd.audit_log {
        Some(path) => Some(AuditLog::open(path).with_context(|| format!("Failed to open audit log {}", path.display()))?),
        None => None,
    };
    let stdout = io::stdout();
    let options = SessionOptions {
        output_dir: cmd.output_dir.clone(),
        assume_yes: cmd.yes,
        interactive: cmd.script.is_none() && io::stdin().is_terminal(),
        supports_color: stdout.is_terminal(),
    };
    let mut session = Session::new(config, theme_map, options, audit)?;
    let mut output = stdout.lock();

    match &cmd.script {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to open script {}", path.display()))?;
            let mut input = BufReader::new(file);
            preload(&mut session, cmd.input_file.as_deref(), &mut input, &mut output).await?;
            run_session_loop(&mut session, &mut input, &mut output).await
        }
        None => {
            let mut input = io::stdin().lock();
            preload(&mut session, cmd.input_file.as_deref(), &mut input, &mut output).await?;
            run_session_loop(&mut session, &mut input, &mut output).await
        }
    }
}

async fn preload<R: BufRead, W: Write>(session: &mut Session, path: Option<&Path>, input: &mut R, output: &mut W) -> Result<()> {
    if let Some(path) = path {
        session.execute(SessionAction::Load(path.to_path_buf()), input, output).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeStyle;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!("accept 2".parse::<SessionAction>(), Ok(SessionAction::Accept(2)));
        assert_eq!("  LIST ".parse::<SessionAction>(), Ok(SessionAction::List));
        assert_eq!(
            "redact 5 17 555-123-4567".parse(),
            Ok(SessionAction::Redact { start: 5, end: 17, text: "555-123-4567".into() })
        );
        assert_eq!(
            "redact 0 10 John  Smith".parse(),
            Ok(SessionAction::Redact { start: 0, end: 10, text: "John  Smith".into() })
        );
        assert_eq!("export".parse::<SessionAction>(), Ok(SessionAction::Export(None)));
        assert_eq!("export out dir".parse::<SessionAction>(), Ok(SessionAction::Export(Some(PathBuf::from("out dir")))));
        assert_eq!("load my file.html".parse::<SessionAction>(), Ok(SessionAction::Load(PathBuf::from("my file.html"))));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(matches!("accept".parse::<SessionAction>(), Err(ParseCommandError::MissingArgument { .. })));
        assert!(matches!("accept zero".parse::<SessionAction>(), Err(ParseCommandError::InvalidNumber { .. })));
        assert!(matches!("accept 0".parse::<SessionAction>(), Err(ParseCommandError::InvalidNumber { .. })));
        assert!(matches!("redact 1 2".parse::<SessionAction>(), Err(ParseCommandError::MissingArgument { .. })));
        assert_eq!("frobnicate".parse::<SessionAction>(), Err(ParseCommandError::Unknown("frobnicate".into())));
    }

    fn session(dir: &Path) -> Session {
        let options = SessionOptions {
            output_dir: dir.to_path_buf(),
            assume_yes: false,
            interactive: false,
            supports_color: false,
        };
        Session::new(BlacklineConfig::load_default_rules().unwrap(), ThemeStyle::default_theme_map(), options, None).unwrap()
    }

    async fn run_script(session: &mut Session, script: &str) -> String {
        let mut input = io::Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        run_session_loop(session, &mut input, &mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn scripted_session_redacts_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("memo.html");
        std::fs::write(&doc, "<p>Contact John Smith at john.smith@example.com or 555-123-4567.</p>").unwrap();

        let mut session = session(dir.path());
        let script = format!("load {}\ndetect\naccept 1\nredact 34 46 555-123-4567\nundo\nexport\n", doc.display());
        let out = run_script(&mut session, &script).await;

        assert!(out.contains("Found 3 candidate(s)."), "{}", out);
        assert!(out.contains("Redacted Email candidate #1."), "{}", out);
        assert_eq!(session.state().redaction_count(), 1);
        assert_eq!(session.state().candidates().len(), 2);
        assert!(dir.path().join("memo_redacted.doc").is_file());
    }

    #[tokio::test]
    async fn declined_reset_keeps_redactions() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("a.html");
        std::fs::write(&doc, "<p>one two</p>").unwrap();

        let mut session = session(dir.path());
        let out = run_script(&mut session, &format!("load {}\nredact 0 3 one\nreset\nno\nreset\ny\n", doc.display())).await;

        assert!(out.contains("Reset cancelled."), "{}", out);
        assert!(out.contains("All redactions cleared."), "{}", out);
        assert_eq!(session.state().redaction_count(), 0);
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("a.html");
        std::fs::write(&doc, "<p>kept</p>").unwrap();
        let bad = dir.path().join("b.docx");
        std::fs::write(&bad, b"PK\x03\x04").unwrap();

        let mut session = session(dir.path());
        let out = run_script(&mut session, &format!("load {}\nload {}\n", doc.display(), bad.display())).await;

        assert!(out.contains("[error] Document conversion failed: Unsupported file type 'docx'"), "{}", out);
        assert_eq!(session.state().current(), Some("<p>kept</p>"));
    }

    #[tokio::test]
    async fn errors_are_reported_and_session_continues() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        let out = run_script(&mut session, "export\naccept 3\nbogus\nundo\nquit\nshow\n").await;

        assert!(out.contains("[error] No document to export"), "{}", out);
        assert!(out.contains("[error] Candidate index 2 is out of range (0 candidates)"), "{}", out);
        assert!(out.contains("Unknown command 'bogus'"), "{}", out);
        assert!(out.contains("[info] Nothing to undo."), "{}", out);
        assert!(!out.contains("No document is loaded."), "commands after quit must not run: {}", out);
    }
}
