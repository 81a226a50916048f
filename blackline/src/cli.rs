// blackline/src/cli.rs
//! This file defines the command-line interface (CLI) for the blackline application,
//! including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use blackline_core::Category;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "blackline",
    author = "Blackline Contributors",
    version = env!("CARGO_PKG_VERSION"),
    about = "Redact converted documents: detect, mark, undo and export",
    long_about = "Blackline is a redaction editor for documents that have already been converted to HTML markup. It detects likely personal data (emails, phone numbers, SSNs, dates, names), replaces approved spans with opaque block-glyph markers, keeps an undo history, and exports a redacted copy that Microsoft Word opens.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Explicitly disable debug logging, even if RUST_LOG is set to DEBUG
    #[arg(long = "disable-debug", global = true, help = "Disable debug logging, overriding RUST_LOG.")]
    pub disable_debug: bool,

    /// Specify the path to a custom YAML theme file.
    #[arg(long = "theme", value_name = "FILE", global = true, help = "Specify the path to a custom YAML theme file.")]
    pub theme: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `blackline` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lists redaction candidates without changing anything.
    #[command(about = "Detects redaction candidates in a document and lists them.")]
    Scan(ScanCommand),

    /// Accepts every candidate of the selected categories and exports the result.
    #[command(about = "Redacts every detected candidate and exports a Word-compatible copy.")]
    Redact(RedactCommand),

    /// Runs a line-oriented editing session.
    #[command(about = "Starts an interactive (or scripted) redaction session.")]
    Session(SessionCommand),
}

/// Rule selection shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct RuleArgs {
    /// Path to a custom rule configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", env = "BLACKLINE_CONFIG", help = "Path to a custom rule configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// Explicitly enable these rule names (comma-separated), including opt-in rules.
    #[arg(long, short = 'e', value_delimiter = ',', help = "Enable these rule names (comma-separated), including opt-in rules.")]
    pub enable: Vec<String>,

    /// Explicitly disable these rule names (comma-separated).
    #[arg(long, short = 'x', value_delimiter = ',', help = "Disable these rule names (comma-separated).")]
    pub disable: Vec<String>,
}

/// Arguments for the `scan` command.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Path to the converted document (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read the document from a file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    #[command(flatten)]
    pub rules: RuleArgs,

    /// Exit with a non-zero code if the number of candidates exceeds this threshold.
    #[arg(long = "fail-over-threshold", value_name = "N", help = "Exit with a non-zero code if the number of candidates exceeds N.")]
    pub fail_over_threshold: Option<usize>,

    /// Export the candidate list to a JSON file.
    #[arg(long = "json-file", value_name = "FILE", help = "Write the candidate list to a JSON file.")]
    pub json_file: Option<PathBuf>,

    /// Print the candidate list as JSON to stdout.
    #[arg(long = "json-stdout", conflicts_with = "json_file", help = "Print the candidate list as JSON to stdout.")]
    pub json_stdout: bool,
}

/// Arguments for the `redact` command.
#[derive(Parser, Debug)]
pub struct RedactCommand {
    /// Path to the converted document (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read the document from a file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    #[command(flatten)]
    pub rules: RuleArgs,

    /// Only accept candidates of these categories (comma-separated); others are rejected.
    #[arg(long = "categories", short = 'c', value_delimiter = ',', value_name = "CATEGORY", help = "Only accept candidates of these categories (email, phone, ssn, date, name).")]
    pub categories: Vec<Category>,

    /// Directory the exported `.doc` is written to.
    #[arg(long = "output-dir", short = 'o', value_name = "DIR", default_value = ".", help = "Directory for the exported document.")]
    pub output_dir: PathBuf,

    /// Show a diff of the plain text before and after redaction.
    #[arg(long, short = 'D', help = "Show a diff of the document text before and after redaction.")]
    pub diff: bool,

    /// Append audit records (JSON lines) to this file.
    #[arg(long = "audit-log", value_name = "FILE", help = "Append audit records (JSON lines) to this file.")]
    pub audit_log: Option<PathBuf>,

    /// Suppress the redaction summary.
    #[arg(long = "no-redaction-summary", help = "Suppress the redaction summary.")]
    pub no_summary: bool,
}

/// Arguments for the `session` command.
#[derive(Parser, Debug)]
pub struct SessionCommand {
    /// Document to load before the first command.
    #[arg(long, short = 'i', value_name = "FILE", help = "Load this document before reading commands.")]
    pub input_file: Option<PathBuf>,

    #[command(flatten)]
    pub rules: RuleArgs,

    /// Read commands from this file instead of stdin.
    #[arg(long = "script", value_name = "FILE", help = "Read session commands from a file instead of stdin.")]
    pub script: Option<PathBuf>,

    /// Answer yes to confirmation prompts.
    #[arg(long, short = 'y', help = "Answer yes to confirmation prompts (e.g. reset).")]
    pub yes: bool,

    /// Directory used by `export` when none is given.
    #[arg(long = "output-dir", short = 'o', value_name = "DIR", default_value = ".", help = "Default directory for `export`.")]
    pub output_dir: PathBuf,

    /// Append audit records (JSON lines) to this file.
    #[arg(long = "audit-log", value_name = "FILE", help = "Append audit records (JSON lines) to this file.")]
    pub audit_log: Option<PathBuf>,
}
