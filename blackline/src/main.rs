// blackline/src/main.rs
//! Blackline entry point.
//!
//! Parses arguments, sets up logging and the output theme, then dispatches to
//! the selected command.

use anyhow::{Context, Result};
use clap::Parser;

use blackline::cli::{Cli, Commands};
use blackline::commands::{error_msg, redact, scan, session};
use blackline::logger;
use blackline::ui::theme::build_theme_map;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init_logger(logger::resolve_level(cli.quiet, cli.debug, cli.disable_debug));

    if let Err(e) = run(cli).await {
        let theme_map = blackline::ui::theme::ThemeStyle::default_theme_map();
        error_msg(format!("{:#}", e), &theme_map);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let theme_map = build_theme_map(cli.theme.as_ref()).context("Theme error")?;

    match cli.command {
        Commands::Scan(cmd) => scan::run_scan(cmd, &theme_map, cli.quiet).await,
        Commands::Redact(cmd) => redact::run_redact(cmd, &theme_map, cli.quiet).await,
        Commands::Session(cmd) => session::run_session(cmd, theme_map).await,
    }
}
