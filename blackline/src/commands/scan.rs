// blackline/src/commands/scan.rs
//! `scan`: detect candidates and report them without redacting.

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use log::info;
use serde::Serialize;
use std::io::{self, Write};

use blackline_core::{Candidate, Category, RegexEngine};

use crate::cli::ScanCommand;
use crate::commands::{build_config, info_msg, open_document};
use crate::ui::output_format::paint;
use crate::ui::redaction_summary::candidate_table;
use crate::ui::theme::{ThemeEntry, ThemeMap};

/// Machine-readable scan result.
#[derive(Debug, Serialize)]
pub struct ScanReport<'a> {
    pub source: &'a str,
    pub total: usize,
    pub by_category: Vec<(Category, usize)>,
    pub candidates: &'a [Candidate],
}

impl<'a> ScanReport<'a> {
    pub fn new(source: &'a str, candidates: &'a [Candidate]) -> Self {
        let by_category = Category::ALL
            .iter()
            .map(|c| (*c, candidates.iter().filter(|x| x.category == *c).count()))
            .filter(|(_, n)| *n > 0)
            .collect();
        Self { source, total: candidates.len(), by_category, candidates }
    }
}

pub async fn run_scan(cmd: ScanCommand, theme_map: &ThemeMap, quiet: bool) -> Result<()> {
    let config = build_config(&cmd.rules)?;
    let engine = RegexEngine::new(config)?;
    let state = open_document(cmd.input_file.as_deref()).await?.detect_candidates(&engine)?;
    let report = ScanReport::new(state.source_filename(), state.candidates());
    info!("Scan of '{}' found {} candidate(s).", report.source, report.total);

    if cmd.json_stdout {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else if let Some(path) = &cmd.json_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create JSON file {}", path.display()))?;
        serde_json::to_writer_pretty(file, &report)?;
        if !quiet {
            info_msg(format!("Scan report written to {}", path.display()), theme_map);
        }
    } else {
        print_report(&report, &mut io::stdout().lock(), theme_map, io::stdout().is_terminal())?;
    }

    if let Some(threshold) = cmd.fail_over_threshold {
        if report.total > threshold {
            bail!("Candidate count ({}) exceeds threshold ({}).", report.total, threshold);
        }
    }
    Ok(())
}

fn print_report<W: Write>(report: &ScanReport<'_>, writer: &mut W, theme_map: &ThemeMap, supports_color: bool) -> Result<()> {
    writeln!(writer, "{}", paint("Redaction Candidates:", ThemeEntry::Header, theme_map, supports_color))?;
    if report.candidates.is_empty() {
        writeln!(writer, "  No candidates found.")?;
        return Ok(());
    }
    writeln!(writer, "{}", candidate_table(report.candidates))?;
    for (category, count) in &report.by_category {
        writeln!(
            writer,
            "  {}: {}",
            paint(category.as_str(), ThemeEntry::SummaryCategory, theme_map, supports_color),
            paint(&count.to_string(), ThemeEntry::SummaryOccurrences, theme_map, supports_color)
        )?;
    }
    writeln!(writer, "  Total: {}", report.total)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_only_present_categories() {
        let candidates = vec![
            Candidate { text: "a@b.io".into(), category: Category::Email, position: 0 },
            Candidate { text: "c@d.io".into(), category: Category::Email, position: 10 },
            Candidate { text: "John Smith".into(), category: Category::Name, position: 20 },
        ];
        let report = ScanReport::new("memo", &candidates);
        assert_eq!(report.total, 3);
        assert_eq!(report.by_category, vec![(Category::Email, 2), (Category::Name, 1)]);
    }
}
