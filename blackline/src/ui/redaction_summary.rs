// blackline/src/ui/redaction_summary.rs
//! Tabular output for candidates, markers and the redaction summary.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::io::{self, Write};

use blackline_core::{Candidate, MarkerRecord, RedactionSummary};

use crate::ui::output_format::paint;
use crate::ui::theme::{ThemeEntry, ThemeMap};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Candidates with 1-based numbers, as accepted by session commands.
pub fn candidate_table(candidates: &[Candidate]) -> Table {
    let mut table = new_table(vec!["#", "Category", "Text", "Position"]);
    for (i, candidate) in candidates.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            candidate.category.to_string(),
            candidate.text.clone(),
            candidate.position.to_string(),
        ]);
    }
    table
}

pub fn marker_table(markers: &[MarkerRecord]) -> Table {
    let mut table = new_table(vec!["#", "Glyphs", "Original"]);
    for (i, marker) in markers.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), marker.glyph_count.to_string(), marker.original_text.clone()]);
    }
    table
}

/// Prints per-category counts of the redaction actions currently applied.
pub fn print_summary<W: Write>(
    summary: &RedactionSummary,
    writer: &mut W,
    theme_map: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    writeln!(writer, "{}", paint("Redaction Summary:", ThemeEntry::Header, theme_map, supports_color))?;
    if summary.total == 0 {
        writeln!(writer, "  No redactions applied.")?;
        return Ok(());
    }

    let mut rows: Vec<(String, usize)> = summary
        .by_category
        .iter()
        .map(|(category, count)| (category.to_string(), *count))
        .collect();
    if summary.manual > 0 {
        rows.push(("Manual".to_string(), summary.manual));
    }
    for (label, count) in rows {
        writeln!(
            writer,
            "  {}: {} action(s)",
            paint(&label, ThemeEntry::SummaryCategory, theme_map, supports_color),
            paint(&count.to_string(), ThemeEntry::SummaryOccurrences, theme_map, supports_color)
        )?;
    }
    writeln!(writer, "  Total: {}", summary.total)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeStyle;
    use blackline_core::Category;

    #[test]
    fn summary_lists_categories_then_manual() {
        let mut summary = RedactionSummary { manual: 2, total: 3, ..Default::default() };
        summary.by_category.insert(Category::Phone, 1);
        let mut out = Vec::new();
        print_summary(&summary, &mut out, &ThemeStyle::default_theme_map(), false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Redaction Summary:\n  Phone: 1 action(s)\n  Manual: 2 action(s)\n  Total: 3\n"
        );
    }

    #[test]
    fn candidate_table_numbers_from_one() {
        let table = candidate_table(&[Candidate {
            text: "a@b.io".to_string(),
            category: Category::Email,
            position: 4,
        }]);
        let rendered = table.to_string();
        assert!(rendered.contains("a@b.io"));
        assert!(rendered.contains("Email"));
        assert!(rendered.contains(" 1 "));
    }
}
