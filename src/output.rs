//! Rendering of search results for the command line

use crate::results::SearchResult;
use anyhow::Result;
use std::io::Write;

/// Column titles, in [`crate::results::Asset::fields`] order
pub const HEADERS: [&str; 4] = ["symbol", "name", "market", "last price"];

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated values with a header line
    #[default]
    Csv,
    /// Bordered text table
    Table,
    /// JSON array of assets
    Json,
}

/// Write `result` to `out` in the requested format
pub fn render<W: Write>(result: &SearchResult, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Csv => render_csv(result, out),
        OutputFormat::Table => render_table(result, out),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, result)?;
            writeln!(out)?;
            Ok(())
        }
    }
}

fn render_csv<W: Write>(result: &SearchResult, out: &mut W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADERS)?;
    for asset in result {
        writer.write_record(asset.fields())?;
    }
    writer.flush()?;
    Ok(())
}

/// Left and right borders, a rule under the header and under every row
fn render_table<W: Write>(result: &SearchResult, out: &mut W) -> Result<()> {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for asset in result {
        for (width, field) in widths.iter_mut().zip(asset.fields()) {
            *width = (*width).max(field.chars().count());
        }
    }

    let rule = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("|");
    let rule = format!("|{}|", rule);

    let header = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!(" {} ", center(&h.to_uppercase(), w)))
        .collect::<Vec<_>>()
        .join("|");
    writeln!(out, "|{}|", header)?;
    writeln!(out, "{}", rule)?;

    for asset in result {
        let row = asset
            .fields()
            .iter()
            .zip(widths)
            .map(|(field, w)| format!(" {} ", pad_right(field, w)))
            .collect::<Vec<_>>()
            .join("|");
        writeln!(out, "|{}|", row)?;
        writeln!(out, "{}", rule)?;
    }

    Ok(())
}

fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn center(text: &str, width: usize) -> String {
    let gap = width.saturating_sub(text.chars().count());
    let left = gap / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(gap - left))
}
