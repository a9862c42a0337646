//! Terminal display for report files.
//!
//! `print_issue_cards` renders every row of one issue as a vertical card
//! grouped into release, issue, custom field and match sections.
//! `print_rows` is the tabular view.

use arrow::array::{Array, StringArray};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use relscan_core::keyword::{MATCHED_COLUMN, MATCHED_KEYWORD};
use relscan_core::record::{DESCRIPTION_COLUMN, ISSUE_COLUMNS, RELEASE_COLUMNS};

const MATCH_COLUMNS: &[&str] = &[MATCHED_KEYWORD, MATCHED_COLUMN];
const DESCRIPTION_PREVIEW: usize = 1200;

/// Print each row whose `issue_key` equals `key` as a card.
pub fn print_issue_cards(batches: &[RecordBatch], key: &str) -> anyhow::Result<()> {
    let mut shown = 0;
    for batch in batches {
        let keys = batch
            .column_by_name("issue_key")
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| anyhow::anyhow!("file has no issue_key column"))?;
        for row in 0..batch.num_rows() {
            if !keys.is_null(row) && keys.value(row) == key {
                print_card(batch, row)?;
                shown += 1;
            }
        }
    }
    if shown == 0 {
        anyhow::bail!("issue {key} not found");
    }
    if shown > 1 {
        println!("({shown} rows for {key})");
    }
    Ok(())
}

/// Print up to `limit` rows as a table.
pub fn print_rows(batches: &[RecordBatch], limit: usize) -> anyhow::Result<()> {
    let total: usize = batches.iter().map(|b| b.num_rows()).sum();
    let mut remaining = limit;
    let mut slices = Vec::new();
    for batch in batches {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(batch.num_rows());
        slices.push(batch.slice(0, take));
        remaining -= take;
    }
    println!("{}", arrow::util::pretty::pretty_format_batches(&slices)?);
    if total > limit {
        println!("... {} of {} rows shown", limit, total);
    }
    Ok(())
}

fn print_card(batch: &RecordBatch, row: usize) -> anyhow::Result<()> {
    let key = cell(batch, "issue_key", row)?.unwrap_or_default();
    let summary = cell(batch, "summary", row)?.unwrap_or_default();
    println!("=== {key} ===");
    if !summary.is_empty() {
        println!("{summary}");
    }
    println!();

    let schema = batch.schema();
    let custom: Vec<&str> = schema
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .filter(|name| {
            !RELEASE_COLUMNS.contains(name)
                && !ISSUE_COLUMNS.contains(name)
                && !MATCH_COLUMNS.contains(name)
                && *name != DESCRIPTION_COLUMN
        })
        .collect();

    print_section(batch, row, "Match", MATCH_COLUMNS)?;
    print_section(batch, row, "Release", RELEASE_COLUMNS)?;
    print_section(batch, row, "Issue", ISSUE_COLUMNS)?;
    print_section(batch, row, "Custom Fields", &custom)?;

    if let Some(text) = cell(batch, DESCRIPTION_COLUMN, row)?
        && !text.trim().is_empty()
    {
        println!("Description");
        let mut preview: String = text.chars().take(DESCRIPTION_PREVIEW).collect();
        if text.chars().count() > DESCRIPTION_PREVIEW {
            preview.push_str("...");
        }
        for line in preview.lines() {
            println!("  {line}");
        }
        println!();
    }
    Ok(())
}

fn print_section(batch: &RecordBatch, row: usize, header: &str, cols: &[&str]) -> anyhow::Result<()> {
    let mut lines = Vec::new();
    for &col in cols {
        if let Some(value) = cell(batch, col, row)?
            && !value.is_empty()
        {
            lines.push(format!("  {:<26} {}", col, value));
        }
    }
    // Skip sections with nothing populated.
    if lines.is_empty() {
        return Ok(());
    }
    println!("{header}");
    for line in lines {
        println!("{line}");
    }
    println!();
    Ok(())
}

/// Display text of one cell, `None` when the column is absent or null.
fn cell(batch: &RecordBatch, col: &str, row: usize) -> anyhow::Result<Option<String>> {
    let Some(array) = batch.column_by_name(col) else {
        return Ok(None);
    };
    if array.is_null(row) {
        return Ok(None);
    }
    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(array.as_ref(), &options)?;
    Ok(Some(formatter.value(row).to_string()))
}
