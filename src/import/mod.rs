use anyhow::{Context, Result};
use std::path::Path;

use crate::db::Database;
use crate::format::{parse_amount_cents, parse_date_iso};
use crate::models::Expense;

/// Expected CSV header, in order.
const EXPECTED_HEADER: [&str; 4] = ["spent_date", "amount", "category", "comment"];

#[derive(Debug)]
pub(crate) struct SkippedRow {
    /// 1-based line number in the file (line 1 is the header).
    pub(crate) line: usize,
    pub(crate) reason: String,
}

#[derive(Debug)]
pub(crate) struct ImportOutcome {
    pub(crate) imported: usize,
    pub(crate) skipped: Vec<SkippedRow>,
}

/// Import expenses from a CSV with columns
/// `spent_date,amount,category,comment`.
///
/// Rows are validated before anything is written: bad dates, bad amounts,
/// and unknown category names are skipped with a line-numbered reason
/// rather than aborting the import or inventing categories. Everything
/// that survives validation is inserted in a single transaction.
pub(crate) fn import_expenses(
    db: &mut Database,
    path: &Path,
    created_at: &str,
) -> Result<ImportOutcome> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers != EXPECTED_HEADER {
        anyhow::bail!(
            "CSV header mismatch.\nExpected: {}\nGot: {}",
            EXPECTED_HEADER.join(","),
            headers.join(",")
        );
    }

    let mut expenses: Vec<Expense> = Vec::new();
    let mut skipped: Vec<SkippedRow> = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let line = i + 2; // line after the header
        let record = result.with_context(|| format!("Failed to read CSV record at line {line}"))?;

        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
        let date_text = field(0);
        let amount_text = field(1);
        let category_name = field(2);
        let comment = field(3);

        let Some(date) = parse_date_iso(&date_text) else {
            skipped.push(SkippedRow {
                line,
                reason: format!("Bad date {date_text:?}"),
            });
            continue;
        };

        let amount_cents = match parse_amount_cents(&amount_text) {
            Some(c) if c > 0 => c,
            _ => {
                skipped.push(SkippedRow {
                    line,
                    reason: format!("Bad amount {amount_text:?}"),
                });
                continue;
            }
        };

        // Unknown categories are not created on the fly; the user decides.
        let Some(category) = db.find_active_category_by_name(&category_name)? else {
            skipped.push(SkippedRow {
                line,
                reason: format!("Unknown category {category_name:?}"),
            });
            continue;
        };
        let Some(category_id) = category.id else {
            continue;
        };

        let mut expense = Expense::new(
            amount_cents,
            category_id,
            crate::month::date_str(date),
            created_at.to_string(),
        );
        if !comment.is_empty() {
            expense.comment = Some(comment);
        }
        expenses.push(expense);
    }

    let imported = db.insert_expenses_batch(&expenses)?;
    Ok(ImportOutcome { imported, skipped })
}

/// Export expenses (optionally one `YYYY-MM` month) to a CSV readable by
/// `import_expenses`. Amounts are written as decimal units with two
/// fraction digits.
pub(crate) fn export_expenses(db: &Database, path: &Path, month: Option<&str>) -> Result<usize> {
    let rows = db.get_expenses_with_category(month)?;

    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    wtr.write_record(EXPECTED_HEADER)
        .context("Failed to write CSV header")?;

    for (expense, category_name) in &rows {
        let amount = format!(
            "{}.{:02}",
            expense.amount_cents / 100,
            expense.amount_cents % 100
        );
        wtr.write_record([
            expense.spent_date.as_str(),
            amount.as_str(),
            category_name.as_str(),
            expense.comment.as_deref().unwrap_or(""),
        ])?;
    }
    wtr.flush().context("Failed to write CSV file")?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests;
