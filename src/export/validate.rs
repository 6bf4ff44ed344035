use tracing::info;

use crate::error::{HarnessError, Result};
use crate::export::document::DocumentText;
use crate::export::normalize::cells_equivalent;
use crate::export::table::Table;

/// The row just entered in the UI must come back out of the export.
///
/// Every named column must exist in the export's headers, and some row must
/// hold every expected value (case-, whitespace- and number-format
/// insensitive). Returns the matching row's index.
pub fn verify_row_round_trip(exported: &Table, expected: &[(&str, &str)]) -> Result<usize> {
    if let Some((column, _)) = expected.iter().find(|(name, _)| exported.column(name).is_none()) {
        return Err(HarnessError::mismatch(
            "export headers",
            format!("a {:?} column", column),
            exported.headers.join(", "),
        ));
    }
    match exported.find_row(expected) {
        Some(index) => {
            info!(row = index, rows = exported.rows.len(), "row found in export");
            Ok(index)
        }
        None => Err(HarnessError::mismatch(
            "exported row",
            describe_row(expected),
            format!("no matching row among {} rows", exported.rows.len()),
        )),
    }
}

/// Every value must appear in the document text.
pub fn verify_document_contains(document: &DocumentText, values: &[&str]) -> Result<()> {
    let missing = document.missing(values);
    if missing.is_empty() {
        info!(values = values.len(), "document contains all expected values");
        return Ok(());
    }
    Err(HarnessError::mismatch(
        "document text",
        format!("to contain {:?}", missing),
        document.excerpt(200),
    ))
}

/// The export must carry the same headers and rows as the rendered table.
pub fn verify_tables_match(rendered: &Table, exported: &Table) -> Result<()> {
    if rendered.headers != exported.headers {
        return Err(HarnessError::mismatch(
            "export headers",
            rendered.headers.join(", "),
            exported.headers.join(", "),
        ));
    }
    if rendered.rows.len() != exported.rows.len() {
        return Err(HarnessError::mismatch(
            "export row count",
            rendered.rows.len(),
            exported.rows.len(),
        ));
    }
    for (r, (want, got)) in rendered.rows.iter().zip(&exported.rows).enumerate() {
        for (c, header) in rendered.headers.iter().enumerate() {
            let want_cell = want.get(c).map(String::as_str).unwrap_or_default();
            let got_cell = got.get(c).map(String::as_str).unwrap_or_default();
            if !cells_equivalent(want_cell, got_cell) {
                return Err(HarnessError::mismatch(
                    format!("export row {} column {:?}", r + 1, header),
                    want_cell,
                    got_cell,
                ));
            }
        }
    }
    info!(rows = rendered.rows.len(), "export matches rendered table");
    Ok(())
}

fn describe_row(expected: &[(&str, &str)]) -> String {
    expected
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}
