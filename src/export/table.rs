use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde::Serialize;

use crate::error::{HarnessError, Result};
use crate::export::normalize::{cells_equivalent, normalize_cell, normalize_header};

/// A header row plus data rows, as rendered on a page or read from an export.
///
/// Headers are lowercased and trimmed, cells are trimmed, and rows whose cells
/// are all empty are dropped, so tables from different sources compare
/// directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Table {
            headers: headers.iter().map(|h| normalize_header(h)).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.iter().map(|c| normalize_cell(c)).collect::<Vec<_>>())
                .filter(|row| row.iter().any(|c| !c.is_empty()))
                .collect(),
        }
    }

    /// First row as headers, the rest as data.
    pub fn from_grid(mut grid: Vec<Vec<String>>) -> Self {
        if grid.is_empty() {
            return Table::default();
        }
        let headers = grid.remove(0);
        Table::new(headers, grid)
    }

    /// First worksheet of an xlsx/xls/ods workbook.
    pub fn from_xlsx(path: &Path) -> Result<Self> {
        let decode = |reason: String| HarnessError::Decode {
            format: "spreadsheet".into(),
            path: path.to_path_buf(),
            reason,
        };
        if !path.exists() {
            return Err(HarnessError::ArtifactMissing {
                path: path.to_path_buf(),
                waited_ms: 0,
            });
        }
        let mut workbook = open_workbook_auto(path).map_err(|e| decode(e.to_string()))?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| decode("workbook has no sheets".into()))?;
        let range = workbook.worksheet_range(&sheet).map_err(|e| decode(e.to_string()))?;
        let grid: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        Ok(Table::from_grid(grid))
    }

    pub fn from_csv(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HarnessError::ArtifactMissing {
                    path: path.to_path_buf(),
                    waited_ms: 0,
                }
            } else {
                e.into()
            }
        })?;
        Self::from_csv_reader(file).map_err(|e| match e {
            HarnessError::Decode { format, reason, .. } => HarnessError::Decode {
                format,
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse CSV from any reader. Ragged rows are accepted as-is.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let decode = |e: csv::Error| HarnessError::Decode {
            format: "csv".into(),
            path: Default::default(),
            reason: e.to_string(),
        };
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(decode)?
            .iter()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        for record in csv_reader.records() {
            rows.push(record.map_err(decode)?.iter().map(str::to_string).collect());
        }
        Ok(Table::new(headers, rows))
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        let wanted = normalize_header(name);
        self.headers.iter().position(|h| *h == wanted)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column(column)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Index of the first row whose named columns hold the expected values.
    /// Returns `None` when a named column does not exist.
    pub fn find_row(&self, expected: &[(&str, &str)]) -> Option<usize> {
        let columns: Vec<(usize, &str)> = expected
            .iter()
            .map(|(name, value)| self.column(name).map(|c| (c, *value)))
            .collect::<Option<_>>()?;
        self.rows.iter().position(|row| {
            columns
                .iter()
                .all(|(c, value)| row.get(*c).is_some_and(|cell| cells_equivalent(cell, value)))
        })
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
