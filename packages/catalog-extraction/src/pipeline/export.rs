//! Result export: records to a single-sheet xlsx workbook.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use rust_xlsxwriter::{Format, Workbook};
use tracing::{info, warn};

use crate::error::{ExportError, ExportResult};
use crate::types::record::Record;

/// Rows a worksheet holds, header included.
const MAX_ROWS: usize = 1_048_576;

/// Columns a worksheet holds.
const MAX_COLUMNS: usize = 16_384;

/// Characters a cell holds.
const MAX_CELL_CHARS: usize = 32_767;

/// What [`save_results_to_excel`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Workbook written with `rows` data rows under a header row.
    Written {
        path: PathBuf,
        rows: usize,
        columns: usize,
    },

    /// Nothing to write; no file was created.
    Skipped,
}

/// Records laid out as a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Lay records out as a table.
///
/// Columns are the first record's fields in order. Later records fill the
/// cells they have; their extra fields are dropped and missing ones stay
/// empty. `None` for an empty result set.
pub fn to_table(records: &[Record]) -> Option<Table> {
    let first = records.first()?;
    let headers: Vec<String> = first.keys().map(str::to_string).collect();

    let rows = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|h| record.cell(h).to_string())
                .collect()
        })
        .collect();

    Some(Table { headers, rows })
}

/// Write records to an xlsx file at `path`.
///
/// One worksheet, a header row, one row per record, no index column. An
/// empty result set writes nothing. An existing file is replaced.
pub fn save_results_to_excel(records: &[Record], path: &Path) -> ExportResult<ExportOutcome> {
    let Some(table) = to_table(records) else {
        info!("No results to save.");
        return Ok(ExportOutcome::Skipped);
    };

    if table.headers.len() > MAX_COLUMNS {
        return Err(ExportError::TooLarge {
            what: "columns",
            count: table.headers.len(),
        });
    }
    if table.rows.len() + 1 > MAX_ROWS {
        return Err(ExportError::TooLarge {
            what: "rows",
            count: table.rows.len(),
        });
    }

    let dropped = records
        .iter()
        .skip(1)
        .flat_map(|r| r.keys())
        .filter(|k| !table.headers.iter().any(|h| h == k))
        .count();
    if dropped > 0 {
        warn!(dropped, "Fields not present in the first record were not exported");
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    for (col, header) in table.headers.iter().enumerate() {
        let header = fit_cell(header, 0, col);
        worksheet.write_string_with_format(0, grid_col(col)?, header, &header_format)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let row_index = grid_row(i + 1)?;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let value = fit_cell(value, i + 1, col);
            worksheet.write_string(row_index, grid_col(col)?, value)?;
        }
    }

    workbook.save(path)?;

    info!(
        path = %path.display(),
        rows = table.rows.len(),
        columns = table.headers.len(),
        "Results saved"
    );

    Ok(ExportOutcome::Written {
        path: path.to_path_buf(),
        rows: table.rows.len(),
        columns: table.headers.len(),
    })
}

/// Cut `value` to the cell limit, warning when anything is dropped.
fn fit_cell(value: &str, row: usize, col: usize) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => {
            warn!(row, col, chars = value.chars().count(), "Cell truncated to fit the sheet");
            &value[..end]
        }
        None => value,
    }
}

fn grid_row(index: usize) -> ExportResult<u32> {
    u32::try_from(index).map_err(|_| ExportError::TooLarge {
        what: "rows",
        count: index,
    })
}

fn grid_col(index: usize) -> ExportResult<u16> {
    u16::try_from(index).map_err(|_| ExportError::TooLarge {
        what: "columns",
        count: index,
    })
}

/// Output file name for a run started at `now`: `ProductSpec_YYYYMMDDHHMM.xlsx`.
pub fn output_filename<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("ProductSpec_{}.xlsx", now.format("%Y%m%d%H%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_first_record_pins_columns() {
        let mut first = Record::from_pairs([("Name", "A")]);
        first.set_source_url("u1");
        let mut second = Record::from_pairs([("Name", "B"), ("Color", "Red")]);
        second.set_source_url("u2");

        let table = to_table(&[first, second]).unwrap();
        assert_eq!(table.headers, vec!["Name", "Product URL"]);
        assert_eq!(table.rows[1], vec!["B", "u2"]);
    }

    #[test]
    fn test_missing_cells_are_empty() {
        let first = Record::from_pairs([("Name", "A"), ("Form", "Pad")]);
        let second = Record::from_pairs([("Name", "B")]);

        let table = to_table(&[first, second]).unwrap();
        assert_eq!(table.rows[1], vec!["B", ""]);
    }

    #[test]
    fn test_empty_results_give_no_table() {
        assert!(to_table(&[]).is_none());
    }

    #[test]
    fn test_fit_cell_cuts_on_char_boundary() {
        let long = "é".repeat(MAX_CELL_CHARS + 10);
        let cut = fit_cell(&long, 1, 0);
        assert_eq!(cut.chars().count(), MAX_CELL_CHARS);
        assert_eq!(fit_cell("short", 1, 0), "short");
    }

    #[test]
    fn test_oversized_cell_still_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let records = [
            Record::from_pairs([("Name", "A")]),
            Record::from_pairs([("Name", "x".repeat(40_000).as_str())]),
        ];

        let outcome = save_results_to_excel(&records, &path).unwrap();

        assert!(matches!(outcome, ExportOutcome::Written { rows: 2, .. }));
        assert!(path.exists());
    }

    #[test]
    fn test_output_filename_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 59).unwrap();
        assert_eq!(output_filename(&now), "ProductSpec_202403070905.xlsx");
    }
}
