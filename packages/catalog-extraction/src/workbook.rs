//! Spreadsheet input: sheets, header row, columns.
//!
//! `.xlsx`, `.xlsm`, `.xls`, `.xlsb` and `.ods` are read with `calamine`;
//! `.csv` with `csv`. The first row is the header row. Every cell is coerced
//! to a string; empty cells are `None`.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::debug;

use crate::error::{InputError, InputResult};
use crate::pipeline::input::{partition_urls, UrlPartition};

/// One sheet of the input workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Sheet {
    /// Column names, in sheet order.
    pub fn columns(&self) -> &[String] {
        &self.headers
    }

    /// Cells of the named column, top to bottom, header excluded.
    pub fn column(&self, name: &str) -> InputResult<Vec<Option<String>>> {
        let index = self
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| InputError::ColumnNotFound {
                column: name.to_string(),
                available: self.headers.clone(),
            })?;

        Ok(self
            .rows
            .iter()
            .map(|row| row.get(index).cloned().flatten())
            .collect())
    }

    /// The first `n` data rows.
    pub fn preview(&self, n: usize) -> &[Vec<Option<String>>] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Spreadsheet,
    Csv,
}

fn format_of(path: &Path) -> InputResult<Format> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(Format::Spreadsheet),
        Some("csv") => Ok(Format::Csv),
        _ => Err(InputError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

fn workbook_error(
    path: &Path,
    source: impl std::error::Error + Send + Sync + 'static,
) -> InputError {
    InputError::Workbook {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}

fn csv_sheet_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("csv")
        .to_string()
}

/// Sheet names in workbook order. A CSV file has one, named after the file.
pub fn sheet_names(path: &Path) -> InputResult<Vec<String>> {
    match format_of(path)? {
        Format::Spreadsheet => {
            let workbook = open_workbook_auto(path).map_err(|e| workbook_error(path, e))?;
            Ok(workbook.sheet_names())
        }
        Format::Csv => Ok(vec![csv_sheet_name(path)]),
    }
}

/// Open one sheet. `None` picks the first sheet.
pub fn open_sheet(path: &Path, sheet: Option<&str>) -> InputResult<Sheet> {
    let sheet = match format_of(path)? {
        Format::Spreadsheet => read_spreadsheet(path, sheet)?,
        Format::Csv => read_csv(path)?,
    };
    debug!(
        path = %path.display(),
        sheet = %sheet.name,
        columns = sheet.headers.len(),
        rows = sheet.rows.len(),
        "Input sheet loaded"
    );
    Ok(sheet)
}

fn read_spreadsheet(path: &Path, sheet: Option<&str>) -> InputResult<Sheet> {
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(path, e))?;
    let names = workbook.sheet_names();

    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| InputError::SheetNotFound {
                sheet: wanted.to_string(),
                available: names.clone(),
            })?,
        None => names.first().cloned().ok_or_else(|| InputError::EmptySheet {
            sheet: path.display().to_string(),
        })?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| workbook_error(path, e))?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or_else(|| InputError::EmptySheet {
        sheet: name.clone(),
    })?;
    let headers = header_names(header_row.iter().map(cell_text));
    let rows = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(Sheet {
        name,
        headers,
        rows,
    })
}

fn read_csv(path: &Path) -> InputResult<Sheet> {
    let name = csv_sheet_name(path);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| workbook_error(path, e))?;

    let header_record = reader.headers().map_err(|e| workbook_error(path, e))?;
    if header_record.is_empty() {
        return Err(InputError::EmptySheet { sheet: name });
    }
    let headers = header_names(header_record.iter().map(non_empty));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| workbook_error(path, e))?;
        rows.push(record.iter().map(non_empty).collect());
    }

    Ok(Sheet {
        name,
        headers,
        rows,
    })
}

/// Header labels; blank headers become `Unnamed: <index>`.
fn header_names(cells: impl Iterator<Item = Option<String>>) -> Vec<String> {
    cells
        .enumerate()
        .map(|(i, cell)| cell.unwrap_or_else(|| format!("Unnamed: {i}")))
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Cell text. Integral floats print without a fractional part.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => non_empty(s),
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() && f.abs() < 1e15 => {
            Some(format!("{}", *f as i64))
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => non_empty(&other.to_string()),
    }
}

/// Read the named column and partition it into valid and invalid URLs.
pub fn read_urls_from_excel(
    path: &Path,
    sheet: Option<&str>,
    column: &str,
) -> InputResult<UrlPartition> {
    let sheet = open_sheet(path, sheet)?;
    Ok(partition_urls(sheet.column(column)?))
}
