//! Spreadsheet parsing for bulk registration
//!
//! Accepts XLSX (first worksheet) and CSV. The first non-blank row is the
//! header and must name the `visitor_name`, `visitor_mobile` and
//! `visitor_email` columns; order and extra columns do not matter.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use super::model::RowError;
use crate::{Error, Result};

pub const COLUMN_NAME: &str = "visitor_name";
pub const COLUMN_MOBILE: &str = "visitor_mobile";
pub const COLUMN_EMAIL: &str = "visitor_email";

/// Upper bound on data rows accepted from one file
pub const MAX_IMPORT_ROWS: usize = 5_000;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xlsx,
    Csv,
}

impl SpreadsheetFormat {
    /// Pick a format from the upload's file name, falling back to its
    /// content type.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Result<Self> {
        if let Some(name) = file_name {
            let name = name.to_ascii_lowercase();
            if name.ends_with(".xlsx") {
                return Ok(Self::Xlsx);
            }
            if name.ends_with(".csv") {
                return Ok(Self::Csv);
            }
        }

        match content_type.map(|ct| ct.split(';').next().unwrap_or("").trim()) {
            Some(XLSX_CONTENT_TYPE) => Ok(Self::Xlsx),
            Some(CSV_CONTENT_TYPE) => Ok(Self::Csv),
            _ => Err(Error::InvalidFormat(
                "expected an .xlsx or .csv spreadsheet".to_string(),
            )),
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Xlsx => XLSX_CONTENT_TYPE,
            Self::Csv => CSV_CONTENT_TYPE,
        }
    }
}

/// One data row with the three visitor columns extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based spreadsheet row, header included
    pub row: usize,
    pub name: String,
    pub mobile: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedSheet {
    pub rows: Vec<SheetRow>,
    pub errors: Vec<RowError>,
}

/// Parse a whole file. Fails only when the file itself is unreadable, has no
/// usable header, or exceeds [`MAX_IMPORT_ROWS`]; bad rows are reported in
/// [`ParsedSheet::errors`].
pub fn parse_sheet(bytes: &[u8], format: SpreadsheetFormat) -> Result<ParsedSheet> {
    let cells = match format {
        SpreadsheetFormat::Xlsx => read_xlsx(bytes)?,
        SpreadsheetFormat::Csv => read_csv(bytes)?,
    };
    extract_rows(cells)
}

fn read_csv(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::InvalidFormat(format!("unreadable CSV: {}", e)))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_xlsx(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| Error::InvalidFormat(format!("unreadable XLSX: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::InvalidFormat("workbook has no worksheet".to_string()))?
        .map_err(|e| Error::InvalidFormat(format!("unreadable worksheet: {}", e)))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // Numeric phone cells come back as floats
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn extract_rows(cells: Vec<Vec<String>>) -> Result<ParsedSheet> {
    let mut lines = cells
        .into_iter()
        .enumerate()
        .map(|(index, row)| (index + 1, row))
        .filter(|(_, row)| row.iter().any(|cell| !cell.trim().is_empty()));

    let (_, header) = lines
        .next()
        .ok_or_else(|| Error::InvalidFormat("spreadsheet is empty".to_string()))?;
    let column = |name: &str| {
        header
            .iter()
            .position(|cell| cell.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::InvalidFormat(format!("missing required column '{}'", name)))
    };
    let name_col = column(COLUMN_NAME)?;
    let mobile_col = column(COLUMN_MOBILE)?;
    let email_col = column(COLUMN_EMAIL)?;

    let mut parsed = ParsedSheet::default();
    let mut data_rows = 0usize;
    for (row_number, row) in lines {
        data_rows += 1;
        if data_rows > MAX_IMPORT_ROWS {
            return Err(Error::InvalidInput(format!(
                "spreadsheet exceeds {} data rows",
                MAX_IMPORT_ROWS
            )));
        }

        let cell = |index: usize| row.get(index).map(|v| v.trim().to_string()).unwrap_or_default();
        let name = cell(name_col);
        let mobile = cell(mobile_col);
        let email = Some(cell(email_col)).filter(|e| !e.is_empty());

        if name.is_empty() {
            parsed.errors.push(RowError {
                row: row_number,
                reason: format!("{} is empty", COLUMN_NAME),
            });
            continue;
        }
        if mobile.is_empty() {
            parsed.errors.push(RowError {
                row: row_number,
                reason: format!("{} is empty", COLUMN_MOBILE),
            });
            continue;
        }

        parsed.rows.push(SheetRow {
            row: row_number,
            name,
            mobile,
            email,
        });
    }
    Ok(parsed)
}
