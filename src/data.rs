use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use log::debug;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::analysis::cleaning::date_from_excel_serial;
use crate::analysis::{Cell, RawTable};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook contains no sheets")]
    NoSheets,
    #[error("file has no header row")]
    MissingHeader,
}

/// Reads a spreadsheet (xlsx, xlsm, xls, xlsb, ods) or a csv file. The first row holds the headers.
pub fn load_table(path: &Path) -> Result<RawTable, LoadError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => read_csv(File::open(path)?),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => load_workbook(path),
        _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Csv values are kept verbatim; trimming and typing happen during cleaning.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(String::is_empty) {
        return Err(LoadError::MissingHeader);
    }

    let mut table = RawTable::new(headers);
    for record in csv_reader.records() {
        let record = record?;
        table.push_row(
            record
                .iter()
                .map(|value| if value.is_empty() { Cell::Empty } else { Cell::from(value) })
                .collect(),
        );
    }

    debug!("read csv, rows={}", table.len());
    Ok(table)
}

/// Reads the first worksheet of a workbook.
fn load_workbook(path: &Path) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook.sheet_names().first().cloned().ok_or(LoadError::NoSheets)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(LoadError::MissingHeader)?
        .iter()
        .map(|data| cell_from_data(data).to_text().trim().to_string())
        .collect();

    let mut table = RawTable::new(headers);
    for row in rows {
        table.push_row(row.iter().map(cell_from_data).collect());
    }

    debug!("read worksheet, sheet={}, rows={}", sheet_name, table.len());
    Ok(table)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Decimal::from_f64(*n).map_or_else(|| Cell::Text(n.to_string()), Cell::Number),
        Data::Int(n) => Cell::Number(Decimal::from(*n)),
        Data::Bool(b) => Cell::Bool(*b),
        // Excel stores dates as serials in the 1900 date system.
        Data::DateTime(dt) => date_from_excel_serial(dt.as_f64()).map_or_else(|| Cell::Text(dt.as_f64().to_string()), Cell::Date),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
    }
}
