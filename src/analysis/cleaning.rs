use std::str::FromStr;

use chrono::{Days, NaiveDate, NaiveDateTime};
use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::entry::{Entry, EntryTable};
use super::{AnalysisError, Cell, RawTable};
use super::{BUSINESS_UNIT, CREDIT, DEBIT, EFFECTIVE_DATE, ENTRY_DATE, SOURCE};

const AMOUNT_COLUMNS: [&str; 2] = [DEBIT, CREDIT];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Cleans a raw table into journal entries: amounts, then text, then dates.
pub fn clean(raw: &RawTable) -> Result<EntryTable, AnalysisError> {
    let coerced = coerce_amounts(raw);
    let trimmed = trim_text(&coerced);
    into_entries(&trimmed)
}

/// Turns every cell of the debit and credit columns into a number. Unreadable values become zero.
pub fn coerce_amounts(raw: &RawTable) -> RawTable {
    let amount_columns: Vec<usize> = AMOUNT_COLUMNS
        .iter()
        .filter_map(|name| raw.column_index(name))
        .collect();

    let rows = raw
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(column, cell)| {
                    if amount_columns.contains(&column) {
                        Cell::Number(coerce_amount(cell))
                    } else {
                        cell.clone()
                    }
                })
                .collect()
        })
        .collect();

    RawTable {
        headers: raw.headers.clone(),
        rows,
    }
}

pub fn coerce_amount(cell: &Cell) -> Decimal {
    match cell {
        Cell::Number(number) => *number,
        Cell::Bool(true) => Decimal::ONE,
        Cell::Bool(false) => Decimal::ZERO,
        Cell::Text(text) => parse_decimal(text.trim()).unwrap_or_else(|| {
            debug!("non-numeric amount coerced to zero, value={:?}", text);
            Decimal::ZERO
        }),
        Cell::Empty | Cell::Date(_) => Decimal::ZERO,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Converts text-like columns to trimmed text. Columns holding only numbers or only
/// dates are left as they are, and so are the amount columns.
pub fn trim_text(raw: &RawTable) -> RawTable {
    let mut rows = raw.rows.clone();

    for (column, header) in raw.headers.iter().enumerate() {
        if AMOUNT_COLUMNS.contains(&header.as_str()) || is_typed_column(raw, column) {
            continue;
        }

        for row in rows.iter_mut() {
            if let Some(cell) = row.get_mut(column) {
                *cell = Cell::Text(cell.to_text().trim().to_string());
            }
        }
    }

    RawTable {
        headers: raw.headers.clone(),
        rows,
    }
}

fn is_typed_column(raw: &RawTable, column: usize) -> bool {
    let mut cells = raw
        .rows
        .iter()
        .filter_map(|row| row.get(column))
        .filter(|cell| !cell.is_empty());

    match cells.next() {
        None => true,
        Some(Cell::Number(_)) => cells.all(|cell| matches!(cell, Cell::Number(_))),
        Some(Cell::Date(_)) => cells.all(|cell| matches!(cell, Cell::Date(_))),
        Some(_) => false,
    }
}

/// Builds the entry table. Blank dates become `None`; a date that cannot be parsed fails
/// the whole table.
pub fn into_entries(table: &RawTable) -> Result<EntryTable, AnalysisError> {
    let column = |name: &'static str| table.column_index(name).ok_or(AnalysisError::MissingColumn(name));

    let debit = column(DEBIT)?;
    let credit = column(CREDIT)?;
    let business_unit = column(BUSINESS_UNIT)?;
    let source = column(SOURCE)?;
    let effective_date = column(EFFECTIVE_DATE)?;
    let entry_date = column(ENTRY_DATE)?;

    let required = [debit, credit, business_unit, source, effective_date, entry_date];
    let extra: Vec<usize> = (0..table.headers.len())
        .filter(|index| !required.contains(index))
        .collect();
    let extra_columns = extra.iter().map(|&index| table.headers[index].clone()).collect();

    let date_at = |row: usize, index: usize, name: &'static str| {
        let cell = table.cell(row, index);
        if is_blank(cell) {
            return Ok(None);
        }

        parse_date(cell).map(Some).ok_or_else(|| AnalysisError::InvalidDate {
            row: row + 1,
            column: name,
            value: cell.to_text(),
        })
    };

    let mut entries = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let entry = Entry::new(
            table.cell(row, business_unit).to_text(),
            table.cell(row, source).to_text(),
            coerce_amount(table.cell(row, debit)),
            coerce_amount(table.cell(row, credit)),
            date_at(row, effective_date, EFFECTIVE_DATE)?,
            date_at(row, entry_date, ENTRY_DATE)?,
        )
        .with_extra(extra.iter().map(|&index| table.cell(row, index).to_text()).collect());

        entries.push(entry);
    }

    Ok(EntryTable::new(extra_columns, entries))
}

fn is_blank(cell: &Cell) -> bool {
    match cell {
        Cell::Empty => true,
        Cell::Text(text) => text.trim().is_empty(),
        _ => false,
    }
}

pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(date) => Some(*date),
        Cell::Number(serial) => serial.to_f64().and_then(date_from_excel_serial),
        Cell::Text(text) => parse_date_text(text.trim()),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|datetime| datetime.date())
        })
}

/// Day part of an Excel serial date in the 1900 date system.
///
/// Excel counts a 1900-02-29 that never existed as serial 60. Serials below it start
/// from 1900-01-01 = 1, and serial 60 itself has no date.
pub fn date_from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }

    let days = serial.floor() as u64;
    match days {
        1..=59 => NaiveDate::from_ymd_opt(1899, 12, 31)?.checked_add_days(Days::new(days)),
        60 => None,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(days)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount(&Cell::Number(dec!(12.5))), dec!(12.5));
        assert_eq!(coerce_amount(&Cell::from(" 100.00 ")), dec!(100.00));
        assert_eq!(coerce_amount(&Cell::from("1.5e3")), dec!(1500));
        assert_eq!(coerce_amount(&Cell::from("abc")), Decimal::ZERO);
        assert_eq!(coerce_amount(&Cell::Empty), Decimal::ZERO);
        assert_eq!(coerce_amount(&Cell::Bool(true)), Decimal::ONE);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5);

        assert_eq!(parse_date(&Cell::from("2024-01-05")), expected);
        assert_eq!(parse_date(&Cell::from(" 01/05/2024 ")), expected);
        assert_eq!(parse_date(&Cell::from("2024-01-05 13:45:00")), expected);
        assert_eq!(parse_date(&Cell::from("2024-01-05T13:45:00")), expected);
        assert_eq!(parse_date(&Cell::from("2024-01-05 13:45")), expected);
        assert_eq!(parse_date(&Cell::from("01/05/2024 13:45")), expected);
        assert_eq!(parse_date(&Cell::Number(dec!(45296))), expected);
        assert_eq!(parse_date(&Cell::from("next tuesday")), None);
        assert_eq!(parse_date(&Cell::Empty), None);
    }

    #[test]
    fn test_excel_serial() {
        assert_eq!(date_from_excel_serial(45296.75), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(date_from_excel_serial(0.0), None);
        assert_eq!(date_from_excel_serial(1.0), NaiveDate::from_ymd_opt(1900, 1, 1));
        assert_eq!(date_from_excel_serial(59.0), NaiveDate::from_ymd_opt(1900, 2, 28));
        assert_eq!(date_from_excel_serial(60.0), None);
        assert_eq!(date_from_excel_serial(61.0), NaiveDate::from_ymd_opt(1900, 3, 1));
        assert_eq!(date_from_excel_serial(f64::NAN), None);
    }

    #[test]
    fn test_numeric_columns_are_not_stringified() {
        let mut raw = RawTable::new(vec!["Account".to_string(), "Memo".to_string()]);
        raw.push_row(vec![Cell::Number(dec!(4000)), Cell::from("  rent ")]);
        raw.push_row(vec![Cell::Empty, Cell::Number(dec!(7))]);

        let trimmed = trim_text(&raw);

        assert_eq!(trimmed.rows[0], vec![Cell::Number(dec!(4000)), Cell::from("rent")]);
        assert_eq!(trimmed.rows[1], vec![Cell::Empty, Cell::from("7")]);
    }
}
