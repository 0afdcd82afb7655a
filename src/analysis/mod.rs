use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

pub mod benford;
pub mod cleaning;
pub mod entry;
pub mod summary;


use benford::BenfordAnalysis;
use entry::EntryTable;
use summary::Summary;

pub const DEBIT: &str = "Debit";
pub const CREDIT: &str = "Credit";
pub const BUSINESS_UNIT: &str = "BusinessUnit";
pub const SOURCE: &str = "Source";
pub const EFFECTIVE_DATE: &str = "EffectiveDate";
pub const ENTRY_DATE: &str = "EntryDate";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

static EMPTY_CELL: Cell = Cell::Empty;

#[derive(Debug, PartialEq, Error)]
pub enum AnalysisError {
    #[error("required column `{0}` is missing")]
    MissingColumn(&'static str),
    #[error("sum of {0} amounts overflows the decimal range")]
    AmountOverflow(&'static str),
    #[error("row {row}: cannot parse {column} value `{value}` as a date")]
    InvalidDate {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// A single value as it was read from the input file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(Decimal),
    Bool(bool),
    Date(NaiveDate),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => f.write_str(text),
            Cell::Number(number) => write!(f, "{}", number),
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
            Cell::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<Decimal> for Cell {
    fn from(value: Decimal) -> Self {
        Cell::Number(value)
    }
}

/// Header row plus data rows, before any cleaning. Rows are padded to the header width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> RawTable {
        RawTable {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        if row.len() < self.headers.len() {
            row.resize(self.headers.len(), Cell::Empty);
        }
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything computed from one input table.
#[derive(Debug)]
pub struct Analysis {
    pub entries: EntryTable,
    pub summary: Summary,
    pub benford: BenfordAnalysis,
}

/// Runs the cleaning, aggregation and Benford stages in order.
pub fn analyze(raw: &RawTable) -> Result<Analysis, AnalysisError> {
    let entries = cleaning::clean(raw)?;
    let summary = Summary::from_entries(&entries)?;
    let benford = BenfordAnalysis::from_entries(&entries);

    Ok(Analysis {
        entries,
        summary,
        benford,
    })
}
