use std::slice::Iter;

use chrono::NaiveDate;
use getset::{CopyGetters, Getters};
use rust_decimal::Decimal;

/// A cleaned journal entry. Amounts are always present; unreadable values were coerced to zero.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Entry {
    #[getset(get = "pub")]
    business_unit: String,
    #[getset(get = "pub")]
    source: String,
    #[getset(get_copy = "pub")]
    debit: Decimal,
    #[getset(get_copy = "pub")]
    credit: Decimal,
    /// `None` when the cell was blank.
    #[getset(get_copy = "pub")]
    effective_date: Option<NaiveDate>,
    #[getset(get_copy = "pub")]
    entry_date: Option<NaiveDate>,
    /// Values of the passthrough columns, in the order of `EntryTable::extra_columns`.
    #[getset(get = "pub")]
    extra: Vec<String>,
}

impl Entry {
    pub fn new(
        business_unit: impl Into<String>,
        source: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
        effective_date: Option<NaiveDate>,
        entry_date: Option<NaiveDate>,
    ) -> Entry {
        Entry {
            business_unit: business_unit.into(),
            source: source.into(),
            debit,
            credit,
            effective_date,
            entry_date,
            extra: Vec::new(),
        }
    }

    pub fn with_extra(mut self, extra: Vec<String>) -> Entry {
        self.extra = extra;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryTable {
    extra_columns: Vec<String>,
    entries: Vec<Entry>,
}

impl EntryTable {
    pub fn new(extra_columns: Vec<String>, entries: Vec<Entry>) -> EntryTable {
        EntryTable { extra_columns, entries }
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn iter(&self) -> Iter<Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
