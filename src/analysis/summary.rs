use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::slice::Iter;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::entry::EntryTable;
use super::{AnalysisError, BUSINESS_UNIT, CREDIT, DATE_FORMAT, DEBIT, SOURCE};

const NET_DIFFERENCE: &str = "Debit + Credit";

/// Occurrence counts per category, largest first. Ties keep the order in which the
/// categories first appeared in the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    label: String,
    counts: Vec<(String, usize)>,
}

impl FrequencyTable {
    pub fn from_values<I, S>(label: impl Into<String>, values: I) -> FrequencyTable
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<(String, usize)> = Vec::new();

        for value in values {
            let value = value.as_ref();
            match positions.get(value) {
                Some(&position) => counts[position].1 += 1,
                None => {
                    positions.insert(value.to_string(), counts.len());
                    counts.push((value.to_string(), 1));
                },
            }
        }

        // Stable sort, so equal counts stay in first-seen order.
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        FrequencyTable {
            label: label.into(),
            counts,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn iter(&self) -> Iter<(String, usize)> {
        self.counts.iter()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Keeps the `limit` largest categories and folds the remainder into one trailing
    /// `other` category. Tables with at most `limit` categories are returned unchanged.
    pub fn collapse_top(&self, limit: usize, other: &str) -> FrequencyTable {
        if self.counts.len() <= limit {
            return self.clone();
        }

        let (top, rest) = self.counts.split_at(limit);
        let mut counts = top.to_vec();
        counts.push((other.to_string(), rest.iter().map(|(_, count)| count).sum()));

        FrequencyTable {
            label: self.label.clone(),
            counts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Option<DateRange> {
        dates.into_iter().fold(None, |range, date| match range {
            None => Some(DateRange { start: date, end: date }),
            Some(DateRange { start, end }) => Some(DateRange {
                start: start.min(date),
                end: end.max(date),
            }),
        })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start.format(DATE_FORMAT), self.end.format(DATE_FORMAT))
    }
}

/// Descriptive statistics of a cleaned entry table.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub row_count: usize,
    /// Blank dates are left out of both ranges.
    pub effective_dates: Option<DateRange>,
    pub entry_dates: Option<DateRange>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    /// Debits plus credits. Credits are negative in a balanced journal, so this is close to zero.
    pub net_difference: Decimal,
    pub by_business_unit: FrequencyTable,
    pub by_source: FrequencyTable,
    pub monthly: Vec<(YearMonth, usize)>,
}

impl Summary {
    pub fn from_entries(entries: &EntryTable) -> Result<Summary, AnalysisError> {
        let total_debit = checked_total(DEBIT, entries.iter().map(|entry| entry.debit()))?;
        let total_credit = checked_total(CREDIT, entries.iter().map(|entry| entry.credit()))?;
        let net_difference = total_debit
            .checked_add(total_credit)
            .ok_or(AnalysisError::AmountOverflow(NET_DIFFERENCE))?;

        Ok(Summary {
            row_count: entries.len(),
            effective_dates: DateRange::from_dates(entries.iter().filter_map(|entry| entry.effective_date())),
            entry_dates: DateRange::from_dates(entries.iter().filter_map(|entry| entry.entry_date())),
            total_debit,
            total_credit,
            net_difference,
            by_business_unit: FrequencyTable::from_values(
                BUSINESS_UNIT,
                entries.iter().map(|entry| entry.business_unit()),
            ),
            by_source: FrequencyTable::from_values(SOURCE, entries.iter().map(|entry| entry.source())),
            monthly: monthly_counts(entries.iter().filter_map(|entry| entry.effective_date())),
        })
    }
}

fn checked_total(
    column: &'static str,
    amounts: impl IntoIterator<Item = Decimal>,
) -> Result<Decimal, AnalysisError> {
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total
            .checked_add(amount)
            .ok_or(AnalysisError::AmountOverflow(column))
    })
}

/// Entry counts per calendar month, in chronological order.
pub fn monthly_counts(dates: impl IntoIterator<Item = NaiveDate>) -> Vec<(YearMonth, usize)> {
    let mut months: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for date in dates {
        *months.entry(YearMonth::from(date)).or_insert(0) += 1;
    }

    months.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::analysis::entry::Entry;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_frequency_ties_keep_first_appearance() {
        let values = ["C", "A", "B", "A", "C", "B", "A"];
        let table = FrequencyTable::from_values(SOURCE, values);

        let counts: Vec<(String, usize)> = table.iter().cloned().collect();
        assert_eq!(
            counts,
            vec![("A".to_string(), 3), ("C".to_string(), 2), ("B".to_string(), 2)]
        );
        assert_eq!(table.total(), 7);
    }

    #[test]
    fn test_collapse_top() {
        let values: Vec<String> = (0..12)
            .flat_map(|i| std::iter::repeat(format!("S{}", i)).take(20 - i))
            .collect();
        let table = FrequencyTable::from_values(SOURCE, &values);

        let collapsed = table.collapse_top(10, "Other");
        assert_eq!(collapsed.len(), 11);
        assert_eq!(collapsed.iter().last(), Some(&("Other".to_string(), 10 + 9)));
        assert_eq!(collapsed.total(), table.total());

        assert_eq!(table.collapse_top(12, "Other"), table);
    }

    #[test]
    fn test_monthly_counts_are_chronological() {
        let counts = monthly_counts([date(2024, 2, 1), date(2023, 12, 31), date(2024, 1, 5), date(2024, 1, 20)]);

        let rendered: Vec<(String, usize)> = counts.iter().map(|(month, count)| (month.to_string(), *count)).collect();
        assert_eq!(
            rendered,
            vec![
                ("2023-12".to_string(), 1),
                ("2024-01".to_string(), 2),
                ("2024-02".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_totals_overflow_is_reported() {
        let entry = |debit: Decimal, credit: Decimal| {
            Entry::new("BU01", "GL", debit, credit, Some(date(2024, 1, 5)), None)
        };

        let debits = EntryTable::new(
            Vec::new(),
            vec![entry(Decimal::MAX, Decimal::ZERO), entry(Decimal::ONE, Decimal::ZERO)],
        );
        assert_eq!(Summary::from_entries(&debits), Err(AnalysisError::AmountOverflow(DEBIT)));

        let net = EntryTable::new(
            Vec::new(),
            vec![entry(Decimal::MAX, Decimal::ZERO), entry(Decimal::ZERO, Decimal::MAX)],
        );
        assert_eq!(Summary::from_entries(&net), Err(AnalysisError::AmountOverflow(NET_DIFFERENCE)));
    }

    #[test]
    fn test_blank_dates_are_left_out() {
        let entries = EntryTable::new(
            Vec::new(),
            vec![
                Entry::new("BU01", "GL", Decimal::ONE, Decimal::ZERO, Some(date(2024, 1, 5)), None),
                Entry::new("BU01", "GL", Decimal::ONE, Decimal::ZERO, None, None),
            ],
        );

        let summary = Summary::from_entries(&entries).expect("totals fit");
        assert_eq!(summary.row_count, 2);
        assert_eq!(summary.effective_dates, DateRange::from_dates([date(2024, 1, 5)]));
        assert_eq!(summary.entry_dates, None);
        assert_eq!(summary.monthly, vec![(YearMonth { year: 2024, month: 1 }, 1)]);
    }

    #[test]
    fn test_date_range() {
        let range = DateRange::from_dates([date(2024, 3, 1), date(2024, 1, 9), date(2024, 2, 2)]);
        assert_eq!(range.map(|r| r.to_string()), Some("2024-01-09 to 2024-03-01".to_string()));
        assert_eq!(DateRange::from_dates(Vec::<NaiveDate>::new()), None);
    }
}
