use std::fmt;

use rust_decimal::Decimal;

use crate::analysis::benford::{BenfordAnalysis, CHI_SQUARED_CRITICAL};
use crate::analysis::summary::{DateRange, FrequencyTable};
use crate::analysis::Analysis;

const NOTE: &str = "Note: Benford's Law expects the digit 1 to lead about 30.1% of amounts, with the \
                    frequency falling toward digit 9.\nLarge differences between observed and expected \
                    frequencies may indicate anomalies, such as fabricated or duplicated entries,\nand \
                    are worth a closer look. They are not proof of error on their own.";

/// Renders the plain-text report written to `summary.txt`.
pub fn render(analysis: &Analysis) -> String {
    SummaryText(analysis).to_string()
}

struct SummaryText<'a>(&'a Analysis);

impl fmt::Display for SummaryText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.0.summary;

        writeln!(f, "Basic Analysis Summary")?;
        writeln!(f, "======================")?;
        writeln!(f)?;
        writeln!(f, "Total Rows: {}", summary.row_count)?;
        writeln!(f, "Effective Date Range: {}", date_range(summary.effective_dates))?;
        writeln!(f, "Entry Date Range: {}", date_range(summary.entry_dates))?;
        writeln!(f, "Total Debits: {}", format_amount(summary.total_debit))?;
        writeln!(f, "Total Credits: {}", format_amount(summary.total_credit))?;
        writeln!(
            f,
            "Net Difference (Debits + Credits): {}",
            format_amount(summary.net_difference)
        )?;
        writeln!(f)?;

        writeln!(f, "Entries by Business Unit:")?;
        write_frequencies(f, &summary.by_business_unit)?;
        writeln!(f)?;
        writeln!(f, "Entries by Source:")?;
        write_frequencies(f, &summary.by_source)?;
        writeln!(f)?;

        writeln!(f, "Benford's Law Analysis (First Digit)")?;
        writeln!(f, "====================================")?;
        writeln!(f)?;
        write_benford(f, &self.0.benford)?;
        writeln!(f)?;

        writeln!(f, "{}", NOTE)
    }
}

fn date_range(range: Option<DateRange>) -> String {
    range.map_or_else(|| "n/a".to_string(), |range| range.to_string())
}

fn write_frequencies(f: &mut fmt::Formatter<'_>, table: &FrequencyTable) -> fmt::Result {
    writeln!(f, "{}", table.label())?;
    if table.is_empty() {
        return writeln!(f, "(none)");
    }

    let name_width = table.iter().map(|(name, _)| name.chars().count()).max().unwrap_or(0);
    let count_width = table.iter().map(|(_, count)| count.to_string().len()).max().unwrap_or(0);
    for (name, count) in table.iter() {
        writeln!(f, "{:<name_width$}    {:>count_width$}", name, count)?;
    }

    Ok(())
}

fn write_benford(f: &mut fmt::Formatter<'_>, benford: &BenfordAnalysis) -> fmt::Result {
    let table = match benford {
        BenfordAnalysis::NoData => {
            return writeln!(f, "No positive amounts available; Benford analysis skipped.");
        },
        BenfordAnalysis::Distribution(table) => table,
    };

    writeln!(f, "Sample Size: {}", table.sample_size())?;
    writeln!(f)?;
    writeln!(f, "{:>5}  {:>8}  {:>8}  {:>10}", "Digit", "Observed", "Expected", "Difference")?;
    for row in table.digits() {
        writeln!(
            f,
            "{:>5}  {:>8.4}  {:>8.4}  {:>+10.4}",
            row.digit,
            row.observed,
            row.expected,
            row.difference()
        )?;
    }
    writeln!(f)?;

    writeln!(
        f,
        "Chi-Squared: {:.3} (critical value {} at p = 0.05, 8 degrees of freedom)",
        table.chi_squared(),
        CHI_SQUARED_CRITICAL
    )?;
    writeln!(f, "Mean Absolute Deviation: {:.4}", table.mean_absolute_deviation())?;
    if table.conforms() {
        writeln!(f, "Result: consistent with Benford's Law")
    } else {
        writeln!(f, "Result: deviates from Benford's Law")
    }
}

/// Two decimals with thousands separators, e.g. `-1,234.50`.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    let fixed = format!("{:.2}", rounded);

    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", fixed.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}{}.{}", sign, grouped, fraction)
}
