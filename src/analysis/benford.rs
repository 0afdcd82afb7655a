//! First-digit (Benford's Law) analysis of the journal amounts.
//!
//! Debits and the absolute values of credits are pooled, zeros are dropped, and the
//! leading significant digit of each remaining amount is counted. The observed
//! frequencies are compared with the logarithmic distribution `log10(1 + 1/d)`.

use rust_decimal::Decimal;

use super::entry::EntryTable;

pub const DIGITS: std::ops::RangeInclusive<u8> = 1..=9;

/// Chi-squared critical value for 8 degrees of freedom at p = 0.05.
pub const CHI_SQUARED_CRITICAL: f64 = 15.507;

/// Expected share of amounts whose leading digit is `digit`.
pub fn expected_frequency(digit: u8) -> f64 {
    (1.0 + 1.0 / f64::from(digit)).log10()
}

/// First non-zero digit of the decimal representation, ignoring sign and magnitude.
pub fn leading_digit(amount: &Decimal) -> Option<u8> {
    amount
        .to_string()
        .chars()
        .find(|c| matches!(c, '1'..='9'))
        .and_then(|c| c.to_digit(10))
        .map(|digit| digit as u8)
}

/// All debits followed by the absolute credits, keeping only positive values.
pub fn pooled_amounts(entries: &EntryTable) -> Vec<Decimal> {
    entries
        .iter()
        .map(|entry| entry.debit())
        .chain(entries.iter().map(|entry| entry.credit().abs()))
        .filter(|amount| amount.is_sign_positive() && !amount.is_zero())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DigitFrequency {
    pub digit: u8,
    pub count: usize,
    pub observed: f64,
    pub expected: f64,
}

impl DigitFrequency {
    pub fn difference(&self) -> f64 {
        self.observed - self.expected
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenfordTable {
    sample_size: usize,
    digits: Vec<DigitFrequency>,
}

impl BenfordTable {
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// One row per digit 1 to 9, in order.
    pub fn digits(&self) -> &[DigitFrequency] {
        &self.digits
    }

    pub fn chi_squared(&self) -> f64 {
        let total = self.sample_size as f64;
        self.digits
            .iter()
            .map(|row| {
                let expected = row.expected * total;
                (row.count as f64 - expected).powi(2) / expected
            })
            .sum()
    }

    pub fn mean_absolute_deviation(&self) -> f64 {
        self.digits.iter().map(|row| row.difference().abs()).sum::<f64>() / self.digits.len() as f64
    }

    pub fn conforms(&self) -> bool {
        self.chi_squared() <= CHI_SQUARED_CRITICAL
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BenfordAnalysis {
    /// No positive amounts, so there are no observed frequencies.
    NoData,
    Distribution(BenfordTable),
}

impl BenfordAnalysis {
    pub fn from_entries(entries: &EntryTable) -> BenfordAnalysis {
        BenfordAnalysis::from_amounts(&pooled_amounts(entries))
    }

    pub fn from_amounts(amounts: &[Decimal]) -> BenfordAnalysis {
        let mut counts = [0usize; 9];
        for digit in amounts.iter().filter(|amount| amount.is_sign_positive()).filter_map(leading_digit) {
            counts[usize::from(digit) - 1] += 1;
        }

        let sample_size: usize = counts.iter().sum();
        if sample_size == 0 {
            return BenfordAnalysis::NoData;
        }

        let digits = DIGITS
            .zip(counts)
            .map(|(digit, count)| DigitFrequency {
                digit,
                count,
                observed: count as f64 / sample_size as f64,
                expected: expected_frequency(digit),
            })
            .collect();

        BenfordAnalysis::Distribution(BenfordTable { sample_size, digits })
    }

    pub fn table(&self) -> Option<&BenfordTable> {
        match self {
            BenfordAnalysis::NoData => None,
            BenfordAnalysis::Distribution(table) => Some(table),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_expected_frequencies() {
        assert!((expected_frequency(1) - 0.30103).abs() < 1e-5);
        assert!((expected_frequency(9) - 0.04576).abs() < 1e-5);

        for digit in 1..9 {
            assert!(expected_frequency(digit) > expected_frequency(digit + 1));
        }

        let total: f64 = DIGITS.map(expected_frequency).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_leading_digit_ignores_scale() {
        assert_eq!(leading_digit(&dec!(1.23)), Some(1));
        assert_eq!(leading_digit(&dec!(12.3)), Some(1));
        assert_eq!(leading_digit(&dec!(123)), Some(1));
        assert_eq!(leading_digit(&dec!(0.0456)), Some(4));
        assert_eq!(leading_digit(&dec!(-905.10)), Some(9));
        assert_eq!(leading_digit(&dec!(0.00)), None);
    }

    #[test]
    fn test_observed_frequencies_sum_to_one() {
        let amounts = [dec!(1), dec!(19.99), dec!(250), dec!(3.5), dec!(0.7), dec!(88), dec!(1000.01)];

        let analysis = BenfordAnalysis::from_amounts(&amounts);
        let table = analysis.table().expect("sample is not empty");

        assert_eq!(table.sample_size(), 7);
        assert_eq!(table.digits().len(), 9);
        let total: f64 = table.digits().iter().map(|row| row.observed).sum();
        assert!((total - 1.0).abs() < 1e-12);

        let counts: Vec<usize> = table.digits().iter().map(|row| row.count).collect();
        assert_eq!(counts, vec![3, 1, 1, 0, 0, 0, 1, 1, 0]);
        assert_eq!(table.digits()[3].observed, 0.0);
    }

    #[test]
    fn test_zeros_give_no_data() {
        assert_eq!(BenfordAnalysis::from_amounts(&[dec!(0), dec!(0.00)]), BenfordAnalysis::NoData);
        assert_eq!(BenfordAnalysis::from_amounts(&[]), BenfordAnalysis::NoData);
    }

    #[test]
    fn test_chi_squared() {
        // 1000 amounts spread exactly by the rounded expected counts.
        let counts = [301, 176, 125, 97, 79, 67, 58, 51, 46];
        let amounts: Vec<Decimal> = counts
            .iter()
            .zip(1u32..)
            .flat_map(|(&count, digit)| std::iter::repeat(Decimal::from(digit * 10)).take(count))
            .collect();

        let analysis = BenfordAnalysis::from_amounts(&amounts);
        let table = analysis.table().expect("sample is not empty");
        assert!(table.chi_squared() < 0.1);
        assert!(table.mean_absolute_deviation() < 0.001);
        assert!(table.conforms());

        let skewed = BenfordAnalysis::from_amounts(&vec![dec!(500); 200]);
        assert!(!skewed.table().expect("sample is not empty").conforms());
    }
}
