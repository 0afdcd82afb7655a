use std::error::Error;
use std::path::Path;

use enum_dispatch::enum_dispatch;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::fonts::FONT_FAMILY;
use super::{Chart, ReportError};
use crate::analysis::benford::DigitFrequency;
use crate::analysis::summary::{FrequencyTable, YearMonth};
use crate::analysis::Analysis;

pub const MONTHLY_ENTRIES_FILE: &str = "entries_over_time.png";
pub const BENFORD_FILE: &str = "benford_law.png";
pub const SOURCE_PIE_FILE: &str = "source_distribution_pie.png";

pub const OTHER_SOURCES: &str = "Other";

pub const NO_ENTRIES: &str = "no entries to plot";
pub const NO_BENFORD_SAMPLE: &str = "no positive amounts for the Benford sample";
pub const NO_SOURCES: &str = "no sources to plot";

const CHART_SIZE: (u32, u32) = (1000, 600);

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);
const OBSERVED_COLOR: RGBColor = RGBColor(31, 119, 180);
const EXPECTED_COLOR: RGBColor = RGBColor(255, 127, 14);
const OTHER_COLOR: RGBColor = RGBColor(190, 190, 190);

const SLICE_COLORS: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

type DrawResult = Result<(), Box<dyn Error>>;

#[enum_dispatch(Chart)]
pub enum ChartKind {
    MonthlyEntries,
    BenfordComparison,
    SourcePie,
}

/// The three report charts, in the order they are written.
pub fn charts(analysis: &Analysis, top_sources: usize) -> Vec<ChartKind> {
    let benford = analysis
        .benford
        .table()
        .map(|table| table.digits().to_vec())
        .unwrap_or_default();

    vec![
        MonthlyEntries::new(&analysis.summary.monthly).into(),
        BenfordComparison::new(benford).into(),
        SourcePie::new(&analysis.summary.by_source, top_sources).into(),
    ]
}

/// Draws onto a white bitmap and saves it, mapping any plotters error to `ReportError::Render`.
fn render<F>(path: &Path, file: &'static str, draw: F) -> Result<(), ReportError>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> DrawResult,
{
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();

    let result = (|| -> DrawResult {
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
        Ok(())
    })();

    result.map_err(|err| ReportError::Render {
        file,
        message: err.to_string(),
    })
}

/// Bar chart of entries per effective month.
pub struct MonthlyEntries {
    months: Vec<(String, u32)>,
}

impl MonthlyEntries {
    pub fn new(monthly: &[(YearMonth, usize)]) -> MonthlyEntries {
        MonthlyEntries {
            months: monthly
                .iter()
                .map(|(month, count)| (month.to_string(), *count as u32))
                .collect(),
        }
    }
}

impl Chart for MonthlyEntries {
    fn file_name(&self) -> &'static str {
        MONTHLY_ENTRIES_FILE
    }

    fn skip_reason(&self) -> Option<&'static str> {
        self.months.is_empty().then_some(NO_ENTRIES)
    }

    fn draw(&self, path: &Path) -> Result<(), ReportError> {
        render(path, self.file_name(), |root| {
            let max = self.months.iter().map(|(_, count)| *count).max().unwrap_or(0);
            let label = |value: &SegmentValue<u32>| match value {
                SegmentValue::CenterOf(index) | SegmentValue::Exact(index) => self
                    .months
                    .get(*index as usize)
                    .map(|(month, _)| month.clone())
                    .unwrap_or_default(),
                SegmentValue::Last => String::new(),
            };

            let mut chart = ChartBuilder::on(root)
                .caption("Number of Journal Entries by Effective Month", (FONT_FAMILY, 24.0))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(60)
                .build_cartesian_2d((0u32..self.months.len() as u32).into_segmented(), 0u32..max + max / 10 + 1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(self.months.len())
                .x_label_formatter(&label)
                .x_desc("Month")
                .y_desc("Count")
                .axis_desc_style((FONT_FAMILY, 16.0))
                .draw()?;

            chart.draw_series(
                Histogram::vertical(&chart)
                    .style(BAR_COLOR.filled())
                    .margin(4)
                    .data(
                        self.months
                            .iter()
                            .enumerate()
                            .map(|(index, (_, count))| (index as u32, *count)),
                    ),
            )?;

            Ok(())
        })
    }
}

/// Observed and expected first-digit frequencies side by side.
pub struct BenfordComparison {
    digits: Vec<DigitFrequency>,
}

impl BenfordComparison {
    const BAR_WIDTH: f64 = 0.4;

    pub fn new(digits: Vec<DigitFrequency>) -> BenfordComparison {
        BenfordComparison { digits }
    }
}

impl Chart for BenfordComparison {
    fn file_name(&self) -> &'static str {
        BENFORD_FILE
    }

    fn skip_reason(&self) -> Option<&'static str> {
        self.digits.is_empty().then_some(NO_BENFORD_SAMPLE)
    }

    fn draw(&self, path: &Path) -> Result<(), ReportError> {
        render(path, self.file_name(), |root| {
            let top = self
                .digits
                .iter()
                .flat_map(|row| [row.observed, row.expected])
                .fold(0.0, f64::max);

            let mut chart = ChartBuilder::on(root)
                .caption("Benford's Law: Observed vs Expected First Digits", (FONT_FAMILY, 24.0))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(60)
                .build_cartesian_2d(0.5f64..9.5f64, 0f64..top * 1.15)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(9)
                .x_label_formatter(&|x: &f64| format!("{:.0}", x))
                .y_label_formatter(&|y: &f64| format!("{:.2}", y))
                .x_desc("First Digit")
                .y_desc("Frequency")
                .axis_desc_style((FONT_FAMILY, 16.0))
                .draw()?;

            chart
                .draw_series(self.digits.iter().map(|row| {
                    let x = f64::from(row.digit);
                    Rectangle::new([(x - Self::BAR_WIDTH, 0.0), (x, row.observed)], OBSERVED_COLOR.filled())
                }))?
                .label("Observed")
                .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], OBSERVED_COLOR.filled()));

            chart
                .draw_series(self.digits.iter().map(|row| {
                    let x = f64::from(row.digit);
                    Rectangle::new([(x, 0.0), (x + Self::BAR_WIDTH, row.expected)], EXPECTED_COLOR.filled())
                }))?
                .label("Expected (Benford)")
                .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], EXPECTED_COLOR.filled()));

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .label_font((FONT_FAMILY, 14.0))
                .background_style(WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;

            Ok(())
        })
    }
}

/// Share of entries per source. Sources past the top `limit` are drawn as one "Other" slice.
pub struct SourcePie {
    slices: Vec<(String, usize)>,
    collapsed: bool,
}

impl SourcePie {
    pub fn new(sources: &FrequencyTable, limit: usize) -> SourcePie {
        let collapsed = sources.len() > limit;
        SourcePie {
            slices: sources.collapse_top(limit, OTHER_SOURCES).iter().cloned().collect(),
            collapsed,
        }
    }

    fn slice_color(&self, index: usize) -> RGBColor {
        if self.collapsed && index + 1 == self.slices.len() {
            OTHER_COLOR
        } else {
            SLICE_COLORS[index % SLICE_COLORS.len()]
        }
    }
}

impl Chart for SourcePie {
    fn file_name(&self) -> &'static str {
        SOURCE_PIE_FILE
    }

    fn skip_reason(&self) -> Option<&'static str> {
        self.slices.is_empty().then_some(NO_SOURCES)
    }

    fn draw(&self, path: &Path) -> Result<(), ReportError> {
        render(path, self.file_name(), |root| {
            let area = root.titled("Journal Entries by Source", (FONT_FAMILY, 24.0).into_font())?;
            let (width, height) = area.dim_in_pixel();

            let center = (width as i32 / 2, height as i32 / 2);
            let radius = f64::from(width.min(height)) * 0.38;
            let sizes: Vec<f64> = self.slices.iter().map(|(_, count)| *count as f64).collect();
            let colors: Vec<RGBColor> = (0..self.slices.len()).map(|index| self.slice_color(index)).collect();
            let labels: Vec<&str> = self.slices.iter().map(|(name, _)| name.as_str()).collect();

            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            pie.start_angle(90.0);
            pie.label_style((FONT_FAMILY, 14.0).into_font().color(&BLACK));
            pie.percentages((FONT_FAMILY, 12.0).into_font().color(&WHITE));
            area.draw(&pie)?;

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sources(count: usize) -> FrequencyTable {
        let values: Vec<String> = (0..count)
            .flat_map(|i| std::iter::repeat(format!("S{:02}", i)).take(count - i))
            .collect();
        FrequencyTable::from_values("Source", values)
    }

    #[test]
    fn test_pie_collapses_small_sources() {
        let pie = SourcePie::new(&sources(13), 10);

        assert_eq!(pie.slices.len(), 11);
        assert_eq!(pie.slices[10], (OTHER_SOURCES.to_string(), 3 + 2 + 1));
        assert_eq!(pie.slice_color(10), OTHER_COLOR);
        assert_eq!(pie.slice_color(0), SLICE_COLORS[0]);
    }

    #[test]
    fn test_pie_keeps_ten_sources() {
        let pie = SourcePie::new(&sources(10), 10);

        assert_eq!(pie.slices.len(), 10);
        assert!(pie.slices.iter().all(|(name, _)| name != OTHER_SOURCES));
        assert_eq!(pie.slice_color(9), SLICE_COLORS[9]);
    }

    #[test]
    fn test_empty_charts_are_skipped() {
        assert_eq!(MonthlyEntries::new(&[]).skip_reason(), Some(NO_ENTRIES));
        assert_eq!(BenfordComparison::new(Vec::new()).skip_reason(), Some(NO_BENFORD_SAMPLE));
        assert_eq!(SourcePie::new(&FrequencyTable::default(), 10).skip_reason(), Some(NO_SOURCES));
    }

    #[test]
    fn test_chart_dispatch() {
        let chart: ChartKind = MonthlyEntries::new(&[]).into();
        assert_eq!(chart.file_name(), MONTHLY_ENTRIES_FILE);

        let chart: ChartKind = SourcePie::new(&sources(2), 10).into();
        assert_eq!(chart.file_name(), SOURCE_PIE_FILE);
        assert_eq!(chart.skip_reason(), None);
    }
}
