use std::fs;
use std::path::{Path, PathBuf};

use enum_dispatch::enum_dispatch;
use log::{info, warn};
use thiserror::Error;

pub mod charts;
pub mod fonts;
pub mod summary_text;

use crate::analysis::Analysis;
use crate::config::{AnalysisConfig, FONT_ENV};
use charts::{BenfordComparison, ChartKind, MonthlyEntries, SourcePie};

pub const SUMMARY_FILE: &str = "summary.txt";

pub const NO_FONT: &str = "no TrueType font available for chart text";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render {file}: {message}")]
    Render { file: &'static str, message: String },
}

#[enum_dispatch]
pub trait Chart {
    /// File name under the output directory.
    fn file_name(&self) -> &'static str;

    /// Set when there is nothing to draw.
    fn skip_reason(&self) -> Option<&'static str>;

    fn draw(&self, path: &Path) -> Result<(), ReportError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartStatus {
    Written(PathBuf),
    Skipped(&'static str),
}

#[derive(Debug)]
pub struct ReportOutcome {
    pub summary: PathBuf,
    pub charts: Vec<(&'static str, ChartStatus)>,
}

impl ReportOutcome {
    pub fn chart(&self, file_name: &str) -> Option<&ChartStatus> {
        self.charts
            .iter()
            .find(|(name, _)| *name == file_name)
            .map(|(_, status)| status)
    }
}

/// Writes `summary.txt` and the charts into the output directory, creating it if needed.
/// Existing files are overwritten.
pub fn write_report(analysis: &Analysis, config: &AnalysisConfig) -> Result<ReportOutcome, ReportError> {
    let output_dir = &config.output_dir;
    fs::create_dir_all(output_dir).map_err(|source| ReportError::Io {
        path: output_dir.clone(),
        source,
    })?;

    let summary = output_dir.join(SUMMARY_FILE);
    fs::write(&summary, summary_text::render(analysis)).map_err(|source| ReportError::Io {
        path: summary.clone(),
        source,
    })?;
    info!("Summary written to {}", summary.display());

    let has_font = fonts::ensure_font(config.font_path.as_deref()).is_some();
    if !has_font {
        warn!("{}, set {} to a .ttf file to draw charts", NO_FONT, FONT_ENV);
    }

    let mut charts = Vec::new();
    for chart in charts::charts(analysis, config.top_sources) {
        let status = draw_chart(&chart, output_dir, has_font)?;
        charts.push((chart.file_name(), status));
    }

    Ok(ReportOutcome { summary, charts })
}

fn draw_chart(chart: &ChartKind, output_dir: &Path, has_font: bool) -> Result<ChartStatus, ReportError> {
    let reason = chart.skip_reason().or((!has_font).then_some(NO_FONT));
    if let Some(reason) = reason {
        warn!("skipping {}, reason={}", chart.file_name(), reason);
        return Ok(ChartStatus::Skipped(reason));
    }

    let path = output_dir.join(chart.file_name());
    chart.draw(&path)?;
    info!("Plot saved to {}", path.display());

    Ok(ChartStatus::Written(path))
}
