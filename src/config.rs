use std::env;
use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "je_samples.xlsx";
pub const DEFAULT_OUTPUT_DIR: &str = "analysis_output";
pub const FONT_ENV: &str = "JE_ANALYZER_FONT";

/// Where to read from and write to, and how the charts are drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Sources shown individually in the pie chart; the rest become "Other".
    pub top_sources: usize,
    /// TrueType font for chart text. Common system fonts are tried when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            top_sources: 10,
            font_path: None,
        }
    }
}

impl AnalysisConfig {
    /// Builds the config from `[input_file] [output_dir]`. Returns `None` on extra arguments.
    pub fn from_args(args: &[String]) -> Option<AnalysisConfig> {
        if args.len() > 2 {
            return None;
        }

        let mut config = AnalysisConfig {
            font_path: env::var_os(FONT_ENV).map(PathBuf::from),
            ..AnalysisConfig::default()
        };
        if let Some(input) = args.first() {
            config.input = PathBuf::from(input);
        }
        if let Some(output_dir) = args.get(1) {
            config.output_dir = PathBuf::from(output_dir);
        }

        Some(config)
    }
}
