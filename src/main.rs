use anyhow::{Context, Result};
use env_logger::Env;
use log::info;
use std::env;

use je_analyzer::analysis;
use je_analyzer::config::AnalysisConfig;
use je_analyzer::data;
use je_analyzer::report;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(config) = AnalysisConfig::from_args(&args) else {
        eprintln!("Usage: cargo run -- [input_file] [output_dir]");
        std::process::exit(1);
    };

    info!("Reading {}...", config.input.display());
    let raw = data::load_table(&config.input)
        .with_context(|| format!("Error reading file {}", config.input.display()))?;

    let analysis = analysis::analyze(&raw).context("Error cleaning journal entries")?;
    report::write_report(&analysis, &config)
        .with_context(|| format!("Error writing report to {}", config.output_dir.display()))?;

    Ok(())
}
