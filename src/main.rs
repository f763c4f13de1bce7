use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use wine_explorer::config::{PipelineConfig, SourceSpec};
use wine_explorer::pipeline;

/// Clean, merge and summarise per-category wine quality sheets.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input sheet as LABEL=PATH (repeatable), e.g. red=winequality-red.csv
    #[arg(short, long = "source", value_parser = parse_source)]
    sources: Vec<SourceSpec>,

    /// Name of the appended category column
    #[arg(long)]
    category_column: Option<String>,

    /// Decimals for summary statistics (0 = unrounded)
    #[arg(short, long)]
    round: Option<u32>,

    /// Category subtracted in the mean difference
    #[arg(long)]
    group_a: Option<String>,

    /// Category the mean difference is taken from
    #[arg(long)]
    group_b: Option<String>,

    /// Rows shown in the data preview
    #[arg(long)]
    preview: Option<usize>,

    /// Write the canonical dataset here (.csv, .json or .parquet)
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Directory for summary/means/diff report files
    #[arg(long)]
    report_dir: Option<PathBuf>,
}

fn parse_source(s: &str) -> Result<SourceSpec, String> {
    SourceSpec::parse_arg(s).map_err(|e| e.to_string())
}

impl Args {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        if !self.sources.is_empty() {
            config.sources = self.sources;
        }
        if let Some(v) = self.category_column {
            config.category_column = v;
        }
        if let Some(v) = self.round {
            config.round_digits = v;
        }
        if let Some(v) = self.group_a {
            config.group_a = v;
        }
        if let Some(v) = self.group_b {
            config.group_b = v;
        }
        if let Some(v) = self.preview {
            config.preview_rows = v;
        }
        if self.export.is_some() {
            config.export = self.export;
        }
        if self.report_dir.is_some() {
            config.report_dir = self.report_dir;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Args::parse().into_config()?;
    log::debug!("config: {config:?}");

    let analysis = pipeline::run(&config).context("building the canonical dataset")?;
    print!("{}", analysis.render(config.preview_rows)?);

    if let Some(path) = &config.export {
        analysis
            .export_dataset(path)
            .with_context(|| format!("exporting dataset to {}", path.display()))?;
    }
    if let Some(dir) = &config.report_dir {
        analysis
            .write_reports(dir)
            .with_context(|| format!("writing reports to {}", dir.display()))?;
    }

    Ok(())
}
