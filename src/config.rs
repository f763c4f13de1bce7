use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::data::model::DEFAULT_CATEGORY_COLUMN;

/// One input sheet and the category label its rows receive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceSpec {
    pub label: String,
    pub path: PathBuf,
}

impl SourceSpec {
    /// Parse the command-line form `LABEL=PATH`.
    pub fn parse_arg(s: &str) -> Result<Self> {
        let Some((label, path)) = s.split_once('=') else {
            bail!("expected LABEL=PATH, got `{s}`");
        };
        let label = label.trim();
        if label.is_empty() || path.is_empty() {
            bail!("expected LABEL=PATH, got `{s}`");
        }
        Ok(SourceSpec {
            label: label.to_string(),
            path: PathBuf::from(path),
        })
    }
}

/// Pipeline settings, read from a TOML file and/or the command line.
///
/// ```toml
/// round_digits = 2
/// group_a = "red"
/// group_b = "white"
///
/// [[sources]]
/// label = "red"
/// path = "winequality-red.csv"
///
/// [[sources]]
/// label = "white"
/// path = "winequality-white.csv"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub category_column: String,
    /// Decimals for summary statistics; 0 leaves them unrounded.
    pub round_digits: u32,
    /// Subtrahend of the mean difference.
    pub group_a: String,
    /// Minuend of the mean difference.
    pub group_b: String,
    pub preview_rows: usize,
    pub sources: Vec<SourceSpec>,
    /// Where to write the canonical dataset (format by extension).
    pub export: Option<PathBuf>,
    /// Directory for summary/means/diff report files.
    pub report_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            category_column: DEFAULT_CATEGORY_COLUMN.to_string(),
            round_digits: 2,
            group_a: "red".to_string(),
            group_b: "white".to_string(),
            preview_rows: 5,
            sources: Vec::new(),
            export: None,
            report_dir: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing pipeline config")
    }

    /// Load a TOML config. Relative source paths are resolved against the
    /// config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config = Self::from_toml_str(&text)
            .with_context(|| format!("in config {}", path.display()))?;

        if let Some(base) = path.parent() {
            for source in &mut config.sources {
                if source.path.is_relative() {
                    source.path = base.join(&source.path);
                }
            }
        }
        Ok(config)
    }

    /// Checks that do not need any file access.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            bail!("no sources configured; pass --source LABEL=PATH or list [[sources]] in the config");
        }
        if self.category_column.trim().is_empty() {
            bail!("category column name must not be empty");
        }
        Ok(())
    }
}
