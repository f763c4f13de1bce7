use std::path::Path;

use crate::config::PipelineConfig;
use crate::data::merge::{deduplicate, merge};
use crate::data::model::Dataset;
use crate::data::parse::read_source;
use crate::data::writer::{write_batch_csv, write_dataset, write_json};
use crate::error::Result;
use crate::report;
use crate::stats::compare::{compare, CategoryDiff, CategoryMeans};
use crate::stats::summary::{summarize, FeatureSummary};

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Merged, deduplicated dataset.
    pub dataset: Dataset,
    pub summary: Vec<FeatureSummary>,
    pub means: CategoryMeans,
    pub diff: Option<CategoryDiff>,
}

/// Read every configured source, build the canonical dataset and compute both
/// reports from it.
pub fn run(config: &PipelineConfig) -> Result<Analysis> {
    let parsed = config
        .sources
        .iter()
        .map(|s| read_source(&s.path, &s.label, &config.category_column))
        .collect::<Result<Vec<_>>>()?;

    let dataset = deduplicate(&merge(&parsed)?);
    analyse(dataset, config)
}

/// Compute the reports for an already canonical dataset.
pub fn analyse(dataset: Dataset, config: &PipelineConfig) -> Result<Analysis> {
    let summary = summarize(&dataset, config.round_digits);
    let (means, diff) = compare(
        &dataset,
        dataset.category_column(),
        &config.group_a,
        &config.group_b,
    )?;

    Ok(Analysis {
        dataset,
        summary,
        means,
        diff,
    })
}

impl Analysis {
    /// Terminal rendering: preview, descriptive statistics, means and diff.
    pub fn render(&self, preview_rows: usize) -> Result<String> {
        let mut out = String::new();

        out.push_str(&format!(
            "Data preview ({} rows × {} columns)\n",
            self.dataset.len(),
            self.dataset.features().len() + 1
        ));
        out.push_str(&report::render(&[report::dataset_batch(
            &self.dataset.head(preview_rows),
        )?])?);

        out.push_str("\n\nDescriptive statistics\n");
        out.push_str(&report::render(&[report::summary_batch(&self.summary)?])?);

        out.push_str(&format!("\n\nMeans by {}\n", self.means.category_column()));
        out.push_str(&report::render(&[report::means_batch(&self.means)?])?);

        match &self.diff {
            Some(diff) => {
                out.push_str(&format!(
                    "\n\nDifferences ({} - {})\n",
                    diff.minuend(),
                    diff.subtrahend()
                ));
                out.push_str(&report::render(&[report::diff_batch(Some(diff))?])?);
            }
            None => out.push_str("\n\nDifferences: not available, a category is missing"),
        }
        out.push('\n');
        Ok(out)
    }

    /// Write `summary.csv`, `summary.json`, `means.csv`, `means.json` and
    /// `diff.csv` into `dir`, creating it if needed.
    pub fn write_reports(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .map_err(|e| crate::error::Error::export(dir.display().to_string(), e))?;

        write_batch_csv(&report::summary_batch(&self.summary)?, &dir.join("summary.csv"))?;
        write_json(&self.summary, &dir.join("summary.json"))?;
        write_batch_csv(&report::means_batch(&self.means)?, &dir.join("means.csv"))?;
        write_json(&self.means, &dir.join("means.json"))?;
        write_batch_csv(&report::diff_batch(self.diff.as_ref())?, &dir.join("diff.csv"))?;

        log::info!("reports written to {}", dir.display());
        Ok(())
    }

    pub fn export_dataset(&self, path: &Path) -> Result<()> {
        write_dataset(&self.dataset, path)
    }
}
