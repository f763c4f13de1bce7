//! Tabular views of the pipeline's outputs as Arrow record batches, the form the
//! rendering side consumes, plus a plain-text table for terminals.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::data::model::Dataset;
use crate::error::{Error, Result};
use crate::stats::compare::{CategoryDiff, CategoryMeans};
use crate::stats::summary::FeatureSummary;

/// Label column of the summary and diff tables.
pub const FEATURE_COLUMN: &str = "feature";

/// The dataset itself: one nullable Float64 column per feature (missing → null)
/// followed by the Utf8 category column.
pub fn dataset_batch(dataset: &Dataset) -> Result<RecordBatch> {
    let mut fields: Vec<Field> = dataset
        .features()
        .iter()
        .map(|name| Field::new(name, DataType::Float64, true))
        .collect();
    fields.push(Field::new(dataset.category_column(), DataType::Utf8, false));

    let mut columns: Vec<ArrayRef> = (0..dataset.features().len())
        .map(|idx| {
            let values: Float64Array = dataset.column(idx).map(|c| c.as_f64()).collect();
            Arc::new(values) as ArrayRef
        })
        .collect();
    columns.push(Arc::new(StringArray::from_iter_values(
        dataset.rows().iter().map(|r| r.category()),
    )));

    batch(fields, columns, "dataset")
}

/// `feature | count | mean | std | min | 25% | 50% | 75% | max`.
pub fn summary_batch(summary: &[FeatureSummary]) -> Result<RecordBatch> {
    let float = |name: &str| Field::new(name, DataType::Float64, false);
    let fields = vec![
        Field::new(FEATURE_COLUMN, DataType::Utf8, false),
        Field::new("count", DataType::Int64, false),
        float("mean"),
        float("std"),
        float("min"),
        float("25%"),
        float("50%"),
        float("75%"),
        float("max"),
    ];

    let stat = |f: fn(&FeatureSummary) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from_iter_values(summary.iter().map(f)))
    };
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            summary.iter().map(|s| s.feature.as_str()),
        )),
        Arc::new(Int64Array::from_iter_values(
            summary.iter().map(|s| s.count as i64),
        )),
        stat(|s| s.mean),
        stat(|s| s.std),
        stat(|s| s.min),
        stat(|s| s.q25),
        stat(|s| s.q50),
        stat(|s| s.q75),
        stat(|s| s.max),
    ];

    batch(fields, columns, "summary")
}

/// One row per category: the grouping column, then one column per feature.
pub fn means_batch(means: &CategoryMeans) -> Result<RecordBatch> {
    let mut fields = vec![Field::new(means.category_column(), DataType::Utf8, false)];
    fields.extend(
        means
            .features()
            .iter()
            .map(|f| Field::new(f, DataType::Float64, false)),
    );

    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from_iter_values(
        means.categories(),
    ))];
    for idx in 0..means.features().len() {
        columns.push(Arc::new(Float64Array::from_iter_values(means.column(idx))));
    }

    batch(fields, columns, "means")
}

/// `feature | difference`; an absent diff gives an empty table.
pub fn diff_batch(diff: Option<&CategoryDiff>) -> Result<RecordBatch> {
    let fields = vec![
        Field::new(FEATURE_COLUMN, DataType::Utf8, false),
        Field::new("difference", DataType::Float64, false),
    ];
    let (features, values): (Vec<&str>, Vec<f64>) =
        diff.map(|d| d.iter().unzip()).unwrap_or_default();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(features)),
        Arc::new(Float64Array::from(values)),
    ];
    batch(fields, columns, "diff")
}

/// Render batches as an ASCII table.
pub fn render(batches: &[RecordBatch]) -> Result<String> {
    pretty_format_batches(batches)
        .map(|table| table.to_string())
        .map_err(|e| Error::export("table", e))
}

fn batch(fields: Vec<Field>, columns: Vec<ArrayRef>, what: &str) -> Result<RecordBatch> {
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(|e| Error::export(what, e))
}
