use std::fs::File;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::model::Dataset;
use crate::error::{Error, Result};
use crate::report::dataset_batch;

/// Write the dataset for downstream consumers.  Dispatch by extension.
///
/// * `.csv`     – header row, missing cells left blank
/// * `.json`    – records: `[{"alcohol": 9.4, ..., "type": "red"}, ...]`, missing → `null`
/// * `.parquet` – nullable Float64 feature columns plus a Utf8 category column
pub fn write_dataset(dataset: &Dataset, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => write_dataset_csv(dataset, path),
        "json" => write_json(&dataset_records(dataset), path),
        "parquet" | "pq" => write_parquet(&dataset_batch(dataset)?, path),
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }?;

    log::info!("wrote {} rows to {}", dataset.len(), path.display());
    Ok(())
}

fn write_dataset_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let target = path.display().to_string();
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::export(&target, e))?;

    let mut header: Vec<&str> = dataset.features().iter().map(String::as_str).collect();
    header.push(dataset.category_column());
    writer.write_record(&header).map_err(|e| Error::export(&target, e))?;

    for row in dataset.rows() {
        let mut record: Vec<String> = row
            .values()
            .iter()
            .map(|c| c.as_f64().map(|v| v.to_string()).unwrap_or_default())
            .collect();
        record.push(row.category().to_string());
        writer.write_record(&record).map_err(|e| Error::export(&target, e))?;
    }
    writer.flush().map_err(|e| Error::export(&target, e))
}

fn dataset_records(dataset: &Dataset) -> Vec<JsonMap<String, JsonValue>> {
    dataset
        .rows()
        .iter()
        .map(|row| {
            let mut obj: JsonMap<String, JsonValue> = dataset
                .features()
                .iter()
                .zip(row.values())
                .map(|(name, cell)| (name.clone(), cell.as_f64().into()))
                .collect();
            obj.insert(
                dataset.category_column().to_string(),
                JsonValue::String(row.category().to_string()),
            );
            obj
        })
        .collect()
}

/// Serialize any report to pretty JSON. Non-finite floats become `null`.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let target = path.display().to_string();
    let file = File::create(path).map_err(|e| Error::export(&target, e))?;
    serde_json::to_writer_pretty(file, value).map_err(|e| Error::export(&target, e))
}

/// Write a report table as CSV with a header row.
pub fn write_batch_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    let target = path.display().to_string();
    let file = File::create(path).map_err(|e| Error::export(&target, e))?;
    let mut writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .build(file);
    writer.write(batch).map_err(|e| Error::export(&target, e))
}

/// Write a record batch to a Parquet file.
pub fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let target = path.display().to_string();
    let file = File::create(path).map_err(|e| Error::export(&target, e))?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).map_err(|e| Error::export(&target, e))?;
    writer.write(batch).map_err(|e| Error::export(&target, e))?;
    writer.close().map_err(|e| Error::export(&target, e))?;
    Ok(())
}
