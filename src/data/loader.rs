use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::datatypes::DataType;
use calamine::{open_workbook_auto, Data, Range, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{RawCell, RawTable};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read one raw source into a grid of cells.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet of a workbook
/// * `.csv` / `.tsv` – a spreadsheet export, one grid row per line
/// * `.json`         – `[[cell, cell, ...], [cell, ...], ...]`
/// * `.parquet`      – every record batch row is a grid row; field names are ignored
///
/// No header interpretation happens here; see [`super::parse`].
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path),
        "csv" => load_delimited(path, b','),
        "tsv" => load_delimited(path, b'\t'),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => return Err(Error::UnsupportedFormat(other.to_string())),
    }?;

    log::info!("read {} grid rows from {}", table.len(), path.display());
    Ok(table)
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

/// Read the first worksheet of a workbook.
fn load_workbook(path: &Path) -> Result<RawTable> {
    let origin = path.display().to_string();
    let mut workbook =
        open_workbook_auto(path).map_err(|e| Error::source_read(&origin, e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::source_read(&origin, "workbook has no worksheet"))?
        .map_err(|e| Error::source_read(&origin, e.to_string()))?;
    Ok(range_to_table(&range))
}

/// A worksheet range only spans the used cells, so leading blank rows and
/// columns are put back to keep row 0 / row 1 where the sheet has them.
fn range_to_table(range: &Range<Data>) -> RawTable {
    let Some((first_row, first_col)) = range.start() else {
        return RawTable::default();
    };

    let mut rows: Vec<Vec<RawCell>> = (0..first_row).map(|_| Vec::new()).collect();
    for cells in range.rows() {
        let mut row = vec![RawCell::Empty; first_col as usize];
        row.extend(cells.iter().map(workbook_cell));
        rows.push(row);
    }
    RawTable::new(rows)
}

fn workbook_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::String(s) => RawCell::from_text(s),
        Data::Float(v) => RawCell::Number(*v),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_delimited(path: &Path, delimiter: u8) -> Result<RawTable> {
    let origin = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| Error::source_read(&origin, e))?;
    read_delimited(file, delimiter, &origin)
}

/// Read delimited text with no header handling and ragged rows allowed.
/// Blank fields become [`RawCell::Empty`].
///
/// The csv reader skips empty lines, but an empty line is still a sheet row (a
/// blank banner above the header, say), so each one is put back as an empty
/// grid row.
pub fn read_delimited<R: Read>(mut reader: R, delimiter: u8, origin: &str) -> Result<RawTable> {
    let mut raw = Vec::new();
    reader
        .read_to_end(&mut raw)
        .map_err(|e| Error::source_read(origin, e))?;
    let buf = normalize_newlines(&raw);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(buf.as_slice());

    // (blank lines skipped just before the record, record cells)
    let mut records: Vec<(i64, Vec<RawCell>)> = Vec::new();
    let mut record = csv::StringRecord::new();
    loop {
        let before = reader.position().line();
        let more = reader.read_record(&mut record).map_err(|e| {
            Error::source_read(format!("{origin}, row {}", records.len()), e)
        })?;
        if !more {
            break;
        }
        let spanned = (reader.position().line() - before) as i64;
        let embedded = record
            .iter()
            .map(|f| f.bytes().filter(|&b| b == b'\n').count())
            .sum::<usize>() as i64;
        records.push((
            spanned - embedded - 1,
            record.iter().map(RawCell::from_text).collect(),
        ));
    }

    // The final record has no terminator when the text lacks a trailing newline.
    if !buf.ends_with(b"\n") {
        if let Some(last) = records.last_mut() {
            last.0 += 1;
        }
    }

    let mut rows: Vec<Vec<RawCell>> = Vec::with_capacity(records.len());
    for (skipped, cells) in records {
        rows.extend(std::iter::repeat_with(Vec::new).take(skipped.max(0) as usize));
        rows.push(cells);
    }
    Ok(RawTable::new(rows))
}

/// `\r\n` and lone `\r` become `\n`, so every record consumes its own
/// terminator and the reader's line count lines up with sheet rows.
fn normalize_newlines(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut bytes = raw.iter().copied().peekable();
    while let Some(b) = bytes.next() {
        if b == b'\r' {
            bytes.next_if_eq(&b'\n');
            out.push(b'\n');
        } else {
            out.push(b);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON layout (a sheet dumped row by row):
///
/// ```json
/// [
///   ["Red wine quality", null, null],
///   ["fixed acidity", "pH", "quality"],
///   [7.4, 3.51, 5],
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RawTable> {
    let origin = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| Error::source_read(&origin, e))?;
    read_json(&text, &origin)
}

pub fn read_json(text: &str, origin: &str) -> Result<RawTable> {
    let root: JsonValue =
        serde_json::from_str(text).map_err(|e| Error::source_read(origin, e))?;

    let records = root
        .as_array()
        .ok_or_else(|| Error::source_read(origin, "expected a top-level JSON array"))?;

    let rows = records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            rec.as_array()
                .map(|cells| cells.iter().map(json_to_cell).collect::<Vec<RawCell>>())
                .ok_or_else(|| Error::source_read(origin, format!("row {i} is not a JSON array")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RawTable::new(rows))
}

fn json_to_cell(val: &JsonValue) -> RawCell {
    match val {
        JsonValue::Null => RawCell::Empty,
        JsonValue::String(s) => RawCell::from_text(s),
        JsonValue::Number(n) => n
            .as_f64()
            .map(RawCell::Number)
            .unwrap_or_else(|| RawCell::Text(n.to_string())),
        JsonValue::Bool(b) => RawCell::Bool(*b),
        other => RawCell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet sheet export.
///
/// The file's own field names are ignored: a sheet exported without header
/// interpretation keeps its banner and header lines as ordinary rows, so every
/// record batch row maps to one grid row.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let origin = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| Error::source_read(&origin, e))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| Error::source_read(&origin, e))?;
    let reader = builder.build().map_err(|e| Error::source_read(&origin, e))?;

    let mut rows: Vec<Vec<RawCell>> = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| Error::source_read(&origin, e))?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable::new(rows))
}

// -- Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> RawCell {
    if col.is_null(row) {
        return RawCell::Empty;
    }
    match col.data_type() {
        DataType::Utf8 => RawCell::from_text(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => RawCell::from_text(col.as_string::<i64>().value(row)),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| RawCell::Number(a.value(row) as f64))
            .unwrap_or(RawCell::Empty),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| RawCell::Number(a.value(row) as f64))
            .unwrap_or(RawCell::Empty),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| RawCell::Number(a.value(row) as f64))
            .unwrap_or(RawCell::Empty),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| RawCell::Number(a.value(row)))
            .unwrap_or(RawCell::Empty),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|a| RawCell::Bool(a.value(row)))
            .unwrap_or(RawCell::Empty),
        DataType::Null => RawCell::Empty,
        other => RawCell::Text(format!("{other:?}")),
    }
}
