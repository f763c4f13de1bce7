use std::collections::BTreeMap;
use std::path::Path;

use super::loader::load_file;
use super::model::{
    is_placeholder, Cell, Dataset, RawCell, RawTable, Row, DEFAULT_CATEGORY_COLUMN,
    PLACEHOLDER_PREFIX,
};
use crate::error::{Error, Result};

/// Grid row that holds the column headers; the row above it is decorative.
const HEADER_ROW: usize = 1;

/// Parse a raw sheet into a clean dataset tagged with `category_label`, using
/// the default `type` category column.
pub fn parse(source: &RawTable, category_label: &str) -> Result<Dataset> {
    parse_with(source, category_label, DEFAULT_CATEGORY_COLUMN)
}

/// Parse a raw sheet into a clean dataset.
///
/// * row 0 is skipped, row 1 names the columns, the rest is data
/// * placeholder columns (blank header cells) are dropped
/// * every remaining cell is coerced to a number or missing
/// * every row gets `category_label` in `category_column`
/// * rows with no feature value at all are dropped
pub fn parse_with(
    source: &RawTable,
    category_label: &str,
    category_column: &str,
) -> Result<Dataset> {
    let header = source
        .rows
        .get(HEADER_ROW)
        .ok_or_else(|| Error::Schema(format!("source has {} rows, no header row", source.len())))?;

    let names = header_names(header);

    // (source column index, feature name) of every column kept.
    let mut kept: Vec<(usize, String)> = Vec::new();
    for (idx, name) in names.into_iter().enumerate() {
        if is_placeholder(&name) {
            log::debug!("dropping placeholder column `{name}`");
        } else if name == category_column {
            log::warn!(
                "source column `{name}` is replaced by the category column (label `{category_label}`)"
            );
        } else {
            kept.push((idx, name));
        }
    }

    if kept.is_empty() {
        return Err(Error::Schema(
            "no feature columns left after removing placeholder columns".to_string(),
        ));
    }

    let data_rows = source.rows.iter().skip(HEADER_ROW + 1);
    let rows: Vec<Row> = data_rows
        .map(|raw| {
            let values = kept
                .iter()
                .map(|(idx, _)| raw.get(*idx).map(RawCell::coerce).unwrap_or(Cell::Missing))
                .collect();
            Row::new(values, category_label)
        })
        .collect();

    let read = rows.len();
    let features = kept.into_iter().map(|(_, name)| name).collect();
    let dataset = Dataset::new(features, category_column, rows)?;

    log::info!(
        "parsed `{category_label}`: {} features, {} of {read} data rows kept",
        dataset.features().len(),
        dataset.len()
    );
    Ok(dataset)
}

/// Read and parse one source file in a single step.
pub fn read_source(path: &Path, category_label: &str, category_column: &str) -> Result<Dataset> {
    let raw = load_file(path)?;
    parse_with(&raw, category_label, category_column)
}

/// Column names from the header row: blank cells become `Unnamed: {idx}`, later
/// repeats of a name get `.1`, `.2`, ... appended.
fn header_names(header: &[RawCell]) -> Vec<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut names = Vec::with_capacity(header.len());

    for (idx, cell) in header.iter().enumerate() {
        let base = cell
            .header_text()
            .unwrap_or_else(|| format!("{PLACEHOLDER_PREFIX}: {idx}"));

        let mut name = base.clone();
        let seen = counts.entry(base.clone()).or_insert(0);
        while *seen > 0 && names.contains(&name) {
            name = format!("{base}.{seen}");
            *seen += 1;
        }
        if *seen == 0 {
            *seen = 1;
        }
        if name != base {
            log::debug!("renamed duplicate header `{base}` to `{name}`");
        }
        names.push(name);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawCell {
        RawCell::from_text(s)
    }

    fn grid(rows: &[&[&str]]) -> RawTable {
        RawTable::new(rows.iter().map(|r| r.iter().map(|c| text(c)).collect()).collect())
    }

    #[test]
    fn skips_banner_and_drops_placeholder_columns() {
        let raw = grid(&[
            &["Red wine export", "", ""],
            &["alcohol", "", "quality"],
            &["9.4", "note", "5"],
            &["9.8", "", "6"],
        ]);
        let ds = parse(&raw, "red").unwrap();
        assert_eq!(ds.features(), ["alcohol", "quality"]);
        assert_eq!(ds.category_column(), "type");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[0].values(), [Cell::Numeric(9.4), Cell::Numeric(5.0)]);
        assert!(ds.rows().iter().all(|r| r.category() == "red"));
    }

    #[test]
    fn explicit_unnamed_headers_are_placeholders() {
        let raw = grid(&[&[""], &["pH", "Unnamed: 5"], &["3.2", "1"]]);
        let ds = parse(&raw, "white").unwrap();
        assert_eq!(ds.features(), ["pH"]);
    }

    #[test]
    fn junk_cells_become_missing_and_empty_rows_are_dropped() {
        let raw = grid(&[
            &[""],
            &["a", "b"],
            &["1", "oops"],
            &["", "n/a"],
            &["x", "2"],
        ]);
        let ds = parse(&raw, "red").unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[0].values(), [Cell::Numeric(1.0), Cell::Missing]);
        assert_eq!(ds.rows()[1].values(), [Cell::Missing, Cell::Numeric(2.0)]);
    }

    #[test]
    fn ragged_rows_are_padded_and_truncated() {
        let raw = grid(&[&[""], &["a", "b"], &["1"], &["1", "2", "3"]]);
        let ds = parse(&raw, "red").unwrap();
        assert_eq!(ds.rows()[0].values(), [Cell::Numeric(1.0), Cell::Missing]);
        assert_eq!(ds.rows()[1].values(), [Cell::Numeric(1.0), Cell::Numeric(2.0)]);
    }

    #[test]
    fn duplicate_and_numeric_headers_get_distinct_names() {
        let raw = RawTable::new(vec![
            vec![],
            vec![text("a"), text("a"), RawCell::Number(5.0), text("a")],
            vec![RawCell::Number(1.0); 4],
        ]);
        let ds = parse(&raw, "red").unwrap();
        assert_eq!(ds.features(), ["a", "a.1", "5", "a.2"]);
    }

    #[test]
    fn source_category_column_is_replaced() {
        let raw = grid(&[&[""], &["type", "alcohol"], &["R", "9"]]);
        let ds = parse(&raw, "red").unwrap();
        assert_eq!(ds.features(), ["alcohol"]);
        assert_eq!(ds.rows()[0].category(), "red");
    }

    #[test]
    fn custom_category_column() {
        let raw = grid(&[&[""], &["alcohol"], &["9"]]);
        let ds = parse_with(&raw, "rosé", "colour").unwrap();
        assert_eq!(ds.category_column(), "colour");
        assert_eq!(ds.rows()[0].category(), "rosé");
    }

    #[test]
    fn no_usable_columns_is_a_schema_error() {
        let raw = grid(&[&["banner"], &["", ""], &["1", "2"]]);
        assert!(matches!(parse(&raw, "red"), Err(Error::Schema(_))));
    }

    #[test]
    fn missing_header_row_is_a_schema_error() {
        let raw = grid(&[&["banner only"]]);
        assert!(matches!(parse(&raw, "red"), Err(Error::Schema(_))));
        assert!(matches!(parse(&RawTable::default(), "red"), Err(Error::Schema(_))));
    }

    #[test]
    fn header_only_source_is_an_empty_dataset() {
        let raw = grid(&[&[""], &["a"]]);
        let ds = parse(&raw, "red").unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.features(), ["a"]);
    }
}
