use std::collections::{BTreeSet, HashSet};

use super::model::{Dataset, Row};
use crate::error::{Error, Result};

/// Concatenate datasets that share a schema, sources in the order given.
///
/// Every input must have the same feature names and the same category column.
/// Inputs listing the same features in a different order are aligned to the
/// first input's column order.
pub fn merge(datasets: &[Dataset]) -> Result<Dataset> {
    let first = datasets
        .first()
        .ok_or_else(|| Error::Schema("no datasets to merge".to_string()))?;
    let features = first.features().to_vec();
    let expected: BTreeSet<&str> = features.iter().map(String::as_str).collect();

    let mut rows: Vec<Row> = Vec::with_capacity(datasets.iter().map(Dataset::len).sum());
    for ds in datasets {
        let found: BTreeSet<&str> = ds.features().iter().map(String::as_str).collect();
        if found != expected || ds.category_column() != first.category_column() {
            return Err(Error::SchemaMismatch {
                expected: describe_schema(first),
                found: describe_schema(ds),
            });
        }

        if ds.features() == first.features() {
            rows.extend(ds.rows().iter().cloned());
        } else {
            log::debug!("aligning column order of a merge input to the first dataset");
            let order: Vec<usize> = features
                .iter()
                .filter_map(|name| ds.feature_index(name))
                .collect();
            rows.extend(ds.rows().iter().map(|row| {
                Row::new(order.iter().map(|&i| row.get(i)).collect(), row.category())
            }));
        }
    }

    let merged = Dataset::new(features, first.category_column(), rows)?;
    log::info!("merged {} datasets into {} rows", datasets.len(), merged.len());
    Ok(merged)
}

/// Drop rows that repeat an earlier row exactly (all features and the category
/// label; missing matches missing). The first occurrence is kept.
pub fn deduplicate(dataset: &Dataset) -> Dataset {
    let mut seen: HashSet<&Row> = HashSet::with_capacity(dataset.len());
    let rows: Vec<Row> = dataset
        .rows()
        .iter()
        .filter(|row| seen.insert(*row))
        .cloned()
        .collect();

    let removed = dataset.len() - rows.len();
    if removed > 0 {
        log::info!("removed {removed} duplicate rows, {} remain", rows.len());
    }

    dataset.with_rows(rows)
}

fn describe_schema(ds: &Dataset) -> String {
    let mut cols: Vec<&str> = ds.features().iter().map(String::as_str).collect();
    cols.push(ds.category_column());
    cols.join(", ")
}
