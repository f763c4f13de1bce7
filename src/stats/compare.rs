use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::summary::mean;
use crate::data::model::{format_number, Dataset};
use crate::error::{Error, Result};

/// Mean of every compared feature, per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMeans {
    category_column: String,
    features: Vec<String>,
    categories: Vec<String>,
    // One row per category, each aligned with `features`.
    means: Vec<Vec<f64>>,
}

impl CategoryMeans {
    /// Column the rows were grouped by.
    pub fn category_column(&self) -> &str {
        &self.category_column
    }

    /// Features in dataset order (the grouping column excluded).
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Category labels. Text labels sort lexically, feature values numerically.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Means of one category, aligned with [`features`](Self::features).
    pub fn means_of(&self, category: &str) -> Option<&[f64]> {
        let idx = self.categories.iter().position(|c| c == category)?;
        self.means.get(idx).map(Vec::as_slice)
    }

    pub fn get(&self, category: &str, feature: &str) -> Option<f64> {
        let idx = self.features.iter().position(|f| f == feature)?;
        self.means_of(category)?.get(idx).copied()
    }

    /// Means of one feature across categories, in category order.
    pub fn column(&self, feature_idx: usize) -> impl Iterator<Item = f64> + '_ {
        self.means
            .iter()
            .map(move |m| m.get(feature_idx).copied().unwrap_or(f64::NAN))
    }
}

/// Feature-wise `means[minuend] - means[subtrahend]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDiff {
    minuend: String,
    subtrahend: String,
    features: Vec<String>,
    values: Vec<f64>,
}

impl CategoryDiff {
    pub fn minuend(&self) -> &str {
        &self.minuend
    }

    pub fn subtrahend(&self) -> &str {
        &self.subtrahend
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(feature, difference)` pairs in feature order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.features
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        let idx = self.features.iter().position(|f| f == feature)?;
        self.values.get(idx).copied()
    }
}

// What the rows are grouped by.
enum GroupKey {
    Category,
    Feature(usize),
}

// Group label. Feature values order by number, so "9" comes before "10".
#[derive(Debug, Clone)]
enum Label {
    Text(String),
    Number(f64),
}

impl Label {
    fn render(&self) -> String {
        match self {
            Label::Text(s) => s.clone(),
            Label::Number(v) => format_number(*v),
        }
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Label {}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Label::Text(a), Label::Text(b)) => a.cmp(b),
            // -0.0 and 0.0 are one group.
            (Label::Number(a), Label::Number(b)) => (a + 0.0).total_cmp(&(b + 0.0)),
            (Label::Number(_), Label::Text(_)) => Ordering::Less,
            (Label::Text(_), Label::Number(_)) => Ordering::Greater,
        }
    }
}

/// Group rows by `category_col` and average every other feature per group.
///
/// `category_col` is normally the dataset's category column but may name a
/// feature, in which case its distinct non-missing values form the groups.
/// The diff is `group_b - group_a` and is `None` unless both groups exist.
pub fn compare(
    dataset: &Dataset,
    category_col: &str,
    group_a: &str,
    group_b: &str,
) -> Result<(CategoryMeans, Option<CategoryDiff>)> {
    let key = if category_col == dataset.category_column() {
        GroupKey::Category
    } else {
        dataset
            .feature_index(category_col)
            .map(GroupKey::Feature)
            .ok_or_else(|| Error::UnknownColumn(category_col.to_string()))?
    };

    let compared: Vec<usize> = (0..dataset.features().len())
        .filter(|&i| !matches!(key, GroupKey::Feature(k) if k == i))
        .collect();

    // label → per-feature non-missing values
    let mut groups: BTreeMap<Label, Vec<Vec<f64>>> = BTreeMap::new();
    for row in dataset.rows() {
        let label = match key {
            GroupKey::Category => Label::Text(row.category().to_string()),
            GroupKey::Feature(k) => match row.get(k).as_f64() {
                Some(v) => Label::Number(v),
                None => continue,
            },
        };
        let bucket = groups
            .entry(label)
            .or_insert_with(|| vec![Vec::new(); compared.len()]);
        for (slot, &idx) in bucket.iter_mut().zip(&compared) {
            if let Some(v) = row.get(idx).as_f64() {
                slot.push(v);
            }
        }
    }

    let (categories, group_means): (Vec<String>, Vec<Vec<f64>>) = groups
        .into_iter()
        .map(|(label, cols)| (label.render(), cols.iter().map(|c| mean(c)).collect()))
        .unzip();
    let means = CategoryMeans {
        category_column: category_col.to_string(),
        features: compared
            .iter()
            .map(|&i| dataset.features()[i].clone())
            .collect(),
        categories,
        means: group_means,
    };

    let diff = match (means.means_of(group_a), means.means_of(group_b)) {
        (Some(a), Some(b)) => Some(CategoryDiff {
            minuend: group_b.to_string(),
            subtrahend: group_a.to_string(),
            features: means.features.clone(),
            values: b.iter().zip(a).map(|(b, a)| b - a).collect(),
        }),
        _ => {
            log::warn!(
                "cannot compare `{group_b}` with `{group_a}`: categories present are {:?}",
                means.categories().collect::<Vec<_>>()
            );
            None
        }
    };

    Ok((means, diff))
}
