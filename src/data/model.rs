use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};

/// Name of the column that carries the category label unless configured otherwise.
pub const DEFAULT_CATEGORY_COLUMN: &str = "type";

/// Prefix given to columns whose header cell was blank. Such columns are never
/// part of a clean schema.
pub const PLACEHOLDER_PREFIX: &str = "Unnamed";

/// Whether `name` is a placeholder column produced by a blank header cell.
pub fn is_placeholder(name: &str) -> bool {
    name.starts_with(PLACEHOLDER_PREFIX)
}

/// Render a float the way a spreadsheet shows it: `5.0` → `5`, `5.5` → `5.5`.
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// RawCell – a single cell of an uninterpreted source
// ---------------------------------------------------------------------------

/// A cell exactly as the source file holds it, before any header or type
/// interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl RawCell {
    /// Build a cell from text, treating blank text as empty.
    pub fn from_text(s: &str) -> Self {
        if s.is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(s.to_string())
        }
    }

    /// Coerce to a numeric cell. Never fails: anything that does not read as a
    /// number becomes [`Cell::Missing`].
    pub fn coerce(&self) -> Cell {
        match self {
            RawCell::Empty => Cell::Missing,
            RawCell::Number(v) => Cell::from_f64(*v),
            RawCell::Bool(b) => Cell::Numeric(if *b { 1.0 } else { 0.0 }),
            RawCell::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Cell::from_f64)
                .unwrap_or(Cell::Missing),
        }
    }

    /// Text used when this cell sits on the header row. `None` for a blank cell.
    pub fn header_text(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(s) => Some(s.clone()),
            RawCell::Number(v) if v.is_nan() => None,
            RawCell::Number(v) => Some(format_number(*v)),
            RawCell::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        }
    }
}

/// The raw grid read from one source file. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<RawCell>>) -> Self {
        RawTable { rows }
    }

    /// Number of grid rows, decorative and header rows included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Cell – a coerced feature value
// ---------------------------------------------------------------------------

/// A feature value after coercion. `Numeric` never holds NaN.
#[derive(Debug, Clone, Copy)]
pub enum Cell {
    Numeric(f64),
    Missing,
}

impl Cell {
    /// NaN is folded into `Missing`.
    pub fn from_f64(v: f64) -> Self {
        if v.is_nan() {
            Cell::Missing
        } else {
            Cell::Numeric(v)
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Numeric(v) => Some(*v),
            Cell::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    // -0.0 and 0.0 share a key.
    fn key_bits(v: f64) -> u64 {
        (v + 0.0).to_bits()
    }
}

// -- Manual Eq/Hash so rows can go into a HashSet (missing == missing) --

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Missing, Cell::Missing) => true,
            (Cell::Numeric(a), Cell::Numeric(b)) => Cell::key_bits(*a) == Cell::key_bits(*b),
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        if let Cell::Numeric(v) = self {
            Cell::key_bits(*v).hash(state);
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Numeric(v) => write!(f, "{}", format_number(*v)),
            Cell::Missing => write!(f, "NaN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Row – one observation
// ---------------------------------------------------------------------------

/// One wine: feature values aligned with the dataset schema plus its category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    values: Vec<Cell>,
    category: String,
}

impl Row {
    pub fn new(values: Vec<Cell>, category: impl Into<String>) -> Self {
        Row {
            values,
            category: category.into(),
        }
    }

    pub fn values(&self) -> &[Cell] {
        &self.values
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn get(&self, idx: usize) -> Cell {
        self.values.get(idx).copied().unwrap_or(Cell::Missing)
    }

    /// True when no feature carries a value; such rows never enter a dataset.
    pub fn is_all_missing(&self) -> bool {
        self.values.iter().all(Cell::is_missing)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the clean table
// ---------------------------------------------------------------------------

/// A schema-clean numeric table. Immutable once built: every transformation
/// produces a new `Dataset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Vec<String>,
    category_column: String,
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset, checking the schema and dropping all-missing rows.
    ///
    /// Fails if a feature name is a placeholder, collides with the category
    /// column or is repeated, or if a row's width differs from the schema.
    pub fn new(
        features: Vec<String>,
        category_column: impl Into<String>,
        rows: Vec<Row>,
    ) -> Result<Self> {
        let category_column = category_column.into();
        let mut seen = BTreeSet::new();
        for name in &features {
            if is_placeholder(name) {
                return Err(Error::Schema(format!("placeholder column `{name}` in schema")));
            }
            if *name == category_column {
                return Err(Error::Schema(format!(
                    "feature `{name}` collides with the category column"
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::Schema(format!("duplicate column `{name}`")));
            }
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.values.len() != features.len())
        {
            return Err(Error::Schema(format!(
                "row {i} has {} values but the schema has {} features",
                row.values.len(),
                features.len()
            )));
        }

        let before = rows.len();
        let rows: Vec<Row> = rows.into_iter().filter(|r| !r.is_all_missing()).collect();
        if rows.len() != before {
            log::debug!("dropped {} all-missing rows", before - rows.len());
        }

        Ok(Dataset {
            features,
            category_column,
            rows,
        })
    }

    /// Feature column names in schema order (category column excluded).
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn category_column(&self) -> &str {
        &self.category_column
    }

    /// Rows in order; the position in this slice is the dense row index.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f == name)
    }

    /// All cells of one feature column, in row order.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = Cell> + '_ {
        self.rows.iter().map(move |r| r.get(idx))
    }

    /// Sorted set of category labels present.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.rows.iter().map(Row::category).collect()
    }

    /// The first `n` rows as a new dataset.
    pub fn head(&self, n: usize) -> Dataset {
        self.with_rows(self.rows.iter().take(n).cloned().collect())
    }

    /// Same schema, different rows. Callers only pass rows taken from a dataset
    /// of this schema, so no re-validation is needed.
    pub(crate) fn with_rows(&self, rows: Vec<Row>) -> Dataset {
        Dataset {
            features: self.features.clone(),
            category_column: self.category_column.clone(),
            rows,
        }
    }
}
