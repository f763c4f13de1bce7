//! Wine quality exploration core: read one raw sheet per wine category, clean
//! and merge them into a canonical dataset, then summarise and compare the
//! categories.

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use data::merge::{deduplicate, merge};
pub use data::model::{Cell, Dataset, RawCell, RawTable, Row};
pub use data::parse::{parse, parse_with};
pub use error::{Error, Result};
pub use stats::compare::{compare, CategoryDiff, CategoryMeans};
pub use stats::summary::{summarize, FeatureSummary};
