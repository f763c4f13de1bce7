//! Aggregations over a canonical [`Dataset`](crate::data::model::Dataset):
//! per-feature descriptive statistics and per-category mean comparison.

pub mod compare;
pub mod summary;
