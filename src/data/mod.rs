/// Data layer: core types, reading, parsing, merging and writing.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet   (one per category)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read file → RawTable (uninterpreted grid)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  parse    │  header row, placeholder columns, coercion → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  merge    │  concatenate sources, drop duplicate rows
///   └──────────┘
///        │
///        ▼
///   canonical Dataset ──► stats, report, writer
/// ```

pub mod loader;
pub mod merge;
pub mod model;
pub mod parse;
pub mod writer;
