/// Data layer: core types, loading, filtering and chart aggregations.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → CensusDataset (immutable, shared via Arc)
///   └──────────┘
///        │
///        ├──────────────► ┌──────────┐
///        │                │ registry  │  distinct values per filter column
///        │                └──────────┘
///        ▼                      │ validates
///   ┌──────────┐ ◄──────────────┘
///   │  filter   │  FilterSelection → FilteredSubset (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  views    │  outcome counts, paired samples, category × outcome
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod registry;
pub mod views;
