/// Data layer: core types, loading, caching, and filtering.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet   (CO2, CH4, N2O)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, rename columns → Dataset × 3
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  load once, share Arc<EmissionTables>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  selected country → CountryView
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
