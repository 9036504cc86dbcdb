/// Data layer: employee records, loading, region lookup, filtering and
/// aggregation.
///
/// Architecture:
/// ```text
///   hr_cleaned.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV → Vec<EmployeeRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  attach Region (region::classify), distinct values
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply selections → matching rows
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  key metrics + chart groupings
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod region;
