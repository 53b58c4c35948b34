/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → drop id/host_name/last_review, price <= 0
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Listing>, category index, price bounds
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  groups ∧ room types ∧ price range → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  SummaryMetrics, mean price per room type, histogram
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;

pub use aggregate::{Aggregates, GroupedSummary, PriceHistogram, SummaryMetrics};
pub use filter::{FilterCriteria, FilteredView, PriceRange};
pub use loader::{DatasetSource, LoadError};
pub use model::{CellValue, Dataset, Listing};
