//! Data layer: core types, loading, filtering, and aggregation.
//!
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse + normalize → StartupDataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────────┐
//!   │ StartupDataset  │  Vec<StartupRecord>, unique-value indexes
//!   └────────────────┘
//!        │
//!        ▼
//!   ┌──────────┐       ┌────────────┐
//!   │  filter   │ ────▶ │ aggregate  │  filtered indices → chart series
//!   └──────────┘       └────────────┘
//! ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
