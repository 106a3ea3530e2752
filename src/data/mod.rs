//! Data layer: core types, loading, cleaning and the audit trail.
//!
//! Architecture:
//! ```text
//!  .csv / .txt / .xlsx / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐   normalize / impute   ┌──────────────┐
//!   │ DataTable  │ ─────────────────────▶ │ TransformLog  │
//!   └───────────┘   one record per step   └──────────────┘
//!     current + original snapshot
//! ```

pub mod history;
pub mod impute;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod table;
