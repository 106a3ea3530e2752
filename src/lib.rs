//! Laboratory data engine: clean tabular measurements, fit curves through
//! two columns and export the results together with an audit trail.

pub mod data;
pub mod error;
pub mod export;
pub mod fit;

pub use data::history::{Operation, TransformLog, TransformRecord};
pub use data::impute::{FillMethod, KNN_DEFAULT_K};
pub use data::loader::load_file;
pub use data::model::{CellValue, Column, ColumnKind, Dataset};
pub use data::normalize::NormalizeMethod;
pub use data::table::{DataTable, TableEvent};
pub use error::{LabError, Result};
pub use export::{ExportFormat, ResultExporter};
pub use fit::{CurveFitter, FitModel, FitResult, Metrics};
