use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy for the data engine
// ---------------------------------------------------------------------------

/// Every failure the table, fitter and exporter can report.
///
/// Variants are kinds first: callers match on them to decide what to show,
/// the `Display` text is only a fallback for logs.
#[derive(Debug, Error)]
pub enum LabError {
    #[error("no data loaded")]
    NoDataLoaded,

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("column is not numeric: {0}")]
    NonNumericColumn(String),

    #[error("invalid polynomial degree: {0}")]
    InvalidDegree(usize),

    #[error("need at least {required} points, got {available}")]
    InsufficientPoints { required: usize, available: usize },

    #[error("need at least 2 numeric columns, got {0}")]
    InsufficientNumericColumns(usize),

    #[error("invalid neighbour count: {0}")]
    InvalidK(usize),

    #[error("cannot write {}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LabError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LabError::WriteError {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LabError>;
