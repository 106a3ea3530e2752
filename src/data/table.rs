use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use super::history::{Operation, TransformLog, TransformRecord};
use super::impute::{self, FillMethod, KNN_DEFAULT_K};
use super::model::{CellValue, Dataset};
use super::normalize::{normalize_column, NormalizeMethod};
use crate::error::{LabError, Result};
use crate::export::{ExportFormat, ResultExporter};

// ---------------------------------------------------------------------------
// Change notifications
// ---------------------------------------------------------------------------

/// What a subscriber is told after the table changes.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    Loaded { rows: usize, columns: usize },
    Transformed(TransformRecord),
}

pub type Observer = Box<dyn FnMut(&TableEvent)>;

// ---------------------------------------------------------------------------
// DataTable – current data, original snapshot and audit trail
// ---------------------------------------------------------------------------

/// Owns the working dataset, the snapshot taken at load time and the log of
/// every cleaning step applied since.
///
/// Operations are plain methods returning counts or a [`LabError`]; a UI
/// layer reacts to changes by subscribing instead of wrapping the type.
#[derive(Default)]
pub struct DataTable {
    current: Option<Dataset>,
    original: Option<Dataset>,
    log: TransformLog,
    observers: Vec<Observer>,
}

impl fmt::Debug for DataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTable")
            .field("rows", &self.current.as_ref().map(Dataset::len))
            .field("transforms", &self.log.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the working data, snapshot it and start a fresh log.
    pub fn load(&mut self, dataset: Dataset) {
        log::info!(
            "loaded {} rows x {} columns",
            dataset.len(),
            dataset.column_count()
        );
        let event = TableEvent::Loaded {
            rows: dataset.len(),
            columns: dataset.column_count(),
        };
        self.original = Some(dataset.clone());
        self.current = Some(dataset);
        self.log.clear();
        self.notify(&event);
    }

    /// Register a callback run after every load and successful operation.
    pub fn subscribe(&mut self, observer: impl FnMut(&TableEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn current(&self) -> Option<&Dataset> {
        self.current.as_ref()
    }

    pub fn original(&self) -> Option<&Dataset> {
        self.original.as_ref()
    }

    pub fn log(&self) -> &TransformLog {
        &self.log
    }

    pub fn summary(&self) -> String {
        self.log.summary()
    }

    /// Drop every row with at least one missing cell. Returns rows removed.
    pub fn remove_null_rows(&mut self) -> Result<usize> {
        let data = self.data_mut()?;
        let before = data.len();
        let keep: Vec<bool> = data
            .rows()
            .map(|row| !row.iter().any(|c| c.is_missing()))
            .collect();
        data.retain_rows(&keep);
        let removed = before - data.len();

        self.record(
            Operation::RemoveNullValues,
            format!("removed {removed} rows with null values"),
        );
        Ok(removed)
    }

    /// Drop rows equal to an earlier row across all columns, keeping the first
    /// occurrence. Returns rows removed.
    pub fn remove_duplicate_rows(&mut self) -> Result<usize> {
        let data = self.data_mut()?;
        let before = data.len();
        let keep: Vec<bool> = {
            let mut seen: HashSet<Vec<&CellValue>> = HashSet::with_capacity(before);
            data.rows().map(|row| seen.insert(row)).collect()
        };
        data.retain_rows(&keep);
        let removed = before - data.len();

        self.record(
            Operation::RemoveDuplicates,
            format!("removed {removed} duplicate rows"),
        );
        Ok(removed)
    }

    /// Scale each named column independently. An empty list means every
    /// numeric column. Returns how many rows had at least one value changed.
    pub fn normalize<S: AsRef<str>>(&mut self, columns: &[S], method: NormalizeMethod) -> Result<usize> {
        let data = self.data_mut()?;
        let names = resolve_columns(data, columns, true)?;
        if let Some(bad) = names.iter().find(|n| !is_numeric(data, n)) {
            return Err(LabError::NonNumericColumn(bad.clone()));
        }

        let before: Vec<Vec<CellValue>> = names
            .iter()
            .filter_map(|n| data.column(n).map(|c| c.values.clone()))
            .collect();

        for name in &names {
            if let Some(col) = data.column_mut(name) {
                if let Some(scaled) = normalize_column(&col.as_f64_vec(), method) {
                    col.set_f64_vec(&scaled);
                }
            }
        }

        let changed = (0..data.len())
            .filter(|&r| {
                names
                    .iter()
                    .zip(&before)
                    .any(|(n, old)| data.column(n).is_some_and(|c| c.values[r] != old[r]))
            })
            .count();

        self.record(
            Operation::NormalizeData,
            format!(
                "normalized columns {} using {method} ({changed} rows changed)",
                names.join(", ")
            ),
        );
        Ok(changed)
    }

    /// Impute missing cells of the named columns (all columns when empty).
    /// Returns the number of cells filled.
    pub fn fill_nulls<S: AsRef<str>>(&mut self, columns: &[S], method: FillMethod) -> Result<usize> {
        self.data_mut()?;
        match method {
            FillMethod::PolynomialInterp { degree } if degree < 1 => {
                return Err(LabError::InvalidDegree(degree));
            }
            FillMethod::Knn { k: Some(0) } => return Err(LabError::InvalidK(0)),
            _ => {}
        }
        if let FillMethod::Knn { k } = method {
            return self.fill_knn(columns, k.unwrap_or(KNN_DEFAULT_K));
        }

        let data = self.data_mut()?;
        let names = resolve_columns(data, columns, false)?;

        let mut filled = 0;
        let mut touched = Vec::new();
        for name in &names {
            let Some(col) = data.column_mut(name) else {
                continue;
            };
            if !col.is_numeric() {
                log::debug!("skipping text column {name} for {method} fill");
                continue;
            }
            let mut values = col.as_f64_vec();
            let n = match method {
                FillMethod::Mean => impute::fill_mean(&mut values),
                FillMethod::LinearInterp => impute::fill_linear(&mut values),
                FillMethod::PolynomialInterp { degree } => impute::fill_polynomial(&mut values, degree),
                FillMethod::Knn { .. } => 0,
            };
            if n > 0 {
                col.set_f64_vec(&values);
                touched.push(name.as_str());
            }
            filled += n;
        }

        let details = if touched.is_empty() {
            format!("filled 0 null values with {method}")
        } else {
            format!("filled {filled} null values with {method} in {}", touched.join(", "))
        };
        self.record(Operation::FillNullValues, details);
        Ok(filled)
    }

    fn fill_knn<S: AsRef<str>>(&mut self, columns: &[S], k: usize) -> Result<usize> {
        let data = self.data_mut()?;
        let numeric = data.numeric_column_names();
        if numeric.len() < 2 {
            return Err(LabError::InsufficientNumericColumns(numeric.len()));
        }
        let requested = resolve_columns(data, columns, false)?;
        let targets: Vec<usize> = requested
            .iter()
            .filter_map(|name| numeric.iter().position(|n| n == name))
            .collect();

        let mut matrix: Vec<Vec<Option<f64>>> = numeric
            .iter()
            .filter_map(|n| data.column(n).map(|c| c.as_f64_vec()))
            .collect();
        let filled = impute::knn_impute(&mut matrix, &targets, k);

        for &t in &targets {
            if let Some(col) = data.column_mut(&numeric[t]) {
                col.set_f64_vec(&matrix[t]);
            }
        }

        let target_names: Vec<&str> = targets.iter().map(|&t| numeric[t].as_str()).collect();
        self.record(
            Operation::FillNullWithKnn,
            format!(
                "KNN applied on columns {} with {k} neighbours ({filled} values filled)",
                target_names.join(", ")
            ),
        );
        Ok(filled)
    }

    /// Write current data, original snapshot and history to `path`.
    pub fn export(&self, path: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
        ResultExporter::export(self, path, format)
    }

    fn data_mut(&mut self) -> Result<&mut Dataset> {
        self.current
            .as_mut()
            .filter(|d| d.column_count() > 0)
            .ok_or(LabError::NoDataLoaded)
    }

    fn record(&mut self, operation: Operation, details: String) {
        let rows = self.current.as_ref().map_or(0, Dataset::len);
        log::info!("{operation}: {details}");
        let record = TransformRecord::now(operation, details, rows);
        self.log.append(record.clone());
        self.notify(&TableEvent::Transformed(record));
    }

    fn notify(&mut self, event: &TableEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }
}

/// Map requested names to existing columns. Empty means all columns (or all
/// numeric columns when `numeric_only`).
fn resolve_columns<S: AsRef<str>>(data: &Dataset, columns: &[S], numeric_only: bool) -> Result<Vec<String>> {
    if columns.is_empty() {
        return Ok(if numeric_only {
            data.numeric_column_names()
        } else {
            data.column_names()
        });
    }
    columns
        .iter()
        .map(|c| {
            let name = c.as_ref();
            data.column(name)
                .map(|col| col.name.clone())
                .ok_or_else(|| LabError::ColumnNotFound(name.to_string()))
        })
        .collect()
}

fn is_numeric(data: &Dataset, name: &str) -> bool {
    data.column(name).is_some_and(|c| c.is_numeric())
}
