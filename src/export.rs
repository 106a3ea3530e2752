use std::io;
use std::path::{Path, PathBuf};

use simple_excel_writer::{Row, Workbook};

use crate::data::history::TransformLog;
use crate::data::model::Dataset;
use crate::data::table::DataTable;
use crate::error::{LabError, Result};

pub const SHEET_TRANSFORMED: &str = "Transformed Data";
pub const SHEET_ORIGINAL: &str = "Original Data";
pub const SHEET_HISTORY: &str = "Transformation History";

pub const ORIGINAL_SUFFIX: &str = "_original";
pub const HISTORY_SUFFIX: &str = "_transformaciones";

const HISTORY_HEADERS: [&str; 4] = ["operation", "timestamp", "details", "rows_affected"];

// ---------------------------------------------------------------------------
// Export formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One `.xlsx` workbook with a sheet per table.
    Spreadsheet,
    /// Comma-separated files, one per table.
    Csv,
    /// Tab-separated files, one per table.
    DelimitedText,
}

impl ExportFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(ExportFormat::Spreadsheet),
            "csv" => Some(ExportFormat::Csv),
            "txt" | "tsv" => Some(ExportFormat::DelimitedText),
            _ => None,
        }
    }

    fn default_extension(self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::DelimitedText => "txt",
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            ExportFormat::DelimitedText => b'\t',
            _ => b',',
        }
    }
}

// ---------------------------------------------------------------------------
// ResultExporter
// ---------------------------------------------------------------------------

/// Persists a table's current data, its original snapshot and its history.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultExporter;

impl ResultExporter {
    /// Write everything to `path`.
    ///
    /// Spreadsheets get three sheets; CSV and delimited text get the primary
    /// file plus `<stem>_original.<ext>` and `<stem>_transformaciones.<ext>`.
    /// The history is skipped while the log is empty. Returns the paths
    /// written, primary first.
    pub fn export(table: &DataTable, path: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
        let current = table.current().ok_or(LabError::NoDataLoaded)?;
        let original = table.original();
        let history = table.log();

        let written = match format {
            ExportFormat::Spreadsheet => {
                write_workbook(path, current, original, history)?;
                vec![path.to_path_buf()]
            }
            ExportFormat::Csv | ExportFormat::DelimitedText => {
                let mut written = Vec::with_capacity(3);
                write_delimited(path, format, dataset_table(current))?;
                written.push(path.to_path_buf());
                if let Some(original) = original {
                    let sibling = sibling_path(path, ORIGINAL_SUFFIX, format);
                    write_delimited(&sibling, format, dataset_table(original))?;
                    written.push(sibling);
                }
                if !history.is_empty() {
                    let sibling = sibling_path(path, HISTORY_SUFFIX, format);
                    write_delimited(&sibling, format, history_table(history))?;
                    written.push(sibling);
                }
                written
            }
        };

        log::info!("exported {} file(s) to {}", written.len(), path.display());
        Ok(written)
    }
}

/// `dir/out.csv` + `_original` → `dir/out_original.csv`.
pub fn sibling_path(path: &Path, suffix: &str, format: ExportFormat) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| format.default_extension().to_string());
    path.with_file_name(format!("{stem}{suffix}.{ext}"))
}

// -- Tables as header + string rows --

struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

fn dataset_table(data: &Dataset) -> Table {
    Table {
        headers: data.column_names(),
        rows: data
            .rows()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell.as_f64() {
                        Some(v) => Cell::Number(v),
                        None => Cell::Text(cell.to_string()),
                    })
                    .collect()
            })
            .collect(),
    }
}

fn history_table(history: &TransformLog) -> Table {
    Table {
        headers: HISTORY_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows: history
            .records()
            .iter()
            .map(|rec| {
                vec![
                    Cell::Text(rec.operation.to_string()),
                    Cell::Text(rec.formatted_timestamp()),
                    Cell::Text(rec.details.clone()),
                    Cell::Number(rec.rows_affected as f64),
                ]
            })
            .collect(),
    }
}

// -- Writers --

fn write_delimited(path: &Path, format: ExportFormat, table: Table) -> Result<()> {
    let to_io = |e: csv::Error| LabError::write(path, io::Error::from(e));

    let mut writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_path(path)
        .map_err(to_io)?;
    writer.write_record(&table.headers).map_err(to_io)?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(Cell::render))
            .map_err(to_io)?;
    }
    writer.flush().map_err(|e| LabError::write(path, e))
}

fn write_workbook(
    path: &Path,
    current: &Dataset,
    original: Option<&Dataset>,
    history: &TransformLog,
) -> Result<()> {
    let path_str = path.to_str().ok_or_else(|| {
        LabError::write(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path is not valid UTF-8"),
        )
    })?;

    let mut sheets = vec![(SHEET_TRANSFORMED, dataset_table(current))];
    if let Some(original) = original {
        sheets.push((SHEET_ORIGINAL, dataset_table(original)));
    }
    if !history.is_empty() {
        sheets.push((SHEET_HISTORY, history_table(history)));
    }

    let mut workbook = Workbook::create(path_str);
    for (name, table) in &sheets {
        let mut sheet = workbook.create_sheet(name);
        workbook
            .write_sheet(&mut sheet, |writer| {
                let mut header = Row::new();
                for h in &table.headers {
                    header.add_cell(h.as_str());
                }
                writer.append_row(header)?;
                for cells in &table.rows {
                    let mut row = Row::new();
                    for cell in cells {
                        match cell {
                            Cell::Number(v) => row.add_cell(*v),
                            Cell::Text(s) => row.add_cell(s.as_str()),
                        }
                    }
                    writer.append_row(row)?;
                }
                Ok(())
            })
            .map_err(|e| LabError::write(path, e))?;
    }
    workbook
        .close()
        .map(|_| ())
        .map_err(|e| LabError::write(path, e))
}
