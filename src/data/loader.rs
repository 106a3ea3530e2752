use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use calamine::{open_workbook_auto, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, Dataset};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a measurement table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`             – comma-separated, header row first
/// * `.txt` / `.tsv`    – tab-separated, header row first
/// * `.xlsx` / `.xls`   – first worksheet, header row first
/// * `.json`            – `[{ "col": value, ... }, ...]`
/// * `.parquet`         – scalar columns (numbers, strings, booleans)
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_delimited(path, b',')?,
        "txt" | "tsv" => load_delimited(path, b'\t')?,
        "xlsx" | "xls" => load_spreadsheet(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    log::debug!(
        "parsed {} ({} rows, {} columns)",
        path.display(),
        dataset.len(),
        dataset.column_count()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line. Empty fields are
/// missing values; every other field is typed with [`CellValue::parse`].
fn load_delimited(path: &Path, delimiter: u8) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .context("opening delimited file")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        rows.push(record.iter().map(CellValue::parse).collect());
    }

    Ok(Dataset::from_rows(headers, rows))
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_spreadsheet(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("workbook has no sheets")?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("reading sheet '{sheet}'"))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Dataset::default());
    };
    let headers: Vec<String> = header_row.iter().map(|c| c.to_string()).collect();
    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(|c| CellValue::parse(&c.to_string())).collect())
        .collect();

    Ok(Dataset::from_rows(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "time": 0.0, "position": 100.2, "sample": "A" },
///   { "time": 0.1, "position": null,  "sample": "A" }
/// ]
/// ```
///
/// Keys absent from a record are missing values. Columns are ordered by name.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: BTreeMap<String, Vec<CellValue>> = BTreeMap::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for (key, val) in obj {
            let col = columns.entry(key.clone()).or_default();
            col.resize(i, CellValue::Missing);
            col.push(json_to_cell(val));
        }
    }

    Ok(Dataset::from_columns(
        columns
            .into_iter()
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    ))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::Number(n) => n.as_f64().map_or(CellValue::Missing, CellValue::number),
        JsonValue::String(s) => CellValue::parse(s),
        JsonValue::Bool(b) => CellValue::Text(b.to_string()),
        JsonValue::Null => CellValue::Missing,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nulls become missing values.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Column> = headers
        .iter()
        .map(|h| Column::new(h.clone(), Vec::new()))
        .collect();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, column) in columns.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                column.values.push(extract_cell(array, row));
            }
        }
    }

    Ok(Dataset::from_columns(columns))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Missing;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map_or(CellValue::Missing, |s| CellValue::parse(s.value(row))),
        DataType::LargeUtf8 => CellValue::parse(col.as_string::<i64>().value(row)),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map_or(CellValue::Missing, |a| CellValue::number(a.value(row) as f64)),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map_or(CellValue::Missing, |a| CellValue::number(a.value(row) as f64)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map_or(CellValue::Missing, |a| CellValue::number(a.value(row) as f64)),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map_or(CellValue::Missing, |a| CellValue::number(a.value(row))),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map_or(CellValue::Missing, |a| CellValue::Text(a.value(row).to_string())),
        other => CellValue::Text(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("data.pdf")).unwrap_err();
        assert!(err.to_string().contains("Unsupported"));
    }

    #[test]
    fn json_cells() {
        assert_eq!(json_to_cell(&serde_json::json!(1.5)), CellValue::Number(1.5));
        assert_eq!(json_to_cell(&serde_json::json!(null)), CellValue::Missing);
        assert_eq!(json_to_cell(&serde_json::json!("3")), CellValue::Number(3.0));
        assert_eq!(json_to_cell(&serde_json::json!("x")), CellValue::text("x"));
    }
}
