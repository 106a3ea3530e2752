use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell: numeric, textual or missing.
///
/// Rows are compared and hashed cell by cell when looking for duplicates, so
/// `CellValue` must be `Eq + Hash`. Numbers are canonicalised on construction
/// (NaN becomes `Missing`, `-0.0` becomes `0.0`) which keeps equality total.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Build a numeric cell, mapping NaN to `Missing`.
    pub fn number(v: f64) -> Self {
        if v.is_nan() {
            CellValue::Missing
        } else if v == 0.0 {
            CellValue::Number(0.0)
        } else {
            CellValue::Number(v)
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Guess the type of a raw textual field.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") {
            return CellValue::Missing;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::number(i as f64);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::number(f);
        }
        CellValue::Text(s.to_string())
    }

    /// `Missing`, or a `Number` holding NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::Number(v) => v.is_nan(),
            CellValue::Text(_) => false,
        }
    }

    /// The numeric value, if this cell holds a non-NaN number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    /// Numeric interpretation used by the fitter: numbers as-is, text only if
    /// it parses as a float. `Err(())` means the cell is not coercible.
    pub(crate) fn coerce_f64(&self) -> Result<Option<f64>, ()> {
        match self {
            CellValue::Number(v) => Ok((!v.is_nan()).then_some(*v)),
            CellValue::Missing => Ok(None),
            CellValue::Text(s) => s.trim().parse::<f64>().map(Some).map_err(|_| ()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::number(v)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(CellValue::Missing, CellValue::number)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

// -- Manual Eq/Ord/Hash so rows can be put in a HashSet --
//
// NaN numbers compare and hash as `Missing`; `-0.0` equals `0.0`.

impl CellValue {
    fn rank(&self) -> u8 {
        match self {
            CellValue::Text(_) => 2,
            CellValue::Number(v) if !v.is_nan() => 1,
            _ => 0,
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Number(a), CellValue::Number(b)) if self.rank() == 1 && other.rank() == 1 => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            CellValue::Number(v) if !v.is_nan() => (v + 0.0).to_bits().hash(state),
            CellValue::Text(s) => s.hash(state),
            _ => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) if !v.is_nan() => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – one named column of the table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Numeric,
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// Convenience constructor for numeric columns with gaps.
    pub fn numeric(name: impl Into<String>, values: &[Option<f64>]) -> Self {
        Column::new(name, values.iter().map(|&v| CellValue::from(v)).collect())
    }

    /// A column is numeric when every present value is a number.
    /// An all-missing column counts as numeric.
    pub fn kind(&self) -> ColumnKind {
        if self
            .values
            .iter()
            .all(|v| matches!(v, CellValue::Number(_) | CellValue::Missing))
        {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind() == ColumnKind::Numeric
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Numeric view of the column (`None` per missing cell).
    /// Text cells read as `None`; check [`Column::is_numeric`] first.
    pub fn as_f64_vec(&self) -> Vec<Option<f64>> {
        self.values.iter().map(CellValue::as_f64).collect()
    }

    /// Present numeric values only.
    pub fn present_f64(&self) -> Vec<f64> {
        self.values.iter().filter_map(CellValue::as_f64).collect()
    }

    /// Replace the numeric cells from a numeric view, keeping gaps as `Missing`.
    pub(crate) fn set_f64_vec(&mut self, values: &[Option<f64>]) {
        self.values = values.iter().map(|&v| CellValue::from(v)).collect();
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete table
// ---------------------------------------------------------------------------

/// Named columns sharing one row index, in load order.
///
/// Only built through [`Dataset::from_columns`] or [`Dataset::from_rows`],
/// so every column has the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Build a dataset from columns. Shorter columns are padded with missing
    /// cells so every column has the same length.
    pub fn from_columns(mut columns: Vec<Column>) -> Self {
        let n_rows = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
        for col in &mut columns {
            col.values.resize(n_rows, CellValue::Missing);
        }
        Dataset { columns }
    }

    /// Build a dataset from a header and row-oriented cells.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|h| Column::new(h, Vec::with_capacity(rows.len())))
            .collect();
        for mut row in rows {
            row.resize(columns.len(), CellValue::Missing);
            for (col, cell) in columns.iter_mut().zip(row) {
                col.values.push(cell);
            }
        }
        Dataset { columns }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Callers must keep the column length unchanged.
    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn numeric_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Cells of row `i`, in column order.
    pub fn row(&self, i: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[i]).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&CellValue>> + '_ {
        (0..self.len()).map(move |i| self.row(i))
    }

    /// Keep only rows whose flag is `true`, preserving order.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        for col in &mut self.columns {
            let mut flags = keep.iter();
            col.values.retain(|_| *flags.next().unwrap_or(&false));
        }
    }

    pub fn missing_count(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }
}
