use std::fmt;
use std::fmt::Write as _;

use chrono::{Local, NaiveDateTime};
use serde::{Serialize, Serializer};

/// Timestamp layout used in summaries and exported history tables.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Operation – what was applied to the table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    RemoveNullValues,
    RemoveDuplicates,
    NormalizeData,
    FillNullValues,
    FillNullWithKnn,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::RemoveNullValues => "remove_null_values",
            Operation::RemoveDuplicates => "remove_duplicates",
            Operation::NormalizeData => "normalize_data",
            Operation::FillNullValues => "fill_null_values",
            Operation::FillNullWithKnn => "fill_null_with_knn",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TransformRecord / TransformLog
// ---------------------------------------------------------------------------

/// One entry of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformRecord {
    pub operation: Operation,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub details: String,
    /// Row count of the table after the operation.
    pub rows_affected: usize,
}

impl TransformRecord {
    /// Record stamped with the current local time.
    pub fn now(operation: Operation, details: impl Into<String>, rows_affected: usize) -> Self {
        TransformRecord {
            operation,
            timestamp: Local::now().naive_local(),
            details: details.into(),
            rows_affected,
        }
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

/// Append-only, chronological list of transformations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformLog {
    records: Vec<TransformRecord>,
}

impl TransformLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: TransformRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TransformRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&TransformRecord> {
        self.records.last()
    }

    /// Only a fresh load may wipe the trail.
    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    /// Human-readable listing of every record, oldest first.
    pub fn summary(&self) -> String {
        if self.records.is_empty() {
            return "No transformations applied".to_string();
        }
        let mut out = String::from("Transformation summary:\n\n");
        for (i, rec) in self.records.iter().enumerate() {
            // Writing into a String cannot fail.
            let _ = writeln!(out, "{}. {}", i + 1, rec.operation);
            let _ = writeln!(out, "   Timestamp: {}", rec.formatted_timestamp());
            let _ = writeln!(out, "   Details: {}", rec.details);
            let _ = writeln!(out, "   Rows affected: {}\n", rec.rows_affected);
        }
        out
    }
}
