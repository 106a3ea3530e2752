//! Tests for the cleaning operations of `DataTable`.
//!
//! ## Test Organization
//!
//! 1. **Row removal** - null rows, duplicate rows, idempotence
//! 2. **Normalization** - min-max, z-score, max-abs and degenerate columns
//! 3. **Imputation** - mean, interpolation and KNN
//! 4. **Errors** - parameter and column validation

use approx::{assert_abs_diff_eq, assert_relative_eq};

use rusty_lab::{
    CellValue, Column, DataTable, Dataset, FillMethod, LabError, NormalizeMethod, Operation,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn table_with(columns: Vec<Column>) -> DataTable {
    let mut table = DataTable::new();
    table.load(Dataset::from_columns(columns));
    table
}

fn values(table: &DataTable, name: &str) -> Vec<Option<f64>> {
    table.current().unwrap().column(name).unwrap().as_f64_vec()
}

const ALL: &[&str] = &[];

// ============================================================================
// Row Removal Tests
// ============================================================================

#[test]
fn remove_null_rows_scenario() {
    let mut table = table_with(vec![
        Column::numeric("A", &[Some(1.0), Some(2.0), None, Some(4.0)]),
        Column::numeric("B", &[Some(10.0), Some(20.0), Some(30.0), Some(40.0)]),
    ]);

    assert_eq!(table.remove_null_rows().unwrap(), 1);
    assert_eq!(table.current().unwrap().len(), 3);

    let rec = table.log().last().unwrap();
    assert_eq!(rec.operation, Operation::RemoveNullValues);
    assert_eq!(rec.operation.as_str(), "remove_null_values");
    assert_eq!(rec.rows_affected, 3);

    // Original snapshot untouched.
    assert_eq!(table.original().unwrap().len(), 4);
}

#[test]
fn raw_nan_cells_count_as_missing() {
    let mut table = table_with(vec![
        Column::new(
            "A",
            vec![
                CellValue::Number(1.0),
                CellValue::Number(f64::NAN),
                CellValue::Number(3.0),
            ],
        ),
        Column::numeric("B", &[Some(10.0), Some(20.0), Some(30.0)]),
    ]);

    assert_eq!(table.remove_null_rows().unwrap(), 1);
    assert_eq!(values(&table, "A"), vec![Some(1.0), Some(3.0)]);
    assert_eq!(table.log().last().unwrap().rows_affected, 2);
}

#[test]
fn remove_null_rows_is_idempotent() {
    let mut table = table_with(vec![
        Column::numeric("A", &[None, Some(2.0), Some(3.0)]),
        Column::new("C", vec!["x".into(), CellValue::Missing, "z".into()]),
    ]);
    table.remove_null_rows().unwrap();
    let once = table.current().unwrap().clone();

    assert_eq!(table.remove_null_rows().unwrap(), 0);
    assert_eq!(table.current().unwrap(), &once);
    assert_eq!(once.len(), 1);
    assert_eq!(table.log().len(), 2);
}

#[test]
fn remove_duplicates_keeps_first_occurrence() {
    let mut table = table_with(vec![
        Column::numeric("A", &[Some(1.0), Some(2.0), Some(1.0), Some(3.0), Some(2.0)]),
        Column::new(
            "C",
            vec!["x".into(), "y".into(), "x".into(), "z".into(), "q".into()],
        ),
    ]);

    assert_eq!(table.remove_duplicate_rows().unwrap(), 1);
    let data = table.current().unwrap();
    assert_eq!(
        data.column("A").unwrap().present_f64(),
        vec![1.0, 2.0, 3.0, 2.0]
    );

    // No two identical rows survive; every survivor came from the input.
    let rows: Vec<_> = data.rows().collect();
    for i in 0..rows.len() {
        for j in i + 1..rows.len() {
            assert_ne!(rows[i], rows[j]);
        }
    }
    let original: Vec<_> = table.original().unwrap().rows().collect();
    assert!(rows.iter().all(|r| original.contains(r)));

    assert_eq!(table.remove_duplicate_rows().unwrap(), 0);
    assert_eq!(table.log().last().unwrap().operation, Operation::RemoveDuplicates);
}

#[test]
fn missing_cells_compare_equal_for_duplicates() {
    let mut table = table_with(vec![
        Column::numeric("A", &[None, None]),
        Column::numeric("B", &[Some(1.0), Some(1.0)]),
    ]);
    assert_eq!(table.remove_duplicate_rows().unwrap(), 1);
}

// ============================================================================
// Normalization Tests
// ============================================================================

#[test]
fn minmax_into_unit_interval() {
    let mut table = table_with(vec![
        Column::numeric("A", &[Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)]),
        Column::numeric("B", &[Some(7.0), Some(7.0), Some(7.0), Some(7.0), Some(7.0)]),
    ]);

    table.normalize(&["A", "B"], NormalizeMethod::MinMax).unwrap();

    for v in values(&table, "A").into_iter().flatten() {
        assert!((0.0..=1.0).contains(&v));
    }
    assert_eq!(values(&table, "A")[2], None);
    assert!(values(&table, "B").iter().all(|v| *v == Some(0.0)));
    assert_eq!(table.log().last().unwrap().operation, Operation::NormalizeData);
}

#[test]
fn minmax_twice_is_stable() {
    let mut table = table_with(vec![Column::numeric(
        "A",
        &[Some(3.0), Some(-1.0), Some(8.0)],
    )]);
    table.normalize(ALL, NormalizeMethod::MinMax).unwrap();
    let first = values(&table, "A");
    let changed = table.normalize(ALL, NormalizeMethod::MinMax).unwrap();
    let second = values(&table, "A");

    for (a, b) in first.iter().zip(&second) {
        assert_abs_diff_eq!(a.unwrap(), b.unwrap(), epsilon = 1e-12);
    }
    assert_eq!(changed, 0);
}

#[test]
fn zscore_has_zero_mean_unit_std() {
    let mut table = table_with(vec![Column::numeric(
        "A",
        &[Some(2.0), Some(4.0), Some(4.0), Some(4.0), Some(5.0), Some(5.0), Some(7.0), Some(9.0)],
    )]);
    table.normalize(&["A"], NormalizeMethod::ZScore).unwrap();

    let v: Vec<f64> = values(&table, "A").into_iter().flatten().collect();
    let n = v.len() as f64;
    let mean = v.iter().sum::<f64>() / n;
    let std = (v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
    assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
    assert_relative_eq!(std, 1.0, epsilon = 1e-12);
}

#[test]
fn maxabs_scales_by_largest_magnitude() {
    let mut table = table_with(vec![Column::numeric("A", &[Some(-8.0), Some(2.0), Some(4.0)])]);
    let changed = table.normalize(&["A"], NormalizeMethod::MaxAbs).unwrap();
    assert_eq!(values(&table, "A"), vec![Some(-1.0), Some(0.25), Some(0.5)]);
    assert_eq!(changed, 3);
}

#[test]
fn normalize_skips_all_missing_column() {
    let mut table = table_with(vec![
        Column::numeric("A", &[None, None]),
        Column::numeric("B", &[Some(1.0), Some(3.0)]),
    ]);
    table.normalize(ALL, NormalizeMethod::MinMax).unwrap();
    assert_eq!(values(&table, "A"), vec![None, None]);
    assert_eq!(values(&table, "B"), vec![Some(0.0), Some(1.0)]);
}

#[test]
fn normalize_rejects_text_column() {
    let mut table = table_with(vec![Column::new("C", vec!["x".into()])]);
    assert!(matches!(
        table.normalize(&["C"], NormalizeMethod::MinMax),
        Err(LabError::NonNumericColumn(c)) if c == "C"
    ));
}

// ============================================================================
// Imputation Tests
// ============================================================================

#[test]
fn fill_mean_replaces_gaps() {
    let mut table = table_with(vec![
        Column::numeric("A", &[Some(1.0), Some(2.0), None, Some(5.0), Some(5.0)]),
        Column::numeric("B", &[Some(10.0), Some(20.0), Some(30.0), None, Some(50.0)]),
        Column::new(
            "C",
            vec!["x".into(), "y".into(), "z".into(), "x".into(), CellValue::Missing],
        ),
    ]);

    let filled = table.fill_nulls(ALL, FillMethod::Mean).unwrap();
    assert_eq!(filled, 2);
    assert_eq!(values(&table, "A")[2], Some(3.25));
    assert_eq!(values(&table, "B")[3], Some(27.5));
    // Text columns are not imputed.
    assert!(table.current().unwrap().column("C").unwrap().values[4].is_missing());

    let rec = table.log().last().unwrap();
    assert_eq!(rec.operation, Operation::FillNullValues);
    assert_eq!(table.log().len(), 1);
}

#[test]
fn fill_linear_by_position() {
    let mut table = table_with(vec![Column::numeric(
        "A",
        &[Some(0.0), None, None, Some(6.0), None],
    )]);
    assert_eq!(table.fill_nulls(&["A"], FillMethod::LinearInterp).unwrap(), 3);
    assert_eq!(
        values(&table, "A"),
        vec![Some(0.0), Some(2.0), Some(4.0), Some(6.0), Some(6.0)]
    );
}

#[test]
fn fill_polynomial_follows_curve() {
    // y = i^3 - i
    let col: Vec<Option<f64>> = (0..7)
        .map(|i| {
            let x = i as f64;
            (i != 3).then_some(x * x * x - x)
        })
        .collect();
    let mut table = table_with(vec![Column::numeric("A", &col)]);
    table
        .fill_nulls(&["A"], FillMethod::PolynomialInterp { degree: 3 })
        .unwrap();
    assert_relative_eq!(values(&table, "A")[3].unwrap(), 24.0, epsilon = 1e-9);
}

#[test]
fn knn_k1_uses_nearest_row() {
    let mut table = table_with(vec![
        Column::numeric("x", &[Some(0.0), Some(1.0), Some(4.0), Some(9.0), Some(10.0)]),
        Column::numeric("y", &[Some(3.0), Some(7.0), None, Some(2.0), Some(8.0)]),
    ]);
    let filled = table
        .fill_nulls(&["y"], FillMethod::Knn { k: Some(1) })
        .unwrap();
    assert_eq!(filled, 1);
    // x = 4 sits closer to x = 1 than to x = 9.
    assert_relative_eq!(values(&table, "y")[2].unwrap(), 7.0, epsilon = 1e-12);
    assert_eq!(table.log().last().unwrap().operation, Operation::FillNullWithKnn);
}

#[test]
fn knn_averages_k_neighbours_and_keeps_present_cells() {
    let mut table = table_with(vec![
        Column::numeric("x", &[Some(0.0), Some(1.0), Some(2.0), Some(10.0)]),
        Column::numeric("y", &[Some(1.0), None, Some(3.0), Some(100.0)]),
    ]);
    table.fill_nulls(ALL, FillMethod::Knn { k: Some(2) }).unwrap();
    let y = values(&table, "y");
    assert_relative_eq!(y[1].unwrap(), 2.0, epsilon = 1e-12);
    assert_eq!(y[0], Some(1.0));
    assert_eq!(y[3], Some(100.0));
}

#[test]
fn knn_needs_two_numeric_columns() {
    let mut table = table_with(vec![
        Column::numeric("x", &[Some(1.0), None]),
        Column::new("C", vec!["a".into(), "b".into()]),
    ]);
    assert!(matches!(
        table.fill_nulls(ALL, FillMethod::Knn { k: None }),
        Err(LabError::InsufficientNumericColumns(1))
    ));
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn invalid_parameters() {
    let mut table = table_with(vec![
        Column::numeric("x", &[Some(1.0), None]),
        Column::numeric("y", &[Some(1.0), Some(2.0)]),
    ]);
    assert!(matches!(
        table.fill_nulls(ALL, FillMethod::PolynomialInterp { degree: 0 }),
        Err(LabError::InvalidDegree(0))
    ));
    assert!(matches!(
        table.fill_nulls(ALL, FillMethod::Knn { k: Some(0) }),
        Err(LabError::InvalidK(0))
    ));
    assert!(matches!(
        table.fill_nulls(&["nope"], FillMethod::Mean),
        Err(LabError::ColumnNotFound(c)) if c == "nope"
    ));
    assert!(table.log().is_empty());
}

#[test]
fn nothing_loaded() {
    let mut table = DataTable::new();
    assert!(matches!(table.remove_duplicate_rows(), Err(LabError::NoDataLoaded)));
    assert!(matches!(
        table.normalize(ALL, NormalizeMethod::ZScore),
        Err(LabError::NoDataLoaded)
    ));
    assert!(matches!(
        table.fill_nulls(ALL, FillMethod::Knn { k: None }),
        Err(LabError::NoDataLoaded)
    ));
}
