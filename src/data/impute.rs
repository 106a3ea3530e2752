use std::fmt;

use super::normalize::mean;
use crate::fit::lagrange::lagrange_eval;

/// Neighbour count used when a KNN fill does not name one.
pub const KNN_DEFAULT_K: usize = 5;

// ---------------------------------------------------------------------------
// FillMethod – how missing cells are imputed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMethod {
    /// Column mean of the present values.
    Mean,
    /// Straight line between neighbouring present values, by row position.
    LinearInterp,
    /// Lagrange polynomial through the `degree + 1` nearest present values.
    PolynomialInterp { degree: usize },
    /// Average of the `k` nearest rows over all numeric columns.
    Knn { k: Option<usize> },
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillMethod::Mean => write!(f, "mean"),
            FillMethod::LinearInterp => write!(f, "linear interpolation"),
            FillMethod::PolynomialInterp { degree } => {
                write!(f, "polynomial interpolation of degree {degree}")
            }
            FillMethod::Knn { k } => write!(f, "KNN with {} neighbours", k.unwrap_or(KNN_DEFAULT_K)),
        }
    }
}

// ---------------------------------------------------------------------------
// Single-column strategies
// ---------------------------------------------------------------------------

/// Replace gaps with the mean of the present values. Returns the number of
/// cells filled (zero for an all-missing column).
pub fn fill_mean(values: &mut [Option<f64>]) -> usize {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return 0;
    }
    let m = mean(&present);
    fill_where_missing(values, |_| Some(m))
}

/// Positional linear interpolation, forward direction: interior gaps are
/// interpolated, trailing gaps repeat the last present value, leading gaps
/// stay missing.
pub fn fill_linear(values: &mut [Option<f64>]) -> usize {
    let known: Vec<(usize, f64)> = known_points(values);
    let Some(&(last_idx, last_val)) = known.last() else {
        return 0;
    };

    let mut filled = 0;
    for pair in known.windows(2) {
        let (i0, v0) = pair[0];
        let (i1, v1) = pair[1];
        for (p, slot) in values.iter_mut().enumerate().take(i1).skip(i0 + 1) {
            let t = (p - i0) as f64 / (i1 - i0) as f64;
            *slot = Some(v0 + (v1 - v0) * t);
            filled += 1;
        }
    }
    for slot in values.iter_mut().skip(last_idx + 1) {
        *slot = Some(last_val);
        filled += 1;
    }
    filled
}

/// Positional polynomial interpolation of interior gaps.
///
/// Each gap is evaluated on the Lagrange polynomial through the `degree + 1`
/// present values closest to it by row position. Columns with fewer present
/// values than that are left untouched.
pub fn fill_polynomial(values: &mut [Option<f64>], degree: usize) -> usize {
    let known = known_points(values);
    let needed = degree + 1;
    if known.len() < needed {
        return 0;
    }
    let (first, last) = (known[0].0, known[known.len() - 1].0);

    let mut filled = 0;
    for p in first + 1..last {
        if values[p].is_some() {
            continue;
        }
        let mut nearest = known.clone();
        nearest.sort_by_key(|&(i, _)| (i.abs_diff(p), i));
        nearest.truncate(needed);
        nearest.sort_by_key(|&(i, _)| i);

        let xs: Vec<f64> = nearest.iter().map(|&(i, _)| i as f64).collect();
        let ys: Vec<f64> = nearest.iter().map(|&(_, v)| v).collect();
        values[p] = Some(lagrange_eval(&xs, &ys, p as f64));
        filled += 1;
    }
    filled
}

fn known_points(values: &[Option<f64>]) -> Vec<(usize, f64)> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect()
}

fn fill_where_missing(values: &mut [Option<f64>], f: impl Fn(usize) -> Option<f64>) -> usize {
    let mut filled = 0;
    for (i, slot) in values.iter_mut().enumerate() {
        if slot.is_none() {
            if let Some(v) = f(i) {
                *slot = Some(v);
                filled += 1;
            }
        }
    }
    filled
}

// ---------------------------------------------------------------------------
// KNN imputation
// ---------------------------------------------------------------------------

/// Impute the `targets` columns of `columns` with k-nearest-neighbour means.
///
/// Every column takes part in the distance after min-max scaling with its own
/// range. Distances use only coordinates present in both rows, rescaled by
/// `total / present`. Neighbours are rows where the target column is present;
/// all imputations are computed from the data as it was before the call.
/// Present cells are never rewritten. Returns the number of cells filled.
pub fn knn_impute(columns: &mut [Vec<Option<f64>>], targets: &[usize], k: usize) -> usize {
    let n_cols = columns.len();
    let n_rows = columns.first().map_or(0, Vec::len);

    let ranges: Vec<(f64, f64)> = columns
        .iter()
        .map(|col| {
            let present: Vec<f64> = col.iter().flatten().copied().collect();
            let min = present.iter().copied().fold(f64::INFINITY, f64::min);
            let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if present.is_empty() {
                (0.0, 1.0)
            } else if max == min {
                (min, 1.0)
            } else {
                (min, max - min)
            }
        })
        .collect();

    let scaled: Vec<Vec<Option<f64>>> = columns
        .iter()
        .zip(&ranges)
        .map(|(col, &(min, range))| col.iter().map(|v| v.map(|x| (x - min) / range)).collect())
        .collect();

    let distance = |a: usize, b: usize| -> Option<f64> {
        let mut sum = 0.0;
        let mut present = 0usize;
        for col in &scaled {
            if let (Some(x), Some(y)) = (col[a], col[b]) {
                sum += (x - y).powi(2);
                present += 1;
            }
        }
        (present > 0).then(|| (sum * n_cols as f64 / present as f64).sqrt())
    };

    let mut imputed: Vec<(usize, usize, f64)> = Vec::new();
    for &t in targets {
        let target = &scaled[t];
        let donors: Vec<usize> = (0..n_rows).filter(|&r| target[r].is_some()).collect();
        if donors.is_empty() {
            continue;
        }
        let fallback = {
            let present: Vec<f64> = target.iter().flatten().copied().collect();
            mean(&present)
        };

        for r in (0..n_rows).filter(|&r| target[r].is_none()) {
            let mut ranked: Vec<(f64, usize)> = donors
                .iter()
                .filter_map(|&d| distance(r, d).map(|dist| (dist, d)))
                .collect();
            let value = if ranked.is_empty() {
                log::warn!("row {r} shares no coordinates with any donor, using column mean");
                fallback
            } else {
                ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                ranked.truncate(k);
                let sum: f64 = ranked.iter().filter_map(|&(_, d)| target[d]).sum();
                sum / ranked.len() as f64
            };
            let (min, range) = ranges[t];
            imputed.push((t, r, value * range + min));
        }
    }

    for &(t, r, v) in &imputed {
        columns[t][r] = Some(v);
    }
    imputed.len()
}
