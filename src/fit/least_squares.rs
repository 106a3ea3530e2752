use nalgebra::{DMatrix, DVector};

// ---------------------------------------------------------------------------
// Ordinary least squares
// ---------------------------------------------------------------------------

/// Closed-form simple regression `y = a·x + b`.
///
/// A constant `x` has no defined slope; the fit falls back to `a = 0` and
/// `b = mean(y)`.
pub fn linear(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len() as f64;
    let (mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        sx += xi;
        sy += yi;
        sxx += xi * xi;
        sxy += xi * yi;
    }
    let x_mean = sx / n;
    let y_mean = sy / n;
    let var = sxx - sx * x_mean;
    if var == 0.0 {
        return (0.0, y_mean);
    }
    let slope = (sxy - sx * y_mean) / var;
    (slope, y_mean - slope * x_mean)
}

/// Least-squares polynomial of the given degree, coefficients ordered from the
/// highest power down to the constant term.
///
/// Solves the Vandermonde system `V c = y` through a Householder QR of `V`,
/// with every column scaled to unit norm first. Pivots below
/// `max|R_ii| · max(n, m) · ε` are treated as zero and their term dropped,
/// so the caller must already have checked for `degree + 1` distinct x.
pub fn polynomial(x: &[f64], y: &[f64], degree: usize) -> Vec<f64> {
    let m = degree + 1;
    let n = x.len();

    let norms: Vec<f64> = (0..m)
        .map(|j| {
            let norm = x
                .iter()
                .map(|&xi| xi.powi(j as i32).powi(2))
                .sum::<f64>()
                .sqrt();
            if norm > 0.0 && norm.is_finite() {
                norm
            } else {
                1.0
            }
        })
        .collect();
    let vandermonde = DMatrix::from_fn(n, m, |i, j| x[i].powi(j as i32) / norms[j]);
    let rhs = DVector::from_column_slice(y);

    let qr = vandermonde.qr();
    let qty = qr.q().transpose() * rhs;
    let r = qr.r();

    let tol = r.diagonal().amax() * n.max(m) as f64 * f64::EPSILON;
    let mut scaled = vec![0.0; m];
    for row in (0..m).rev() {
        let pivot = r[(row, row)];
        if pivot.abs() <= tol {
            log::warn!("rank-deficient polynomial fit, dropping the x^{row} term");
            continue;
        }
        let tail: f64 = (row + 1..m).map(|k| r[(row, k)] * scaled[k]).sum();
        scaled[row] = (qty[row] - tail) / pivot;
    }

    scaled
        .iter()
        .zip(&norms)
        .rev()
        .map(|(c, norm)| c / norm)
        .collect()
}

/// Horner evaluation of descending-order coefficients.
pub fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().fold(0.0, |acc, &c| acc * x + c)
}
