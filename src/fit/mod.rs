//! Curve fitting over two numeric columns of a [`Dataset`].
//!
//! ```text
//!   Dataset ──(x_col, y_col)──▶ numeric pairs ──▶ model ──▶ FitResult
//!                                                   │
//!                         linear │ polynomial │ lagrange
//! ```
//!
//! Every fit is evaluated at each observed x, and the metrics compare those
//! predictions with every observed y.
pub mod lagrange;
pub mod least_squares;
pub mod metrics;

use std::fmt::Write as _;

use serde::Serialize;

use crate::data::model::Dataset;
use crate::error::{LabError, Result};
pub use metrics::Metrics;

// ---------------------------------------------------------------------------
// FitModel – the fitted parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitModel {
    Linear { slope: f64, intercept: f64 },
    /// Coefficients from the highest power down to the constant.
    Polynomial { coefficients: Vec<f64> },
    /// Interpolation nodes of the Lagrange polynomial.
    Lagrange { x_points: Vec<f64>, y_points: Vec<f64> },
}

impl FitModel {
    pub fn predict(&self, x: f64) -> f64 {
        match self {
            FitModel::Linear { slope, intercept } => slope * x + intercept,
            FitModel::Polynomial { coefficients } => least_squares::polyval(coefficients, x),
            FitModel::Lagrange { x_points, y_points } => {
                lagrange::lagrange_eval(x_points, y_points, x)
            }
        }
    }

    /// Human-readable equation with coefficients to 4 decimals.
    pub fn equation(&self) -> String {
        match self {
            FitModel::Linear { slope, intercept } => {
                format!("y = {slope:.4}x{}", signed_term(*intercept))
            }
            FitModel::Polynomial { coefficients } => polynomial_equation(coefficients),
            FitModel::Lagrange { x_points, y_points } => {
                lagrange::lagrange_expression(x_points, y_points)
            }
        }
    }
}

fn signed_term(v: f64) -> String {
    if v < 0.0 {
        format!(" - {:.4}", -v)
    } else {
        format!(" + {v:.4}")
    }
}

fn polynomial_equation(coefficients: &[f64]) -> String {
    let degree = coefficients.len().saturating_sub(1);
    let mut eq = String::from("y = ");
    for (i, &c) in coefficients.iter().enumerate() {
        let power = degree - i;
        if i == 0 {
            let _ = write!(eq, "{c:.4}");
        } else {
            eq.push_str(&signed_term(c));
        }
        match power {
            0 => {}
            1 => eq.push('x'),
            p => {
                let _ = write!(eq, "x^{p}");
            }
        }
    }
    eq
}

// ---------------------------------------------------------------------------
// FitResult – what the caller plots and reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    pub x_column: String,
    pub y_column: String,
    pub model: FitModel,
    /// Observed x values, in row order.
    pub x: Vec<f64>,
    /// Model evaluated at each observed x.
    pub y_fit: Vec<f64>,
    pub equation: String,
    pub metrics: Metrics,
}

impl FitResult {
    fn new(x_column: &str, y_column: &str, model: FitModel, x: Vec<f64>, y: &[f64]) -> Self {
        let y_fit: Vec<f64> = x.iter().map(|&xi| model.predict(xi)).collect();
        let metrics = Metrics::compute(y, &y_fit);
        let equation = model.equation();
        log::debug!(
            "fit {y_column} ~ {x_column}: {equation} (R² = {:.4})",
            metrics.r2
        );
        FitResult {
            x_column: x_column.to_string(),
            y_column: y_column.to_string(),
            model,
            x,
            y_fit,
            equation,
            metrics,
        }
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.model.predict(x)
    }

    /// Evaluate the model on `n` evenly spaced points between the smallest and
    /// largest observed x, for drawing a smooth curve.
    pub fn sample_curve(&self, n: usize) -> Vec<(f64, f64)> {
        let min = self.x.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if self.x.is_empty() || n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return vec![(min, self.predict(min))];
        }
        let step = (max - min) / (n - 1) as f64;
        (0..n)
            .map(|i| {
                let x = if i == n - 1 { max } else { min + step * i as f64 };
                (x, self.predict(x))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// CurveFitter
// ---------------------------------------------------------------------------

/// Stateless regression and interpolation routines.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurveFitter;

impl CurveFitter {
    /// Ordinary least squares `y = a·x + b`.
    pub fn linear(data: &Dataset, x_col: &str, y_col: &str) -> Result<FitResult> {
        let (x, y) = numeric_pairs(data, x_col, y_col)?;
        require_points(x.len(), 2)?;
        let (slope, intercept) = least_squares::linear(&x, &y);
        Ok(FitResult::new(
            x_col,
            y_col,
            FitModel::Linear { slope, intercept },
            x,
            &y,
        ))
    }

    /// Least-squares polynomial of `degree >= 1`.
    pub fn polynomial(data: &Dataset, x_col: &str, y_col: &str, degree: usize) -> Result<FitResult> {
        if degree < 1 {
            return Err(LabError::InvalidDegree(degree));
        }
        let (x, y) = numeric_pairs(data, x_col, y_col)?;
        require_points(x.len(), degree + 1)?;
        require_points(distinct_count(&x), degree + 1)?;

        let coefficients = least_squares::polynomial(&x, &y, degree);
        Ok(FitResult::new(
            x_col,
            y_col,
            FitModel::Polynomial { coefficients },
            x,
            &y,
        ))
    }

    /// Lagrange interpolation through `degree + 1` control points picked by
    /// row position, evaluated over the whole column.
    pub fn lagrange(data: &Dataset, x_col: &str, y_col: &str, degree: usize) -> Result<FitResult> {
        if degree < 1 {
            return Err(LabError::InvalidDegree(degree));
        }
        let (x, y) = numeric_pairs(data, x_col, y_col)?;
        require_points(x.len(), degree + 1)?;

        let indices = lagrange::control_indices(x.len(), degree);
        let x_points: Vec<f64> = indices.iter().map(|&i| x[i]).collect();
        let y_points: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
        if distinct_count(&x_points) < x_points.len() {
            log::warn!("lagrange control points share x values; the curve will not be finite");
        }
        Ok(FitResult::new(
            x_col,
            y_col,
            FitModel::Lagrange { x_points, y_points },
            x,
            &y,
        ))
    }
}

/// Pull `(x, y)` pairs out of two columns, coercing numeric text and skipping
/// rows where either side is missing.
fn numeric_pairs(data: &Dataset, x_col: &str, y_col: &str) -> Result<(Vec<f64>, Vec<f64>)> {
    let xs = data
        .column(x_col)
        .ok_or_else(|| LabError::ColumnNotFound(x_col.to_string()))?;
    let ys = data
        .column(y_col)
        .ok_or_else(|| LabError::ColumnNotFound(y_col.to_string()))?;

    let mut x = Vec::with_capacity(xs.values.len());
    let mut y = Vec::with_capacity(ys.values.len());
    for (cx, cy) in xs.values.iter().zip(&ys.values) {
        let vx = cx
            .coerce_f64()
            .map_err(|_| LabError::NonNumericColumn(x_col.to_string()))?;
        let vy = cy
            .coerce_f64()
            .map_err(|_| LabError::NonNumericColumn(y_col.to_string()))?;
        if let (Some(vx), Some(vy)) = (vx, vy) {
            x.push(vx);
            y.push(vy);
        }
    }
    Ok((x, y))
}

fn require_points(available: usize, required: usize) -> Result<()> {
    if available < required {
        return Err(LabError::InsufficientPoints {
            required,
            available,
        });
    }
    Ok(())
}

fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_equation_text() {
        let m = FitModel::Linear {
            slope: 2.0,
            intercept: -1.5,
        };
        assert_eq!(m.equation(), "y = 2.0000x - 1.5000");
    }

    #[test]
    fn polynomial_equation_text() {
        let m = FitModel::Polynomial {
            coefficients: vec![1.0, 0.0, 3.0],
        };
        assert_eq!(m.equation(), "y = 1.0000x^2 + 0.0000x + 3.0000");
    }

    #[test]
    fn sample_curve_spans_data() {
        let r = FitResult::new(
            "x",
            "y",
            FitModel::Linear {
                slope: 1.0,
                intercept: 0.0,
            },
            vec![2.0, 0.0, 4.0],
            &[2.0, 0.0, 4.0],
        );
        let curve = r.sample_curve(5);
        assert_eq!(curve.len(), 5);
        assert_eq!(curve[0], (0.0, 0.0));
        assert_eq!(curve[4], (4.0, 4.0));
        assert_eq!(curve[2], (2.0, 2.0));
    }
}
