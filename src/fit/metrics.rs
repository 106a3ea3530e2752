use serde::Serialize;

/// Goodness of fit against the observed values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Coefficient of determination.
    pub r2: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Mean squared error.
    pub mse: f64,
}

impl Metrics {
    /// Compare observed `y_true` with predictions `y_pred` (same length).
    ///
    /// With constant observations R² is 1.0 for a perfect prediction and 0.0
    /// otherwise.
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Self {
        let n = y_true.len() as f64;
        if y_true.is_empty() {
            return Metrics {
                r2: f64::NAN,
                mae: f64::NAN,
                mse: f64::NAN,
            };
        }
        let mean = y_true.iter().sum::<f64>() / n;

        let (mut abs_sum, mut ss_res, mut ss_tot) = (0.0, 0.0, 0.0);
        for (&t, &p) in y_true.iter().zip(y_pred) {
            let residual = t - p;
            abs_sum += residual.abs();
            ss_res += residual * residual;
            ss_tot += (t - mean).powi(2);
        }

        let r2 = if ss_tot == 0.0 {
            if ss_res == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - ss_res / ss_tot
        };

        Metrics {
            r2,
            mae: abs_sum / n,
            mse: ss_res / n,
        }
    }
}
