use std::fmt;

// ---------------------------------------------------------------------------
// Per-column scaling
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMethod {
    /// `(x - min) / (max - min)`
    MinMax,
    /// `(x - mean) / std`, sample standard deviation.
    ZScore,
    /// `x / max(|x|)`
    MaxAbs,
}

impl fmt::Display for NormalizeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeMethod::MinMax => write!(f, "min-max scaling"),
            NormalizeMethod::ZScore => write!(f, "z-score scaling"),
            NormalizeMethod::MaxAbs => write!(f, "max-abs scaling"),
        }
    }
}

/// Scale one numeric column.
///
/// Returns `None` when the column has no present value (left untouched).
/// A degenerate column (zero range, zero std or all zeros) maps every cell,
/// missing ones included, to `0.0`.
pub fn normalize_column(values: &[Option<f64>], method: NormalizeMethod) -> Option<Vec<Option<f64>>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }

    let (shift, scale) = match method {
        NormalizeMethod::MinMax => {
            let min = present.iter().copied().fold(f64::INFINITY, f64::min);
            let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (min, max - min)
        }
        NormalizeMethod::ZScore => {
            let mean = mean(&present);
            (mean, sample_std(&present, mean))
        }
        NormalizeMethod::MaxAbs => {
            let max_abs = present.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
            (0.0, max_abs)
        }
    };

    if scale == 0.0 {
        log::debug!("degenerate column under {method}, mapping to 0");
        return Some(vec![Some(0.0); values.len()]);
    }

    Some(
        values
            .iter()
            .map(|v| v.map(|x| (x - shift) / scale))
            .collect(),
    )
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1); zero for fewer than two values.
pub(crate) fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}
