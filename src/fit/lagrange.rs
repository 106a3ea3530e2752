use std::fmt::Write as _;

/// Row positions of the `degree + 1` control points: first, last and evenly
/// spaced intermediates, by row index (truncated), not by x value.
pub fn control_indices(n_rows: usize, degree: usize) -> Vec<usize> {
    if degree == 0 || n_rows == 0 {
        return vec![0];
    }
    (0..=degree).map(|i| i * (n_rows - 1) / degree).collect()
}

/// Evaluate the Lagrange polynomial through `(xs[i], ys[i])` at `x`.
pub fn lagrange_eval(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let mut result = 0.0;
    for (i, (&xi, &yi)) in xs.iter().zip(ys).enumerate() {
        let mut term = yi;
        for (j, &xj) in xs.iter().enumerate() {
            if i != j {
                term *= (x - xj) / (xi - xj);
            }
        }
        result += term;
    }
    result
}

/// Weighted-basis form with the numbers substituted:
/// `P(x) = (y0 / d0) * (x - x1) * ... + (y1 / d1) * (x - x0) * ...`
/// where `d_i` is the product of `(x_i - x_j)` over `j != i`.
pub fn lagrange_expression(xs: &[f64], ys: &[f64]) -> String {
    let terms: Vec<String> = xs
        .iter()
        .zip(ys)
        .enumerate()
        .map(|(i, (&xi, &yi))| {
            let mut denominator = 1.0;
            let mut factors = Vec::with_capacity(xs.len().saturating_sub(1));
            for (j, &xj) in xs.iter().enumerate() {
                if i != j {
                    factors.push(shifted_x(xj));
                    denominator *= xi - xj;
                }
            }
            let mut term = format!("({yi:.4} / {denominator:.4})");
            for factor in factors {
                let _ = write!(term, " * {factor}");
            }
            term
        })
        .collect();
    format!("P(x) = {}", terms.join(" + "))
}

fn shifted_x(xj: f64) -> String {
    if xj < 0.0 {
        format!("(x + {:.4})", -xj)
    } else {
        format!("(x - {xj:.4})")
    }
}
