//! Numerical integration of a lane over its coordinate

use ndarray::ArrayView1;

/// Rectangular-rule integral, each value weighted by the spacing to the sample above it.
///
/// Computes `Σ_{k>=1} v[k] * (z[k] - z[k-1])`, skipping non-finite products.
/// The first sample has no spacing above it and does not contribute.
#[must_use]
pub fn rectangular_integral(values: ArrayView1<f64>, coord: &[f64]) -> f64 {
    let mut total = 0.0;
    for k in 1..values.len().min(coord.len()) {
        let term = values[k] * (coord[k] - coord[k - 1]);
        if term.is_finite() {
            total += term;
        }
    }
    total
}

/// Trapezoidal-rule integral; any `NaN` sample propagates to the result.
#[must_use]
pub fn trapezoidal_integral(values: ArrayView1<f64>, coord: &[f64]) -> f64 {
    let mut total = 0.0;
    for k in 1..values.len().min(coord.len()) {
        total += (coord[k] - coord[k - 1]) * (values[k] + values[k - 1]) / 2.0;
    }
    total
}
