//! Parallel computation of per-lane reductions
//!
//! Every water-column or per-location computation in the crate maps a 1-D
//! lane of an N-dimensional array to a single value. This module runs that
//! map across the current rayon pool.

use crate::errors::{AcdError, Result};
use ndarray::{ArrayD, ArrayView1, Axis, Zip};

/// Map each lane along `axis` to one value using parallel processing
///
/// The output has the shape of `data` with `axis` removed.
///
/// # Errors
///
/// Returns an error if the axis is out of bounds.
pub fn par_map_lanes<F>(data: &ArrayD<f64>, axis: usize, f: F) -> Result<ArrayD<f64>>
where
    F: Fn(ArrayView1<f64>) -> f64 + Sync + Send,
{
    par_map_lanes_with(data, axis, f)
}

/// Like [`par_map_lanes`] but for any `Send` output type
///
/// # Errors
///
/// Returns an error if the axis is out of bounds.
pub fn par_map_lanes_with<F, R>(data: &ArrayD<f64>, axis: usize, f: F) -> Result<ArrayD<R>>
where
    F: Fn(ArrayView1<f64>) -> R + Sync + Send,
    R: Send,
{
    if axis >= data.ndim() {
        return Err(AcdError::ShapeMismatch {
            message: format!(
                "Axis {axis} is out of bounds for array with {} dimensions",
                data.ndim()
            ),
        });
    }

    let lanes = data.len() / data.len_of(Axis(axis)).max(1);
    tracing::trace!(
        lanes,
        threads = rayon::current_num_threads(),
        "mapping lanes in parallel"
    );

    Ok(Zip::from(data.lanes(Axis(axis))).par_map_collect(f))
}
