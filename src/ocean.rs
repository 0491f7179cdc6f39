//! Water-column metrics for gridded ocean data
//!
//! All functions take a [`LabeledArray`] with a depth-like dimension (by
//! default `pres`, as in Argo gridded products) and any number of horizontal
//! or time dimensions. Each vertical profile is processed independently and in
//! parallel; the depth dimension is removed from the results.

use crate::dataarray::{Dataset, LabeledArray};
use crate::errors::{AcdError, Result};
use crate::statistics::{
    rectangular_integral, trapezoidal_integral, StatOperation, StatisticalReduction,
};
use ndarray::{ArrayView1, Axis};

/// Default threshold for [`threshold_depth`], in the units of the input
pub const DEFAULT_THRESHOLD: f64 = 90.0;
/// Default layer bottom for [`layer_statistics`]
pub const DEFAULT_LAYER_DEPTH: f64 = 300.0;
/// Default name of the vertical dimension
pub const DEFAULT_DEPTH_DIM: &str = "pres";

/// Shallowest depth at which `values` is at or below `threshold`, `NaN` if never.
///
/// `NaN` samples never count as below the threshold.
pub fn first_depth_below(values: ArrayView1<f64>, depths: &[f64], threshold: f64) -> f64 {
    values
        .iter()
        .zip(depths)
        .filter(|(v, _)| **v <= threshold)
        .map(|(_, &z)| z)
        .fold(f64::NAN, f64::min)
}

/// Number of downward crossings: samples at or below `threshold` whose
/// shallower neighbour is above it (or missing).
///
/// A profile that starts below the threshold at its first sample does not
/// count that as a drop.
pub fn count_drops_below(values: ArrayView1<f64>, threshold: f64) -> usize {
    let mask: Vec<bool> = values.iter().map(|&v| v <= threshold).collect();
    mask.windows(2).filter(|w| !w[0] && w[1]).count()
}

/// Depth of the first threshold crossing and the number of crossings per column.
///
/// Returns `(first_depth_below_threshold, count_drops_below_threshold)`.
///
/// # Errors
///
/// Returns an error if `depth_dim` is not a dimension of `da` or carries
/// label coordinates.
pub fn threshold_depth(
    da: &LabeledArray,
    threshold: f64,
    depth_dim: &str,
) -> Result<(LabeledArray, LabeledArray)> {
    let depths = da.numeric_coord(depth_dim)?;
    tracing::info!(var = %da.name, threshold, depth_dim, "computing threshold depth");

    let first = da
        .reduce_dim(depth_dim, "first_depth_below_threshold", |lane| {
            first_depth_below(lane, &depths, threshold)
        })?
        .with_attr("threshold", threshold);

    let count = da
        .reduce_dim(depth_dim, "count_drops_below_threshold", |lane| {
            count_drops_below(lane, threshold) as f64
        })?
        .with_attr("threshold", threshold);

    Ok((first, count))
}

/// Linearly interpolate the depth at which a profile reaches `threshold`
/// between the bracketing samples `(z_above, v_above)` and `(z_below, v_below)`.
///
/// # Errors
///
/// Returns [`AcdError::DegenerateInterpolation`] when both bracketing values
/// are identical, since the crossing is then undefined.
pub fn interpolate_crossing_depth(
    z_above: f64,
    v_above: f64,
    z_below: f64,
    v_below: f64,
    threshold: f64,
) -> Result<f64> {
    if v_above == v_below {
        return Err(AcdError::DegenerateInterpolation { value: v_above });
    }
    Ok(z_above + (threshold - v_above) * (z_below - z_above) / (v_below - v_above))
}

/// Interpolated crossing depth of one profile, `NaN` if it never drops to `threshold`.
pub fn interpolated_depth_below(values: ArrayView1<f64>, depths: &[f64], threshold: f64) -> f64 {
    match values.iter().position(|&v| v <= threshold) {
        None => f64::NAN,
        Some(0) => depths[0],
        Some(k) => interpolate_crossing_depth(
            depths[k - 1],
            values[k - 1],
            depths[k],
            values[k],
            threshold,
        )
        .unwrap_or(f64::NAN),
    }
}

/// Per-column depth of the first crossing, refined by linear interpolation
/// between the last sample above and the first sample at or below `threshold`.
///
/// # Errors
///
/// Returns an error if `depth_dim` is missing or not numeric.
pub fn interpolated_threshold_depth(
    da: &LabeledArray,
    threshold: f64,
    depth_dim: &str,
) -> Result<LabeledArray> {
    let depths = da.numeric_coord(depth_dim)?;
    Ok(da
        .reduce_dim(depth_dim, "interpolated_depth_below_threshold", |lane| {
            interpolated_depth_below(lane, &depths, threshold)
        })?
        .with_attr("threshold", threshold))
}

/// Statistics and integrals from the surface down to `layer_depth`.
///
/// The profile is truncated to depths `<= layer_depth`, then the returned
/// dataset holds `<var>_mean`, `<var>_min`, `<var>_max`,
/// `<var>_layer_sum_integral` (rectangular rule, zero totals reported as
/// `NaN`) and `<var>_layer_trapezoidal_integral`.
///
/// # Errors
///
/// Returns an error if `depth_dim` is missing or no samples lie in the layer.
pub fn layer_statistics(
    da: &LabeledArray,
    var_name: &str,
    layer_depth: f64,
    depth_dim: &str,
) -> Result<Dataset> {
    let layer = da.select_where(depth_dim, |z| z <= layer_depth)?;
    let axis = layer.axis_of(depth_dim)?;
    if layer.data.len_of(Axis(axis)) == 0 {
        return Err(AcdError::EmptyLayer { layer_depth });
    }
    let depths = layer.numeric_coord(depth_dim)?;
    tracing::info!(
        var = var_name,
        layer_depth,
        levels = depths.len(),
        "computing layer statistics"
    );

    let mut ds = Dataset::new();
    for operation in [StatOperation::Mean, StatOperation::Min, StatOperation::Max] {
        let reduced = layer
            .reduce_over(depth_dim, operation)?
            .renamed(format!("{}_{}", var_name, operation.as_str()));
        ds.insert(reduced);
    }

    let sum_integral = layer.reduce_dim(
        depth_dim,
        &format!("{}_layer_sum_integral", var_name),
        |lane| {
            let total = rectangular_integral(lane, &depths);
            if total == 0.0 {
                f64::NAN
            } else {
                total
            }
        },
    )?;
    ds.insert(sum_integral);

    let trapezoidal = layer.reduce_dim(
        depth_dim,
        &format!("{}_layer_trapezoidal_integral", var_name),
        |lane| trapezoidal_integral(lane, &depths),
    )?;
    ds.insert(trapezoidal);

    ds.attrs.insert("layer_depth".to_string(), layer_depth.into());
    Ok(ds)
}
