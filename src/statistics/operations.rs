//! Core statistical operations and traits
//!
//! This module defines the reduction kinds and the NaN-skipping kernels they
//! apply to each 1-D lane of an array.

use crate::dataarray::LabeledArray;
use crate::errors::Result;
use ndarray::ArrayView1;

/// Supported statistical operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatOperation {
    /// Arithmetic mean
    Mean,
    /// Sum of values
    Sum,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
}

impl StatOperation {
    /// Suffix used when naming a reduced variable, e.g. `oxy_mean`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Apply the operation to a single lane
    #[must_use]
    pub fn apply(self, lane: ArrayView1<f64>) -> f64 {
        match self {
            Self::Mean => nan_mean(lane),
            Self::Sum => nan_sum(lane),
            Self::Min => nan_min(lane),
            Self::Max => nan_max(lane),
        }
    }
}

/// Mean of the non-NaN values, `NaN` when there are none
///
/// Infinities are kept, so a lane holding `inf` averages to `inf`.
#[must_use]
pub fn nan_mean(lane: ArrayView1<f64>) -> f64 {
    let mut sum = 0.0_f64;
    let mut count = 0_usize;
    for &value in lane.iter() {
        if !value.is_nan() {
            sum += value;
            count += 1;
        }
    }
    if count > 0 {
        sum / count as f64
    } else {
        f64::NAN
    }
}

/// Sum of the non-NaN values; an all-NaN lane sums to 0 like `xarray.sum`
#[must_use]
pub fn nan_sum(lane: ArrayView1<f64>) -> f64 {
    lane.iter().filter(|v| !v.is_nan()).sum()
}

/// Minimum of the non-NaN values, `NaN` when there are none
#[must_use]
pub fn nan_min(lane: ArrayView1<f64>) -> f64 {
    lane.iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<f64>, &x| Some(acc.map_or(x, |a| a.min(x))))
        .unwrap_or(f64::NAN)
}

/// Maximum of the non-NaN values, `NaN` when there are none
#[must_use]
pub fn nan_max(lane: ArrayView1<f64>) -> f64 {
    lane.iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<f64>, &x| Some(acc.map_or(x, |a| a.max(x))))
        .unwrap_or(f64::NAN)
}

/// Trait for types that can perform statistical reductions over a named dimension
pub trait StatisticalReduction {
    /// Reduce `dim` with `operation`, naming the result `<name>_<operation>`
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension does not exist.
    fn reduce_over(&self, dim: &str, operation: StatOperation) -> Result<LabeledArray>;
}

impl StatisticalReduction for LabeledArray {
    fn reduce_over(&self, dim: &str, operation: StatOperation) -> Result<LabeledArray> {
        let name = format!("{}_{}", self.name, operation.as_str());
        tracing::debug!(var = %self.name, dim, op = operation.as_str(), "reducing");
        self.reduce_dim(dim, &name, move |lane| operation.apply(lane))
    }
}
