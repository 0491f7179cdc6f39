//! Statistical reductions along a named dimension
//!
//! This module provides NaN-aware reductions (mean, sum, min, max) and the
//! two numerical integration rules used for water-column layers.
//!
//! # Organization
//!
//! - [`operations`]: Reduction kinds and the [`StatisticalReduction`] trait
//! - [`parallel`]: Rayon lane mapping shared by every per-column computation
//! - [`integrate`]: Rectangular and trapezoidal integrals over a coordinate

pub mod integrate;
pub mod operations;
pub mod parallel;

pub use integrate::{rectangular_integral, trapezoidal_integral};
pub use operations::{
    nan_max, nan_mean, nan_min, nan_sum, StatOperation, StatisticalReduction,
};
pub use parallel::par_map_lanes;
