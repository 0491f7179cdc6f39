//! Longitude conventions and small cleanup transforms

use crate::dataarray::{Coordinate, LabeledArray};
use crate::errors::{AcdError, Result};

fn remap_longitude<F>(da: &LabeledArray, lon_dim: &str, f: F) -> Result<LabeledArray>
where
    F: Fn(f64) -> f64,
{
    let lons = match da.coord(lon_dim) {
        Some(Coordinate::Numeric(values)) => values.iter().map(|&v| f(v)).collect(),
        Some(Coordinate::Labels(_)) => {
            return Err(AcdError::InvalidCoordinate {
                dim: lon_dim.to_string(),
                message: "longitude must be numeric".to_string(),
            })
        }
        None => {
            return Err(AcdError::InvalidCoordinate {
                dim: lon_dim.to_string(),
                message: "no longitude coordinate attached".to_string(),
            })
        }
    };
    da.clone()
        .with_coord(lon_dim, Coordinate::Numeric(lons))?
        .sort_by_coord(lon_dim)
}

/// Shift longitudes into `[0, 360)` and sort along each listed dimension.
///
/// Attributes are preserved.
pub fn align_lon(da: &LabeledArray, lon_dims: &[&str]) -> Result<LabeledArray> {
    let mut out = da.clone();
    for dim in lon_dims {
        out = remap_longitude(&out, dim, |lon| (lon + 360.0).rem_euclid(360.0))?;
    }
    Ok(out)
}

/// Convert longitudes from `[0, 360)` to `[-180, 180)` and sort.
pub fn convert_longitude_360_to_180(da: &LabeledArray, lon_dim: &str) -> Result<LabeledArray> {
    remap_longitude(da, lon_dim, |lon| (lon + 180.0).rem_euclid(360.0) - 180.0)
}

/// Replace exact zeros by `NaN`, noting it in the attributes.
pub fn replace_zero_with_nan(da: &LabeledArray) -> LabeledArray {
    da.mapv(|v| if v == 0.0 { f64::NAN } else { v })
        .with_attr("post_processing_note", "zero values replaced with NaNs")
}
