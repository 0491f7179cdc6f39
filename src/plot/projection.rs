//! Map projection and geographic extent

use crate::errors::{AcdError, Result};

/// Map projection of a figure
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Equirectangular projection centred on `central_longitude`
    PlateCarree { central_longitude: f64 },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::PlateCarree {
            central_longitude: 0.0,
        }
    }
}

impl Projection {
    pub fn central_longitude(&self) -> f64 {
        match self {
            Projection::PlateCarree { central_longitude } => *central_longitude,
        }
    }

    /// Projected x of a longitude, in `[-180, 180)`
    pub fn x(&self, lon: f64) -> f64 {
        (lon - self.central_longitude() + 180.0).rem_euclid(360.0) - 180.0
    }

    /// Project a geographic point to map coordinates (degrees)
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        (self.x(lon), lat)
    }

    /// Project a ring or line keeping it continuous: each vertex is placed
    /// within 180° of the previous one, so the result may leave `[-180, 180)`
    /// where the shape straddles the map edge.
    pub fn unwrap(&self, points: &[(f64, f64)]) -> Vec<(f64, f64)> {
        let mut out: Vec<(f64, f64)> = Vec::with_capacity(points.len());
        for &(lon, lat) in points {
            let x = match out.last() {
                None => self.x(lon),
                Some(&(px, _)) => px + (self.x(lon) - px + 180.0).rem_euclid(360.0) - 180.0,
            };
            out.push((x, lat));
        }
        out
    }
}

/// Geographic bounds `[lon_min, lon_max, lat_min, lat_max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl Extent {
    /// # Errors
    ///
    /// Returns [`AcdError::InvalidParameter`] for an empty or inverted range.
    pub fn new(bounds: [f64; 4]) -> Result<Self> {
        let [lon_min, lon_max, lat_min, lat_max] = bounds;
        if !(lon_max > lon_min && lat_max > lat_min) || lon_max - lon_min > 360.0 {
            return Err(AcdError::InvalidParameter {
                message: format!("invalid map extent {:?}", bounds),
            });
        }
        Ok(Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        })
    }

    /// Projected x range; the right edge is unwrapped past the left one
    pub fn x_range(&self, projection: &Projection) -> (f64, f64) {
        let x0 = projection.x(self.lon_min);
        let mut x1 = projection.x(self.lon_max);
        if x1 <= x0 {
            x1 += 360.0;
        }
        (x0, x1)
    }
}

