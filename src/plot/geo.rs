//! Land polygons and coastlines read from GeoJSON

use crate::errors::{AcdError, Result};
use serde_json::Value;
use std::path::Path;

/// Geographic shapes as `(lon, lat)` vertex lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoFeatures {
    /// Outer rings of polygons (holes are ignored)
    pub polygons: Vec<Vec<(f64, f64)>>,
    pub lines: Vec<Vec<(f64, f64)>>,
}

impl GeoFeatures {
    /// Read a GeoJSON file
    pub fn from_geojson_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let features = Self::from_geojson_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            polygons = features.polygons.len(),
            lines = features.lines.len(),
            "loaded geographic features"
        );
        Ok(features)
    }

    /// Parse a GeoJSON document (`FeatureCollection`, `Feature` or bare geometry)
    pub fn from_geojson_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let mut features = Self::default();
        features.collect(&value)?;
        Ok(features)
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.lines.is_empty()
    }

    fn collect(&mut self, value: &Value) -> Result<()> {
        let kind = value.get("type").and_then(Value::as_str).unwrap_or("");
        match kind {
            "FeatureCollection" => {
                for feature in value
                    .get("features")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                {
                    self.collect(feature)?;
                }
            }
            "Feature" => {
                if let Some(geometry) = value.get("geometry").filter(|g| !g.is_null()) {
                    self.collect(geometry)?;
                }
            }
            "GeometryCollection" => {
                for geometry in value
                    .get("geometries")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                {
                    self.collect(geometry)?;
                }
            }
            "Polygon" => {
                let rings = coordinates(value)?;
                if let Some(outer) = rings.as_array().and_then(|r| r.first()) {
                    self.polygons.push(positions(outer)?);
                }
            }
            "MultiPolygon" => {
                for polygon in coordinates(value)?.as_array().into_iter().flatten() {
                    if let Some(outer) = polygon.as_array().and_then(|r| r.first()) {
                        self.polygons.push(positions(outer)?);
                    }
                }
            }
            "LineString" => self.lines.push(positions(coordinates(value)?)?),
            "MultiLineString" => {
                for line in coordinates(value)?.as_array().into_iter().flatten() {
                    self.lines.push(positions(line)?);
                }
            }
            "Point" | "MultiPoint" => {}
            other => {
                return Err(AcdError::InvalidParameter {
                    message: format!("unsupported GeoJSON type '{}'", other),
                })
            }
        }
        Ok(())
    }
}

fn coordinates(geometry: &Value) -> Result<&Value> {
    geometry
        .get("coordinates")
        .ok_or_else(|| AcdError::InvalidParameter {
            message: "GeoJSON geometry without coordinates".to_string(),
        })
}

fn positions(value: &Value) -> Result<Vec<(f64, f64)>> {
    let bad = || AcdError::InvalidParameter {
        message: "GeoJSON position must hold at least two numbers".to_string(),
    };
    value
        .as_array()
        .ok_or_else(bad)?
        .iter()
        .map(|p| {
            let lon = p.get(0).and_then(Value::as_f64).ok_or_else(bad)?;
            let lat = p.get(1).and_then(Value::as_f64).ok_or_else(bad)?;
            Ok((lon, lat))
        })
        .collect()
}
