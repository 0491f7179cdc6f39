//! Labeled N-dimensional arrays
//!
//! A [`LabeledArray`] is an `ndarray::ArrayD<f64>` whose axes carry names,
//! optional coordinate values and a bag of attributes, the same shape of data
//! a NetCDF variable has on disk. Missing values are stored as `NaN`.

use crate::errors::{AcdError, Result};
use crate::statistics::parallel::par_map_lanes;
use ndarray::{ArrayD, ArrayView1, Axis};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute value attached to an array or a dataset
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Strs(Vec<String>),
    Num(f64),
    Nums(Vec<f64>),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => write!(f, "{}", s),
            AttrValue::Strs(ss) => write!(f, "{}", ss.join(", ")),
            AttrValue::Num(v) => write!(f, "{}", v),
            AttrValue::Nums(vs) => {
                let parts: Vec<String> = vs.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Num(value)
    }
}

/// Coordinate values along one dimension
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinate {
    Numeric(Vec<f64>),
    Labels(Vec<String>),
}

impl Coordinate {
    pub fn len(&self) -> usize {
        match self {
            Coordinate::Numeric(v) => v.len(),
            Coordinate::Labels(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Coordinate::Numeric(v) => Some(v),
            Coordinate::Labels(_) => None,
        }
    }

    pub fn as_labels(&self) -> Option<&[String]> {
        match self {
            Coordinate::Labels(v) => Some(v),
            Coordinate::Numeric(_) => None,
        }
    }

    fn take(&self, indices: &[usize]) -> Self {
        match self {
            Coordinate::Numeric(v) => Coordinate::Numeric(indices.iter().map(|&i| v[i]).collect()),
            Coordinate::Labels(v) => {
                Coordinate::Labels(indices.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }

    fn concat(parts: &[&Coordinate], dim: &str) -> Result<Self> {
        match parts.first() {
            Some(Coordinate::Numeric(_)) => {
                let mut out = Vec::new();
                for part in parts {
                    let values = part.as_numeric().ok_or_else(|| AcdError::InvalidCoordinate {
                        dim: dim.to_string(),
                        message: "cannot concatenate numeric and label coordinates".to_string(),
                    })?;
                    out.extend_from_slice(values);
                }
                Ok(Coordinate::Numeric(out))
            }
            Some(Coordinate::Labels(_)) => {
                let mut out = Vec::new();
                for part in parts {
                    let labels = part.as_labels().ok_or_else(|| AcdError::InvalidCoordinate {
                        dim: dim.to_string(),
                        message: "cannot concatenate numeric and label coordinates".to_string(),
                    })?;
                    out.extend_from_slice(labels);
                }
                Ok(Coordinate::Labels(out))
            }
            None => Ok(Coordinate::Numeric(Vec::new())),
        }
    }
}

/// An N-dimensional array with named dimensions, coordinates and attributes
#[derive(Debug, Clone)]
pub struct LabeledArray {
    pub name: String,
    pub dims: Vec<String>,
    pub coords: BTreeMap<String, Coordinate>,
    pub attrs: BTreeMap<String, AttrValue>,
    pub data: ArrayD<f64>,
}

impl LabeledArray {
    /// Create an array, checking that there is one unique name per axis
    pub fn new(name: impl Into<String>, dims: Vec<String>, data: ArrayD<f64>) -> Result<Self> {
        let name = name.into();
        if dims.len() != data.ndim() {
            return Err(AcdError::ShapeMismatch {
                message: format!(
                    "'{}' has {} dimension names for a {}-dimensional array",
                    name,
                    dims.len(),
                    data.ndim()
                ),
            });
        }
        for (i, dim) in dims.iter().enumerate() {
            if dims[..i].contains(dim) {
                return Err(AcdError::ShapeMismatch {
                    message: format!("dimension '{}' appears twice in '{}'", dim, name),
                });
            }
        }
        Ok(Self {
            name,
            dims,
            coords: BTreeMap::new(),
            attrs: BTreeMap::new(),
            data,
        })
    }

    /// Attach coordinate values to a dimension
    pub fn with_coord(mut self, dim: &str, coord: Coordinate) -> Result<Self> {
        let axis = self.axis_of(dim)?;
        let expected = self.data.len_of(Axis(axis));
        if coord.len() != expected {
            return Err(AcdError::InvalidCoordinate {
                dim: dim.to_string(),
                message: format!("expected {} values, got {}", expected, coord.len()),
            });
        }
        self.coords.insert(dim.to_string(), coord);
        Ok(self)
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Axis index of a named dimension
    pub fn axis_of(&self, dim: &str) -> Result<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .ok_or_else(|| AcdError::DimensionNotFound {
                var: self.name.clone(),
                dim: dim.to_string(),
            })
    }

    pub fn coord(&self, dim: &str) -> Option<&Coordinate> {
        self.coords.get(dim)
    }

    /// Numeric coordinate values of a dimension, `0..n` when none are attached
    pub fn numeric_coord(&self, dim: &str) -> Result<Vec<f64>> {
        let axis = self.axis_of(dim)?;
        match self.coords.get(dim) {
            Some(Coordinate::Numeric(v)) => Ok(v.clone()),
            Some(Coordinate::Labels(_)) => Err(AcdError::InvalidCoordinate {
                dim: dim.to_string(),
                message: "coordinate holds labels, numeric values are required".to_string(),
            }),
            None => Ok((0..self.data.len_of(Axis(axis))).map(|i| i as f64).collect()),
        }
    }

    /// Select positions along `dim`, in the given order
    pub fn take(&self, dim: &str, indices: &[usize]) -> Result<Self> {
        let axis = self.axis_of(dim)?;
        let len = self.data.len_of(Axis(axis));
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(AcdError::ShapeMismatch {
                message: format!(
                    "index {} out of range for dimension '{}' of length {}",
                    bad, dim, len
                ),
            });
        }
        let data = self.data.select(Axis(axis), indices);
        let mut coords = self.coords.clone();
        if let Some(coord) = self.coords.get(dim) {
            coords.insert(dim.to_string(), coord.take(indices));
        }
        Ok(Self {
            name: self.name.clone(),
            dims: self.dims.clone(),
            coords,
            attrs: self.attrs.clone(),
            data,
        })
    }

    /// Keep the positions along `dim` whose coordinate satisfies `keep`
    pub fn select_where<F>(&self, dim: &str, keep: F) -> Result<Self>
    where
        F: Fn(f64) -> bool,
    {
        let values = self.numeric_coord(dim)?;
        let indices: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| keep(v))
            .map(|(i, _)| i)
            .collect();
        self.take(dim, &indices)
    }

    /// Reorder along `dim` so the numeric coordinate is ascending
    pub fn sort_by_coord(&self, dim: &str) -> Result<Self> {
        let values = self.numeric_coord(dim)?;
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        self.take(dim, &order)
    }

    /// Apply `f` element-wise, keeping labels and attributes
    pub fn mapv<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            name: self.name.clone(),
            dims: self.dims.clone(),
            coords: self.coords.clone(),
            attrs: self.attrs.clone(),
            data: self.data.mapv(f),
        }
    }

    /// Collapse `dim` by applying `f` to every 1-D lane along it, in parallel.
    ///
    /// The result drops `dim` and its coordinate; attributes are not carried
    /// over since the reduced quantity usually has different meaning.
    pub fn reduce_dim<F>(&self, dim: &str, name: &str, f: F) -> Result<Self>
    where
        F: Fn(ArrayView1<f64>) -> f64 + Sync + Send,
    {
        let axis = self.axis_of(dim)?;
        let data = par_map_lanes(&self.data, axis, f)?;
        self.reduced_with(dim, name, data)
    }

    /// Wrap `data`, already reduced over `dim`, with this array's remaining
    /// dimensions and coordinates.
    pub fn reduced_with(&self, dim: &str, name: &str, data: ArrayD<f64>) -> Result<Self> {
        self.axis_of(dim)?;
        let dims: Vec<String> = self.dims.iter().filter(|d| *d != dim).cloned().collect();
        if dims.len() != data.ndim() {
            return Err(AcdError::ShapeMismatch {
                message: format!(
                    "reduced data has {} dimensions, expected {}",
                    data.ndim(),
                    dims.len()
                ),
            });
        }
        let coords = self
            .coords
            .iter()
            .filter(|(k, _)| k.as_str() != dim)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Self {
            name: name.to_string(),
            dims,
            coords,
            attrs: BTreeMap::new(),
            data,
        })
    }

    /// Join arrays end to end along an existing dimension
    pub fn concat(parts: &[LabeledArray], dim: &str) -> Result<Self> {
        let first = parts.first().ok_or_else(|| AcdError::ShapeMismatch {
            message: "nothing to concatenate".to_string(),
        })?;
        let axis = first.axis_of(dim)?;
        for part in &parts[1..] {
            if part.dims != first.dims {
                return Err(AcdError::ShapeMismatch {
                    message: format!(
                        "dimensions [{}] do not match [{}]",
                        part.dims.join(", "),
                        first.dims.join(", ")
                    ),
                });
            }
        }
        let views: Vec<_> = parts.iter().map(|p| p.data.view()).collect();
        let data = ndarray::concatenate(Axis(axis), &views)?;

        let mut coords = first.coords.clone();
        if first.coords.contains_key(dim) {
            let pieces: Vec<&Coordinate> = parts.iter().filter_map(|p| p.coords.get(dim)).collect();
            if pieces.len() != parts.len() {
                return Err(AcdError::InvalidCoordinate {
                    dim: dim.to_string(),
                    message: "some parts carry no coordinate to concatenate".to_string(),
                });
            }
            coords.insert(dim.to_string(), Coordinate::concat(&pieces, dim)?);
        }
        Ok(Self {
            name: first.name.clone(),
            dims: first.dims.clone(),
            coords,
            attrs: first.attrs.clone(),
            data,
        })
    }

    /// Stack same-shaped arrays along a new leading dimension labelled by `labels`
    pub fn stack(parts: &[LabeledArray], dim: &str, labels: Vec<String>) -> Result<Self> {
        let first = parts.first().ok_or_else(|| AcdError::ShapeMismatch {
            message: "nothing to stack".to_string(),
        })?;
        if labels.len() != parts.len() {
            return Err(AcdError::InvalidCoordinate {
                dim: dim.to_string(),
                message: format!("{} labels for {} arrays", labels.len(), parts.len()),
            });
        }
        for part in &parts[1..] {
            if part.dims != first.dims || part.shape() != first.shape() {
                return Err(AcdError::ShapeMismatch {
                    message: format!(
                        "cannot stack shape {:?} {:?} onto shape {:?} {:?}",
                        part.dims,
                        part.shape(),
                        first.dims,
                        first.shape()
                    ),
                });
            }
        }
        let views: Vec<_> = parts.iter().map(|p| p.data.view()).collect();
        let data = ndarray::stack(Axis(0), &views)?;

        let mut dims = Vec::with_capacity(first.dims.len() + 1);
        dims.push(dim.to_string());
        dims.extend(first.dims.iter().cloned());

        let mut stacked = Self::new(first.name.clone(), dims, data)?;
        stacked.coords = first.coords.clone();
        stacked.attrs = first.attrs.clone();
        stacked.with_coord(dim, Coordinate::Labels(labels))
    }
}

/// An ordered collection of named arrays plus global attributes
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub attrs: BTreeMap<String, AttrValue>,
    variables: Vec<LabeledArray>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an array under its own name, replacing any previous one
    pub fn insert(&mut self, var: LabeledArray) {
        match self.variables.iter_mut().find(|v| v.name == var.name) {
            Some(slot) => *slot = var,
            None => self.variables.push(var),
        }
    }

    pub fn get(&self, name: &str) -> Option<&LabeledArray> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Like [`Dataset::get`] but fails with `VariableNotFound`
    pub fn variable(&self, name: &str) -> Result<&LabeledArray> {
        self.get(name).ok_or_else(|| AcdError::VariableNotFound {
            var: name.to_string(),
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabeledArray> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
