//! NetCDF I/O: reading variables into labeled arrays and writing datasets
//!
//! Reading decodes CF packing (`scale_factor`, `add_offset`) and turns fill
//! values into `NaN`. Writing copies attributes, stores numeric and label
//! coordinates, and stamps a `history` attribute, the same way computed
//! results have always been persisted by this crate.

use crate::dataarray::{AttrValue, Coordinate, Dataset, LabeledArray};
use crate::errors::{AcdError, Result};
use chrono::Utc;
use ndarray::ArrayD;
use netcdf::{create, AttributeValue, File};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::fs;

/// Convert a NetCDF attribute into an [`AttrValue`], if it is a supported kind
pub fn attr_value(value: AttributeValue) -> Option<AttrValue> {
    let value = match value {
        AttributeValue::Str(s) => AttrValue::Str(s),
        AttributeValue::Strs(ss) => AttrValue::Strs(ss),
        AttributeValue::Float(v) => AttrValue::Num(f64::from(v)),
        AttributeValue::Floats(vs) => AttrValue::Nums(vs.into_iter().map(f64::from).collect()),
        AttributeValue::Double(v) => AttrValue::Num(v),
        AttributeValue::Doubles(vs) => AttrValue::Nums(vs),
        AttributeValue::Int(v) => AttrValue::Num(f64::from(v)),
        AttributeValue::Ints(vs) => AttrValue::Nums(vs.into_iter().map(f64::from).collect()),
        AttributeValue::Short(v) => AttrValue::Num(f64::from(v)),
        AttributeValue::Shorts(vs) => AttrValue::Nums(vs.into_iter().map(f64::from).collect()),
        AttributeValue::Uchar(v) => AttrValue::Num(f64::from(v)),
        AttributeValue::Uchars(vs) => AttrValue::Nums(vs.into_iter().map(f64::from).collect()),
        AttributeValue::Schar(v) => AttrValue::Num(f64::from(v)),
        AttributeValue::Schars(vs) => AttrValue::Nums(vs.into_iter().map(f64::from).collect()),
        AttributeValue::Ushort(v) => AttrValue::Num(f64::from(v)),
        AttributeValue::Ushorts(vs) => AttrValue::Nums(vs.into_iter().map(f64::from).collect()),
        AttributeValue::Uint(v) => AttrValue::Num(f64::from(v)),
        AttributeValue::Uints(vs) => AttrValue::Nums(vs.into_iter().map(f64::from).collect()),
        AttributeValue::Longlong(v) => AttrValue::Num(v as f64),
        AttributeValue::Longlongs(vs) => {
            AttrValue::Nums(vs.into_iter().map(|v| v as f64).collect())
        }
        AttributeValue::Ulonglong(v) => AttrValue::Num(v as f64),
        AttributeValue::Ulonglongs(vs) => {
            AttrValue::Nums(vs.into_iter().map(|v| v as f64).collect())
        }
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    Some(value)
}

/// All readable attributes of a variable
pub fn variable_attributes(file: &File, var_name: &str) -> Result<BTreeMap<String, AttrValue>> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| AcdError::VariableNotFound {
            var: var_name.to_string(),
        })?;
    let mut attrs = BTreeMap::new();
    for attr in var.attributes() {
        match attr.value() {
            Ok(value) => {
                if let Some(v) = attr_value(value) {
                    attrs.insert(attr.name().to_string(), v);
                }
            }
            Err(e) => {
                tracing::warn!(attr = attr.name(), error = %e, "skipping unreadable attribute")
            }
        }
    }
    Ok(attrs)
}

fn numeric_attr(attrs: &BTreeMap<String, AttrValue>, key: &str) -> Option<f64> {
    match attrs.get(key) {
        Some(AttrValue::Num(v)) => Some(*v),
        Some(AttrValue::Nums(vs)) => vs.first().copied(),
        _ => None,
    }
}

/// Read one coordinate variable (1-D, named after its dimension), if present
fn read_coordinate(file: &File, dim: &str) -> Option<Coordinate> {
    let var = file.variable(dim)?;
    let dims = var.dimensions();
    if dims.len() != 1 || dims[0].name() != dim {
        return None;
    }
    match var.get_values::<f64, _>(..) {
        Ok(values) => Some(Coordinate::Numeric(values)),
        Err(e) => {
            tracing::debug!(dim, error = %e, "coordinate is not numeric, leaving it unlabeled");
            None
        }
    }
}

/// Read a variable into a [`LabeledArray`] with its coordinates and attributes
///
/// # Errors
///
/// Returns an error if the variable does not exist or cannot be read as
/// floating point data.
pub fn read_variable(file: &File, var_name: &str) -> Result<LabeledArray> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| AcdError::VariableNotFound {
            var: var_name.to_string(),
        })?;

    let dims: Vec<String> = var
        .dimensions()
        .iter()
        .map(|d| d.name().to_string())
        .collect();
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let mut values: Vec<f64> = var.get_values::<f64, _>(..)?;
    let attrs = variable_attributes(file, var_name)?;

    let fill = numeric_attr(&attrs, "_FillValue").or_else(|| numeric_attr(&attrs, "missing_value"));
    let scale = numeric_attr(&attrs, "scale_factor").unwrap_or(1.0);
    let offset = numeric_attr(&attrs, "add_offset").unwrap_or(0.0);
    for v in values.iter_mut() {
        if fill.is_some_and(|f| *v == f) {
            *v = f64::NAN;
        } else {
            *v = *v * scale + offset;
        }
    }

    tracing::debug!(var = var_name, ?shape, "loaded variable");
    let data = ArrayD::from_shape_vec(shape, values)?;
    let mut array = LabeledArray::new(var_name, dims.clone(), data)?;
    for dim in &dims {
        if let Some(coord) = read_coordinate(file, dim) {
            array = array.with_coord(dim, coord)?;
        }
    }
    array.attrs = attrs;
    Ok(array)
}

/// Read the same variable from several files and join them along `concat_dim`
///
/// Files are read in path order, which for CMIP-style names is time order.
///
/// # Errors
///
/// Returns an error if `paths` is empty, any file fails to open, or the pieces
/// disagree on any dimension other than `concat_dim`.
pub fn open_mf_variable(
    paths: &[PathBuf],
    var_name: &str,
    concat_dim: &str,
) -> Result<LabeledArray> {
    let mut sorted: Vec<&PathBuf> = paths.iter().collect();
    sorted.sort();

    let mut parts = Vec::with_capacity(sorted.len());
    for path in sorted {
        tracing::debug!(path = %path.display(), var = var_name, "opening");
        let file = netcdf::open(path)?;
        parts.push(read_variable(&file, var_name)?);
    }

    match parts.len() {
        0 => Err(AcdError::Generic(format!(
            "no files given for variable '{}'",
            var_name
        ))),
        1 => Ok(parts.remove(0)),
        _ => LabeledArray::concat(&parts, concat_dim),
    }
}

/// Writes a [`Dataset`] to a new NetCDF file
pub struct DatasetWriter<'a> {
    output_path: &'a Path,
}

impl<'a> DatasetWriter<'a> {
    /// Create a new NetCDF writer
    pub fn new(output_path: &'a Path) -> Self {
        Self { output_path }
    }

    /// Write every variable of `ds`, replacing any existing file
    pub fn write(&self, ds: &Dataset) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let mut file = create(self.output_path)?;

        // Define each dimension once, with consistent lengths
        let mut dim_lens: Vec<(String, usize)> = Vec::new();
        for var in ds.iter() {
            for (dim, &len) in var.dims.iter().zip(var.shape()) {
                match dim_lens.iter().find(|(d, _)| d == dim) {
                    Some((_, existing)) if *existing != len => {
                        return Err(AcdError::ShapeMismatch {
                            message: format!(
                                "dimension '{}' has length {} in one variable and {} in '{}'",
                                dim, existing, len, var.name
                            ),
                        })
                    }
                    Some(_) => {}
                    None => {
                        file.add_dimension(dim, len)?;
                        dim_lens.push((dim.clone(), len));
                    }
                }
            }
        }

        // Coordinate variables, first definition wins
        let mut written: Vec<String> = Vec::new();
        for var in ds.iter() {
            for (dim, coord) in &var.coords {
                if written.contains(dim) || ds.get(dim).is_some() {
                    continue;
                }
                match coord {
                    Coordinate::Numeric(values) => {
                        let mut cvar = file.add_variable::<f64>(dim, &[dim.as_str()])?;
                        cvar.put_values(values, ..)?;
                    }
                    Coordinate::Labels(labels) => {
                        let mut cvar = file.add_string_variable(dim, &[dim.as_str()])?;
                        for (i, label) in labels.iter().enumerate() {
                            cvar.put_string(label, [i])?;
                        }
                    }
                }
                written.push(dim.clone());
            }
        }

        for var in ds.iter() {
            let dim_refs: Vec<&str> = var.dims.iter().map(|s| s.as_str()).collect();
            let mut new_var = file.add_variable::<f64>(&var.name, &dim_refs)?;
            new_var.put_attribute("_FillValue", f64::NAN)?;

            let values: Vec<f64> = var.data.iter().copied().collect();
            new_var.put_values(&values, ..)?;

            for (key, value) in var.attrs.iter().filter(|(k, _)| k.as_str() != "_FillValue") {
                match value {
                    AttrValue::Str(s) => new_var.put_attribute(key, s.as_str())?,
                    AttrValue::Strs(ss) => new_var.put_attribute(key, ss.clone())?,
                    AttrValue::Num(v) => new_var.put_attribute(key, *v)?,
                    AttrValue::Nums(vs) => new_var.put_attribute(key, vs.clone())?,
                };
            }
        }

        for (key, value) in &ds.attrs {
            match value {
                AttrValue::Str(s) => file.add_attribute(key, s.as_str())?,
                AttrValue::Strs(ss) => file.add_attribute(key, ss.clone())?,
                AttrValue::Num(v) => file.add_attribute(key, *v)?,
                AttrValue::Nums(vs) => file.add_attribute(key, vs.clone())?,
            };
        }

        // Add history attribute
        file.add_attribute(
            "history",
            format!("Created by acd_tools on {}", Utc::now().to_rfc3339()),
        )?;

        tracing::info!(path = %self.output_path.display(), variables = ds.len(), "wrote dataset");
        Ok(())
    }
}

/// Write a dataset to `output_path`
pub fn write_dataset(ds: &Dataset, output_path: &Path) -> Result<()> {
    DatasetWriter::new(output_path).write(ds)
}
