//! NetCDF metadata inspection and variable description functionality
//!
//! This module provides functions for examining NetCDF file structure,
//! listing variables and dimensions, and describing variable attributes.

use crate::dataarray::AttrValue;
use crate::errors::{AcdError, Result};
use crate::netcdf_io::variable_attributes;
use crate::table::{wrap_words, Table};
use netcdf::File;
use std::collections::BTreeMap;

/// Maximum characters per line when printing long attribute strings
pub const ATTRIBUTE_WRAP_WIDTH: usize = 100;

/// Information about a dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionInfo {
    pub name: String,
    pub length: usize,
    pub is_unlimited: bool,
}

/// Structured summary of a NetCDF variable
#[derive(Debug, Clone)]
pub struct VariableMetadata {
    pub name: String,
    pub data_type: String,
    pub dimensions: Vec<DimensionInfo>,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl VariableMetadata {
    pub fn total_elements(&self) -> usize {
        self.dimensions.iter().map(|d| d.length).product()
    }
}

/// Get structured metadata for a variable
pub fn get_variable_metadata(file: &File, var_name: &str) -> Result<VariableMetadata> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| AcdError::VariableNotFound {
            var: var_name.to_string(),
        })?;

    let dimensions = var
        .dimensions()
        .iter()
        .map(|d| DimensionInfo {
            name: d.name().to_string(),
            length: d.len(),
            is_unlimited: d.is_unlimited(),
        })
        .collect();

    Ok(VariableMetadata {
        name: var_name.to_string(),
        data_type: format!("{:?}", var.vartype()).to_lowercase(),
        dimensions,
        attributes: variable_attributes(file, var_name)?,
    })
}

/// Lists all variables and dimensions in a clean, organized format.
pub fn list_variables_and_dimensions(file: &File) -> Result<()> {
    let mut dimensions: Vec<_> = file.dimensions().collect();
    dimensions.sort_by_key(|d| d.name().to_string());

    let mut dim_table = Table::new(["Dimension", "Length"]);
    for dim in dimensions {
        let length_info = if dim.is_unlimited() {
            format!("{} (unlimited)", dim.len())
        } else {
            dim.len().to_string()
        };
        dim_table.add_row([dim.name().to_string(), length_info]);
    }
    dim_table.print();

    let mut variables: Vec<_> = file.variables().collect();
    variables.sort_by_key(|v| v.name().to_string());

    let mut var_table = Table::new(["Variable", "Dimensions", "Shape"]);
    for var in variables {
        let dims: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        let shape: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| d.len().to_string())
            .collect();
        if dims.is_empty() {
            var_table.add_row([var.name().to_string(), "(scalar)".to_string(), String::new()]);
        } else {
            var_table.add_row([var.name().to_string(), dims.join(", "), shape.join(" × ")]);
        }
    }
    var_table.print();

    Ok(())
}

/// Build the `Attribute | Value` table for a set of attributes, wrapping long strings
pub fn attribute_table(attrs: &BTreeMap<String, AttrValue>) -> Table {
    let mut table = Table::new(["Attribute", "Value"]);
    for (key, value) in attrs {
        let text = match value {
            AttrValue::Str(s) => wrap_words(s, ATTRIBUTE_WRAP_WIDTH),
            other => other.to_string(),
        };
        table.add_row([key.clone(), text]);
    }
    table
}

/// Describes a specific variable showing its data type, shape, and all attributes.
pub fn describe_variable(file: &File, var_name: &str) -> Result<VariableMetadata> {
    let meta = get_variable_metadata(file, var_name)?;

    println!("\n Variable Description: {}", var_name);
    println!("={}", "=".repeat(var_name.len() + 25));
    println!(" Data type: {}", meta.data_type);
    if meta.dimensions.is_empty() {
        println!(" Dimensions: (scalar)");
    } else {
        let dims: Vec<String> = meta
            .dimensions
            .iter()
            .map(|d| format!("{}[{}]", d.name, d.length))
            .collect();
        println!(" Dimensions: {}", dims.join(", "));
    }
    println!(" Total elements: {}", meta.total_elements());

    attribute_table(&meta.attributes).print();
    Ok(meta)
}
