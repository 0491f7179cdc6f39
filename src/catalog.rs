//! ESM datastore catalogs
//!
//! An ESM datastore is a table with one row per file ("asset") and one column
//! per facet (`source_id`, `member_id`, `variable_id`, `path`, ...), plus an
//! optional JSON descriptor naming the CSV and the facets that identify a
//! dataset. This module loads such catalogs, searches them, and reports what
//! they contain as console tables.

use crate::dataarray::AttrValue;
use crate::errors::{AcdError, Result};
use crate::metadata::attribute_table;
use crate::netcdf_io::variable_attributes;
use crate::table::Table;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Columns dropped by [`EsmDatastore::report_unique`] unless told otherwise
pub const DEFAULT_DROP_LIST: [&str; 5] = [
    "path",
    "time_range",
    "member_id",
    "version",
    "derived_variable_id",
];

/// Dataset-identifying facets used when the descriptor does not name any
pub const DEFAULT_GROUPBY_ATTRS: [&str; 7] = [
    "activity_id",
    "institution_id",
    "source_id",
    "experiment_id",
    "member_id",
    "table_id",
    "grid_label",
];

/// `aggregation_control` block of a catalog descriptor
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationControl {
    pub variable_column_name: String,
    #[serde(default)]
    pub groupby_attrs: Vec<String>,
}

/// JSON descriptor pointing at the CSV table
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub catalog_file: String,
    #[serde(default)]
    pub aggregation_control: Option<AggregationControl>,
}

/// Column/value filter for [`EsmDatastore::search`]
///
/// A row matches when, for every term, its value in the column equals one
/// of the listed values.
#[derive(Debug, Clone, Default)]
pub struct Query {
    terms: Vec<(String, Vec<String>)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<S: Into<String>>(
        mut self,
        column: &str,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.terms
            .push((column.to_string(), values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Options for [`EsmDatastore::report_unique`]
#[derive(Debug, Clone)]
pub struct UniqueReport {
    /// Keep only these columns; takes precedence over `drop_list`
    pub keep_list: Option<Vec<String>>,
    /// Columns to leave out
    pub drop_list: Option<Vec<String>>,
    pub header: [String; 2],
}

impl Default for UniqueReport {
    fn default() -> Self {
        Self {
            keep_list: None,
            drop_list: Some(DEFAULT_DROP_LIST.iter().map(|s| s.to_string()).collect()),
            header: ["Category".to_string(), "Unique values".to_string()],
        }
    }
}

/// An in-memory ESM datastore
#[derive(Debug, Clone)]
pub struct EsmDatastore {
    name: String,
    columns: Vec<String>,
    records: Vec<Vec<String>>,
    groupby_attrs: Vec<String>,
    variable_column: String,
}

impl EsmDatastore {
    /// Build a datastore from column names and rows
    ///
    /// # Errors
    ///
    /// Returns an error if a row's length differs from the number of columns.
    pub fn from_records(
        name: &str,
        columns: Vec<String>,
        records: Vec<Vec<String>>,
    ) -> Result<Self> {
        if let Some((i, row)) = records.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(AcdError::InvalidCatalog {
                message: format!(
                    "row {} has {} fields, expected {}",
                    i + 1,
                    row.len(),
                    columns.len()
                ),
            });
        }
        let groupby_attrs = DEFAULT_GROUPBY_ATTRS
            .iter()
            .filter(|a| columns.iter().any(|c| c == *a))
            .map(|a| a.to_string())
            .collect();
        Ok(Self {
            name: name.to_string(),
            columns,
            records,
            groupby_attrs,
            variable_column: "variable_id".to_string(),
        })
    }

    /// Load the table from a CSV file with a header row
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(record.iter().map(str::to_string).collect());
        }
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog".to_string());
        tracing::info!(path = %path.display(), assets = records.len(), "loaded catalog table");
        Self::from_records(&name, columns, records)
    }

    /// Load a JSON descriptor and the CSV it points to (relative to the descriptor)
    pub fn from_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let descriptor: CatalogDescriptor = serde_json::from_str(&text)?;
        let csv_path = {
            let candidate = PathBuf::from(&descriptor.catalog_file);
            if candidate.is_absolute() {
                candidate
            } else {
                path.parent().unwrap_or_else(|| Path::new(".")).join(candidate)
            }
        };
        let mut store = Self::from_csv(&csv_path)?;
        if let Some(id) = descriptor.id {
            store.name = id;
        }
        if let Some(agg) = descriptor.aggregation_control {
            store.variable_column = agg.variable_column_name;
            if !agg.groupby_attrs.is_empty() {
                store.groupby_attrs = agg.groupby_attrs;
            }
        }
        Ok(store)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of assets (rows)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn groupby_attrs(&self) -> &[String] {
        &self.groupby_attrs
    }

    pub fn variable_column(&self) -> &str {
        &self.variable_column
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| AcdError::UnknownColumn {
                column: column.to_string(),
            })
    }

    /// Values of one column, in row order
    pub fn column_values(&self, column: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(column)?;
        Ok(self.records.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Value of `column` in row `row`
    pub fn value(&self, row: usize, column: &str) -> Result<&str> {
        let idx = self.column_index(column)?;
        self.records
            .get(row)
            .map(|r| r[idx].as_str())
            .ok_or_else(|| AcdError::InvalidCatalog {
                message: format!("row {} out of range ({} rows)", row, self.records.len()),
            })
    }

    /// Rows matching every term of `query`
    ///
    /// # Errors
    ///
    /// Returns [`AcdError::UnknownColumn`] if the query names a missing column.
    pub fn search(&self, query: &Query) -> Result<Self> {
        let mut compiled = Vec::with_capacity(query.terms.len());
        for (column, values) in &query.terms {
            compiled.push((self.column_index(column)?, values));
        }
        let records: Vec<Vec<String>> = self
            .records
            .iter()
            .filter(|row| {
                compiled
                    .iter()
                    .all(|(idx, values)| values.iter().any(|v| *v == row[*idx]))
            })
            .cloned()
            .collect();
        tracing::debug!(catalog = %self.name, matched = records.len(), "search");
        Ok(Self {
            name: self.name.clone(),
            columns: self.columns.clone(),
            records,
            groupby_attrs: self.groupby_attrs.clone(),
            variable_column: self.variable_column.clone(),
        })
    }

    /// Sorted unique non-empty values of every column
    pub fn unique(&self) -> BTreeMap<String, Vec<String>> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let mut values: Vec<String> = self
                    .records
                    .iter()
                    .map(|r| r[idx].clone())
                    .filter(|v| !v.is_empty())
                    .collect();
                values.sort();
                values.dedup();
                (column.clone(), values)
            })
            .collect()
    }

    /// Group rows into datasets keyed by the dot-joined groupby facets
    pub fn dataset_keys(&self) -> BTreeMap<String, Vec<usize>> {
        let idxs: Vec<usize> = self
            .groupby_attrs
            .iter()
            .filter_map(|a| self.columns.iter().position(|c| c == a))
            .collect();
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (row_idx, row) in self.records.iter().enumerate() {
            let key: Vec<&str> = idxs.iter().map(|&i| row[i].as_str()).collect();
            groups.entry(key.join(".")).or_default().push(row_idx);
        }
        groups
    }

    /// Column names usable as search terms, printed as a one-column table
    pub fn list_query_kwargs(&self) -> Vec<String> {
        let mut table = Table::new(["Possible query kwargs"]);
        for column in &self.columns {
            table.add_row([column.clone()]);
        }
        table.print();
        self.columns.clone()
    }

    /// Print a `Category | Unique values` table and return what was printed
    ///
    /// Each value list is sorted and the categories appear alphabetically.
    pub fn report_unique(
        &self,
        report: &UniqueReport,
    ) -> (BTreeMap<String, Vec<String>>, Vec<Vec<String>>) {
        let mut unique = self.unique();
        if let Some(keep) = &report.keep_list {
            unique.retain(|k, _| keep.contains(k));
        } else if let Some(drop) = &report.drop_list {
            unique.retain(|k, _| !drop.contains(k));
        }

        let mut table = Table::new(report.header.iter().cloned());
        for (key, values) in &unique {
            table.add_row([key.clone(), values.join("\n")]);
        }
        table.print();

        let rows = table.rows().to_vec();
        (unique, rows)
    }

    /// Print and return the attributes of `var_name`, read from the first file listing it
    ///
    /// # Errors
    ///
    /// Returns an error if no asset carries the variable or the file cannot be read.
    pub fn var_name_info(&self, var_name: &str) -> Result<BTreeMap<String, AttrValue>> {
        let hits = self.search(&Query::new().with(&self.variable_column, [var_name]))?;
        let path = hits
            .column_values("path")?
            .first()
            .map(|p| PathBuf::from(*p))
            .ok_or_else(|| AcdError::VariableNotFound {
                var: var_name.to_string(),
            })?;

        let file = netcdf::open(&path)?;
        let attrs = variable_attributes(&file, var_name)?;

        println!(
            "*** Variable: \x1b[1m{}\x1b[0m from catalog: {} ***",
            var_name, self
        );
        attribute_table(&attrs).print();
        Ok(attrs)
    }
}

impl fmt::Display for EsmDatastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} catalog with {} dataset(s) from {} asset(s)>",
            self.name,
            self.dataset_keys().len(),
            self.records.len()
        )
    }
}
