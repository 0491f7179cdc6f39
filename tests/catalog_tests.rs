mod common;

use acd_tools::catalog::{EsmDatastore, Query, UniqueReport};
use acd_tools::dataarray::AttrValue;
use acd_tools::errors::{AcdError, Result};
use std::fs;
use tempfile::tempdir;

const CSV: &str = "\
source_id,experiment_id,member_id,variable_id,grid_label,time_range,path
ACCESS-ESM1-5,historical,r1i1p1f1,tos,gn,185001-201412,/data/a.nc
ACCESS-ESM1-5,historical,r2i1p1f1,tos,gn,185001-201412,/data/b.nc
ACCESS-ESM1-5,ssp585,r1i1p1f1,tos,gn,,/data/c.nc
MIROC6,historical,r1i1p1f1,sos,gn,185001-201412,/data/d.nc
";

fn write_catalog(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("cmip6.csv");
    fs::write(&path, CSV).expect("Failed to write catalog");
    path
}

#[test]
fn test_load_csv_and_search() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let store = EsmDatastore::from_csv(&write_catalog(temp_dir.path()))?;

    assert_eq!(store.name(), "cmip6");
    assert_eq!(store.len(), 4);
    assert_eq!(store.columns().len(), 7);
    assert_eq!(store.variable_column(), "variable_id");

    let hits = store.search(
        &Query::new()
            .with("source_id", ["ACCESS-ESM1-5"])
            .with("experiment_id", ["historical", "ssp585"])
            .with("member_id", ["r1i1p1f1"]),
    )?;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits.column_values("path")?, vec!["/data/a.nc", "/data/c.nc"]);

    // empty query returns everything
    assert_eq!(store.search(&Query::new())?.len(), 4);

    match store.search(&Query::new().with("institution_id", ["CSIRO"])) {
        Err(AcdError::UnknownColumn { column }) => assert_eq!(column, "institution_id"),
        other => panic!("Expected UnknownColumn, got {:?}", other.map(|s| s.len())),
    }
    Ok(())
}

#[test]
fn test_unique_values_sorted_without_blanks() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let store = EsmDatastore::from_csv(&write_catalog(temp_dir.path()))?;

    let unique = store.unique();
    assert_eq!(unique["source_id"], vec!["ACCESS-ESM1-5", "MIROC6"]);
    assert_eq!(unique["variable_id"], vec!["sos", "tos"]);
    assert_eq!(unique["time_range"], vec!["185001-201412"]);
    Ok(())
}

#[test]
fn test_report_unique_keep_and_drop() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let store = EsmDatastore::from_csv(&write_catalog(temp_dir.path()))?;

    // default drop list removes path, time_range and member_id
    let (unique, rows) = store.report_unique(&UniqueReport::default());
    let categories: Vec<&str> = unique.keys().map(String::as_str).collect();
    assert_eq!(categories, vec!["experiment_id", "grid_label", "source_id", "variable_id"]);
    assert_eq!(rows[0], vec!["experiment_id".to_string(), "historical\nssp585".to_string()]);

    // keep list wins over drop list
    let report = UniqueReport {
        keep_list: Some(vec!["member_id".to_string()]),
        ..UniqueReport::default()
    };
    let (unique, rows) = store.report_unique(&report);
    assert_eq!(unique.len(), 1);
    assert_eq!(rows[0][1], "r1i1p1f1\nr2i1p1f1");

    let report = UniqueReport {
        drop_list: None,
        ..UniqueReport::default()
    };
    let (unique, _) = store.report_unique(&report);
    assert_eq!(unique.len(), 7);
    Ok(())
}

#[test]
fn test_list_query_kwargs_returns_columns() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let store = EsmDatastore::from_csv(&write_catalog(temp_dir.path()))?;
    let columns = store.list_query_kwargs();
    assert_eq!(columns.first().map(String::as_str), Some("source_id"));
    assert_eq!(columns.last().map(String::as_str), Some("path"));
    Ok(())
}

#[test]
fn test_json_descriptor() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    write_catalog(temp_dir.path());
    let json_path = temp_dir.path().join("cmip6.json");
    fs::write(
        &json_path,
        r#"{
            "id": "cmip6_test",
            "description": "test catalog",
            "catalog_file": "cmip6.csv",
            "aggregation_control": {
                "variable_column_name": "variable_id",
                "groupby_attrs": ["source_id", "experiment_id"]
            }
        }"#,
    )
    .expect("Failed to write descriptor");

    let store = EsmDatastore::from_json(&json_path)?;
    assert_eq!(store.name(), "cmip6_test");
    assert_eq!(store.groupby_attrs(), &["source_id".to_string(), "experiment_id".to_string()]);
    assert_eq!(store.dataset_keys().len(), 3);
    assert_eq!(
        store.to_string(),
        "<cmip6_test catalog with 3 dataset(s) from 4 asset(s)>"
    );
    Ok(())
}

#[test]
fn test_var_name_info_reads_first_file() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let nc_path = temp_dir.path().join("tos.nc");
    common::write_gridded(
        &nc_path,
        "tos",
        &[("lat", vec![0.0, 1.0])],
        &[20.0, 21.0],
        &[
            ("units", "degC".into()),
            ("long_name", "Sea Surface Temperature".into()),
        ],
    );

    let store = EsmDatastore::from_records(
        "local",
        vec!["variable_id".to_string(), "path".to_string()],
        vec![
            vec!["tos".to_string(), nc_path.to_string_lossy().into_owned()],
            vec!["tos".to_string(), "/does/not/exist.nc".to_string()],
        ],
    )?;

    let attrs = store.var_name_info("tos")?;
    assert_eq!(attrs.get("units"), Some(&AttrValue::Str("degC".to_string())));

    match store.var_name_info("thetao") {
        Err(AcdError::VariableNotFound { var }) => assert_eq!(var, "thetao"),
        other => panic!("Expected VariableNotFound, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_ragged_records_rejected() {
    let result = EsmDatastore::from_records(
        "ragged",
        vec!["a".to_string(), "b".to_string()],
        vec![vec!["1".to_string()]],
    );
    assert!(matches!(result, Err(AcdError::InvalidCatalog { .. })));
}
