mod common;

use acd_tools::coords::{align_lon, convert_longitude_360_to_180, replace_zero_with_nan};
use acd_tools::dataarray::{AttrValue, Coordinate, Dataset, LabeledArray};
use acd_tools::errors::{AcdError, Result};
use acd_tools::metadata::{attribute_table, get_variable_metadata};
use acd_tools::netcdf_io::{open_mf_variable, read_variable, write_dataset};
use acd_tools::statistics::{
    nan_max, nan_mean, nan_min, nan_sum, rectangular_integral, trapezoidal_integral,
    StatOperation,
};
use acd_tools::table::{wrap_words, Table};
use ndarray::{arr1, Array2, ArrayD, IxDyn};
use netcdf::open;
use tempfile::tempdir;

fn lon_array(lons: Vec<f64>) -> LabeledArray {
    let data = ArrayD::from_shape_vec(IxDyn(&[lons.len()]), lons.iter().map(|l| l * 10.0).collect())
        .expect("Failed to build data");
    LabeledArray::new("tos", vec!["lon".to_string()], data)
        .expect("Failed to build array")
        .with_coord("lon", Coordinate::Numeric(lons))
        .expect("Failed to attach lon")
        .with_attr("units", "degC")
}

#[test]
fn test_error_types() {
    let error = AcdError::VariableNotFound {
        var: "tos".to_string(),
    };
    assert_eq!(error.to_string(), "Variable 'tos' not found");

    let error = AcdError::DimensionNotFound {
        var: "tos".to_string(),
        dim: "depth".to_string(),
    };
    assert_eq!(error.to_string(), "Dimension 'depth' not found in variable 'tos'");

    let error = AcdError::TooFewMembers { found: 1 };
    assert!(error.to_string().contains("at least 2 members"));

    let error = AcdError::MultipleSources {
        sources: vec!["A".to_string(), "B".to_string()],
    };
    assert_eq!(
        error.to_string(),
        "Expected exactly one source_id in the search, found 2: [A, B]"
    );

    let error: AcdError = "something broke".into();
    assert_eq!(error.to_string(), "something broke");
}

#[test]
fn test_stat_operation() {
    let lane = arr1(&[1.0, f64::NAN, 3.0, 8.0]);
    assert_eq!(nan_mean(lane.view()), 4.0);
    assert_eq!(nan_sum(lane.view()), 12.0);
    assert_eq!(nan_min(lane.view()), 1.0);
    assert_eq!(nan_max(lane.view()), 8.0);
    assert_eq!(StatOperation::Max.apply(lane.view()), 8.0);
    assert_eq!(StatOperation::Mean.as_str(), "mean");

    let empty = arr1(&[f64::NAN, f64::NAN]);
    assert!(nan_mean(empty.view()).is_nan());
    assert!(nan_min(empty.view()).is_nan());
    assert_eq!(nan_sum(empty.view()), 0.0);

    // only NaN is skipped; infinities take part
    let hot = arr1(&[1.0, f64::INFINITY, f64::NAN]);
    assert_eq!(nan_mean(hot.view()), f64::INFINITY);
    assert_eq!(nan_sum(hot.view()), f64::INFINITY);
    assert_eq!(nan_max(hot.view()), f64::INFINITY);
    assert_eq!(nan_min(hot.view()), 1.0);
    let cold = arr1(&[f64::NEG_INFINITY, 2.0]);
    assert_eq!(nan_min(cold.view()), f64::NEG_INFINITY);
    assert_eq!(nan_max(cold.view()), 2.0);
    let all_inf = arr1(&[f64::INFINITY, f64::NAN]);
    assert_eq!(nan_min(all_inf.view()), f64::INFINITY);
}

#[test]
fn test_integration_rules() {
    let depth = [0.0, 10.0, 30.0];
    let values = arr1(&[1.0, 2.0, 4.0]);
    // 2*10 + 4*20
    assert_eq!(rectangular_integral(values.view(), &depth), 100.0);
    // 10*(1+2)/2 + 20*(2+4)/2
    assert_eq!(trapezoidal_integral(values.view(), &depth), 75.0);

    let gappy = arr1(&[1.0, f64::NAN, 4.0]);
    assert_eq!(rectangular_integral(gappy.view(), &depth), 80.0);
    assert!(trapezoidal_integral(gappy.view(), &depth).is_nan());
}

#[test]
fn test_netcdf_metadata_functions() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("tos.nc");
    common::write_gridded(
        &path,
        "tos",
        &[("lat", vec![-1.0, 0.0, 1.0]), ("lon", vec![150.0, 160.0])],
        &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        &[
            ("units", "degC".into()),
            ("long_name", "Sea surface temperature ".repeat(10).into()),
        ],
    );

    let file = open(&path)?;
    let meta = get_variable_metadata(&file, "tos")?;
    assert_eq!(meta.name, "tos");
    assert_eq!(meta.total_elements(), 6);
    let dims: Vec<(&str, usize)> = meta
        .dimensions
        .iter()
        .map(|d| (d.name.as_str(), d.length))
        .collect();
    assert_eq!(dims, vec![("lat", 3), ("lon", 2)]);
    assert_eq!(meta.attributes.get("units"), Some(&AttrValue::Str("degC".to_string())));

    // long strings wrap inside the table cell
    let table = attribute_table(&meta.attributes);
    let long_name = &table.rows()[0][1];
    assert!(long_name.contains('\n'));
    assert!(long_name.lines().all(|l| l.chars().count() <= 100));

    match get_variable_metadata(&file, "sos") {
        Err(AcdError::VariableNotFound { var }) => assert_eq!(var, "sos"),
        other => panic!("Expected VariableNotFound, got {:?}", other.map(|m| m.name)),
    }
    Ok(())
}

#[test]
fn test_netcdf_writer() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("out.nc");

    let data = Array2::from_shape_vec((2, 3), vec![1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0])?.into_dyn();
    let tos = LabeledArray::new("tos", vec!["member".to_string(), "lat".to_string()], data)?
        .with_coord(
            "member",
            Coordinate::Labels(vec!["r1i1p1f1".to_string(), "r2i1p1f1".to_string()]),
        )?
        .with_coord("lat", Coordinate::Numeric(vec![-5.0, 0.0, 5.0]))?
        .with_attr("units", "degC");
    let mut ds = Dataset::new();
    ds.insert(tos);
    ds.attrs.insert("title".to_string(), "ensemble test".into());

    write_dataset(&ds, &path)?;
    // overwriting an existing file is allowed
    write_dataset(&ds, &path)?;

    let file = open(&path)?;
    let history = file.attribute("history").expect("Missing history").value()?;
    match history {
        netcdf::AttributeValue::Str(s) => assert!(s.starts_with("Created by acd_tools on ")),
        other => panic!("Unexpected history attribute {:?}", other),
    }
    assert!(file.variable("member").is_some());

    let back = read_variable(&file, "tos")?;
    assert_eq!(back.shape(), &[2, 3]);
    assert_eq!(back.numeric_coord("lat")?, vec![-5.0, 0.0, 5.0]);
    assert_eq!(back.data[[1, 2]], 6.0);
    assert!(back.data[[0, 2]].is_nan());
    assert_eq!(back.attrs.get("units"), Some(&AttrValue::Str("degC".to_string())));
    Ok(())
}

#[test]
fn test_open_mf_variable_joins_in_path_order() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let late = temp_dir.path().join("tos_1860.nc");
    let early = temp_dir.path().join("tos_1850.nc");
    common::write_gridded(&late, "tos", &[("time", vec![2.0])], &[20.0], &[]);
    common::write_gridded(&early, "tos", &[("time", vec![0.0, 1.0])], &[10.0, 11.0], &[]);

    let joined = open_mf_variable(&[late, early], "tos", "time")?;
    assert_eq!(joined.numeric_coord("time")?, vec![0.0, 1.0, 2.0]);
    assert_eq!(joined.data.iter().copied().collect::<Vec<f64>>(), vec![10.0, 11.0, 20.0]);

    assert!(open_mf_variable(&[], "tos", "time").is_err());
    Ok(())
}

#[test]
fn test_longitude_conventions() -> Result<()> {
    let da = lon_array(vec![-170.0, -10.0, 0.0, 170.0]);

    let aligned = align_lon(&da, &["lon"])?;
    assert_eq!(aligned.numeric_coord("lon")?, vec![0.0, 170.0, 190.0, 350.0]);
    // values travel with their longitude
    assert_eq!(
        aligned.data.iter().copied().collect::<Vec<f64>>(),
        vec![0.0, 1700.0, -1700.0, -100.0]
    );
    assert_eq!(aligned.attrs.get("units"), Some(&AttrValue::Str("degC".to_string())));

    let back = convert_longitude_360_to_180(&aligned, "lon")?;
    assert_eq!(back.numeric_coord("lon")?, vec![-170.0, -10.0, 0.0, 170.0]);

    let unlabeled = LabeledArray::new("x", vec!["lon".to_string()], ArrayD::zeros(IxDyn(&[2])))?;
    assert!(matches!(
        align_lon(&unlabeled, &["lon"]),
        Err(AcdError::InvalidCoordinate { .. })
    ));
    Ok(())
}

#[test]
fn test_replace_zero_with_nan() {
    let da = lon_array(vec![0.0, 90.0]);
    let cleaned = replace_zero_with_nan(&da);
    assert!(cleaned.data[[0]].is_nan());
    assert_eq!(cleaned.data[[1]], 900.0);
    assert_eq!(
        cleaned.attrs.get("post_processing_note"),
        Some(&AttrValue::Str("zero values replaced with NaNs".to_string()))
    );
}

#[test]
fn test_fancy_grid_table() {
    let mut table = Table::new(["Category", "Unique values"]);
    table.add_row(["source_id", "ACCESS-ESM1-5\nMIROC6"]);
    table.add_row(["grid_label", "gn"]);
    let rendered = table.render();
    let lines: Vec<&str> = rendered.lines().collect();

    assert!(lines[0].starts_with('╒') && lines[0].ends_with('╕'));
    assert!(lines[2].starts_with('╞'));
    assert!(lines.last().map_or(false, |l| l.starts_with('╘') && l.ends_with('╛')));
    // the two-line cell makes a two-line row
    assert_eq!(lines[3], "│ source_id  │ ACCESS-ESM1-5 │");
    assert_eq!(lines[4], "│            │ MIROC6        │");
    assert!(lines[5].starts_with('├'));
    let width = lines[0].chars().count();
    assert!(lines.iter().all(|l| l.chars().count() == width));
}

#[test]
fn test_wrap_words() {
    assert_eq!(wrap_words("one two three four", 9), "one two\nthree\nfour");
    assert_eq!(wrap_words("short", 100), "short");
    assert_eq!(wrap_words("a verylongword b", 4), "a\nverylongword\nb");
}
