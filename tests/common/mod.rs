#![allow(dead_code)]

use netcdf::{create, AttributeValue};
use std::path::Path;

/// Write `name(dims...)` with one numeric coordinate variable per dimension
pub fn write_gridded(
    path: &Path,
    name: &str,
    dims: &[(&str, Vec<f64>)],
    values: &[f64],
    attrs: &[(&str, AttributeValue)],
) {
    let mut file = create(path).expect("Failed to create NetCDF file");
    for (dim, coord) in dims {
        file.add_dimension(dim, coord.len())
            .expect("Failed to add dimension");
    }
    for (dim, coord) in dims {
        let mut var = file
            .add_variable::<f64>(dim, &[*dim])
            .expect("Failed to add coordinate variable");
        var.put_values(coord, ..).expect("Failed to write coordinate");
    }

    let names: Vec<&str> = dims.iter().map(|(d, _)| *d).collect();
    let mut var = file
        .add_variable::<f64>(name, &names)
        .expect("Failed to add variable");
    for (key, value) in attrs {
        var.put_attribute(key, value.clone())
            .expect("Failed to add attribute");
    }
    var.put_values(values, ..).expect("Failed to write data");
}

/// Write a `(time, lat)` temperature field with a CF time axis
pub fn write_time_series(
    path: &Path,
    days: &[f64],
    units: &str,
    calendar: Option<&str>,
    temps: &[f64],
) {
    let mut file = create(path).expect("Failed to create NetCDF file");
    file.add_dimension("time", days.len())
        .expect("Failed to add dimension time");
    file.add_dimension("lat", 1)
        .expect("Failed to add dimension lat");

    let mut time = file
        .add_variable::<f64>("time", &["time"])
        .expect("Failed to add time");
    time.put_attribute("units", units)
        .expect("Failed to add units");
    if let Some(calendar) = calendar {
        time.put_attribute("calendar", calendar)
            .expect("Failed to add calendar");
    }
    time.put_values(days, ..).expect("Failed to write time");

    let mut lat = file
        .add_variable::<f64>("lat", &["lat"])
        .expect("Failed to add lat");
    lat.put_values(&[0.0], ..).expect("Failed to write lat");

    let mut sst = file
        .add_variable::<f64>("sst", &["time", "lat"])
        .expect("Failed to add sst");
    sst.put_attribute("units", "degC")
        .expect("Failed to add units");
    sst.put_values(temps, ..).expect("Failed to write sst");
}
