use acd_tools::dataarray::{Coordinate, LabeledArray};
use acd_tools::errors::{AcdError, Result};
use acd_tools::plot::annotate::{
    diagonal_placement, inside_placement, outside_placement, spaced_text,
};
use acd_tools::plot::contour::{band_index, cell_edges};
use acd_tools::plot::ticks::nice_levels;
use acd_tools::plot::{
    contour_lines, heatmap, label_position, tropical_pacific, BBox, Colormap, ContourOptions,
    ContourfOptions, DiagonalTextOptions, Extent, GeoFeatures, HeatmapOptions, HeatmapTable,
    LatitudeFormatter, Levels, LineStyle, LongitudeFormatter, MapOptions, Normalize, Projection,
    TextOptions, TextPosition,
};
use ndarray::{Array2, Array3};
use tempfile::tempdir;

/// `sst(latitude, longitude)` over the tropical Pacific, warm in the west
fn pacific_field() -> LabeledArray {
    let lats: Vec<f64> = (-30..=30).step_by(5).map(f64::from).collect();
    let lons: Vec<f64> = (120..=290).step_by(10).map(f64::from).collect();
    let data = Array2::from_shape_fn((lats.len(), lons.len()), |(j, i)| {
        30.0 - 0.05 * (lons[i] - 120.0) - 0.1 * lats[j].abs()
    })
    .into_dyn();
    LabeledArray::new("sst", vec!["latitude".to_string(), "longitude".to_string()], data)
        .expect("Failed to build array")
        .with_coord("latitude", Coordinate::Numeric(lats))
        .expect("Failed to attach latitude")
        .with_coord("longitude", Coordinate::Numeric(lons))
        .expect("Failed to attach longitude")
        .with_attr("units", "degC")
}

#[test]
fn test_degree_formatters() {
    let lon = LongitudeFormatter::default();
    assert_eq!(lon.format(150.0), "150°E");
    assert_eq!(lon.format(180.0), "180°");
    assert_eq!(lon.format(-180.0), "180°");
    assert_eq!(lon.format(210.0), "150°W");
    assert_eq!(lon.format(0.0), "0°E");
    assert_eq!(lon.format(360.0), "0°E");
    assert_eq!(lon.format(152.5), "152.5°E");
    let plain = LongitudeFormatter {
        zero_direction_label: false,
    };
    assert_eq!(plain.format(0.0), "0°");

    let lat = LatitudeFormatter;
    assert_eq!(lat.format(0.0), "0°");
    assert_eq!(lat.format(-10.0), "10°S");
    assert_eq!(lat.format(30.0), "30°N");
}

#[test]
fn test_label_positions() {
    let (lat, lon) = label_position("Fiji", -17.7, 178.0);
    assert_eq!((lat, lon), (-17.7, 179.0));

    let (lat, lon) = label_position("Samoa", -13.8, 187.0);
    assert!((lat - (-15.8)).abs() < 1e-9);
    assert!((lon - 183.0).abs() < 1e-9);

    let (lat, lon) = label_position("American Samoa", -14.3, 189.3);
    assert!((lat - (-15.8)).abs() < 1e-9);
    assert!((lon - 189.3).abs() < 1e-9);

    let (lat, lon) = label_position("Wallis and Futuna", -13.3, 183.8);
    assert!((lat - (-12.3)).abs() < 1e-9);
    assert!((lon - 183.8).abs() < 1e-9);
}

#[test]
fn test_text_placements() {
    let p = outside_placement(&TextPosition::from("top-right"));
    assert_eq!((p.x, p.y, p.ha), (0.98, 0.92, "right"));
    let p = outside_placement(&TextPosition::from("bottom"));
    assert_eq!((p.x, p.y, p.ha), (0.5, 0.03, "center"));
    let p = outside_placement(&TextPosition::from("somewhere"));
    assert_eq!((p.x, p.y, p.ha), (0.5, 0.02, "center"));
    let p = outside_placement(&TextPosition::from((0.1, 0.2)));
    assert_eq!((p.x, p.y, p.ha), (0.1, 0.2, "center"));

    let bbox = BBox {
        x0: 0.1,
        y0: 0.2,
        x1: 0.9,
        y1: 0.8,
    };
    let p = inside_placement(&TextPosition::from("bottom-left"), &bbox);
    assert!((p.x - 0.12).abs() < 1e-12 && (p.y - 0.205).abs() < 1e-12);
    assert_eq!(p.ha, "left");
    let p = inside_placement(&TextPosition::from("top"), &bbox);
    assert!((p.x - 0.5).abs() < 1e-12 && (p.y - 0.795).abs() < 1e-12);
    let p = inside_placement(&TextPosition::from("top-right"), &bbox);
    assert!((p.x - 0.88).abs() < 1e-12 && (p.y - 0.785).abs() < 1e-12);
    assert_eq!(p.ha, "right");

    assert_eq!(diagonal_placement("top-left"), (0.1, 0.9));
    assert_eq!(diagonal_placement("anything"), (0.5, 0.5));
    assert_eq!(spaced_text("DRAFT", 1), "D R A F T");
    assert_eq!(spaced_text("DRAFT", 0), "DRAFT");
}

#[test]
fn test_pacific_projection() -> Result<()> {
    let proj = Projection::PlateCarree {
        central_longitude: 180.0,
    };
    assert_eq!(proj.x(180.0), 0.0);
    assert_eq!(proj.x(130.0), -50.0);
    assert_eq!(proj.project(290.0, 10.0), (110.0, 10.0));

    let extent = Extent::new([130.0, 290.0, -60.0, 30.0])?;
    assert_eq!(extent.x_range(&proj), (-50.0, 110.0));

    // a line crossing the map seam stays continuous
    let greenwich = Projection::default();
    assert_eq!(
        greenwich.unwrap(&[(170.0, 0.0), (-170.0, 0.0)]),
        vec![(170.0, 0.0), (190.0, 0.0)]
    );

    assert!(matches!(
        Extent::new([290.0, 130.0, -60.0, 30.0]),
        Err(AcdError::InvalidParameter { .. })
    ));
    assert!(matches!(
        Extent::new([0.0, 400.0, -60.0, 30.0]),
        Err(AcdError::InvalidParameter { .. })
    ));
    Ok(())
}

#[test]
fn test_contour_of_radial_field_is_closed_circle() -> Result<()> {
    let coords: Vec<f64> = (0..9).map(|k| -2.0 + 0.5 * k as f64).collect();
    let z = Array2::from_shape_fn((9, 9), |(j, i)| coords[i].powi(2) + coords[j].powi(2));

    let lines = contour_lines(&coords, &coords, z.view(), &[1.1])?;
    assert_eq!(lines.len(), 1);
    let circle = &lines[0];
    assert_eq!(circle.level, 1.1);
    assert!(circle.is_closed());
    for &(x, y) in &circle.points {
        let r = (x * x + y * y).sqrt();
        assert!((r - 1.1f64.sqrt()).abs() < 0.15, "point ({}, {}) off the circle", x, y);
    }

    // levels outside the data give nothing
    assert!(contour_lines(&coords, &coords, z.view(), &[100.0])?.is_empty());

    match contour_lines(&coords[..8], &coords, z.view(), &[1.0]) {
        Err(AcdError::ShapeMismatch { .. }) => {}
        other => panic!("Expected ShapeMismatch, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_bands_edges_and_levels() {
    let levels = [0.0, 1.0, 2.0];
    assert_eq!(band_index(0.5, &levels), Some(0));
    assert_eq!(band_index(1.0, &levels), Some(1));
    assert_eq!(band_index(2.0, &levels), Some(1));
    assert_eq!(band_index(2.5, &levels), None);
    assert_eq!(band_index(f64::NAN, &levels), None);

    assert_eq!(cell_edges(&[0.0, 1.0, 2.0]), vec![-0.5, 0.5, 1.5, 2.5]);
    assert_eq!(nice_levels(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
}

#[test]
fn test_colormaps() -> Result<()> {
    let rdbu = Colormap::by_name("RdBu")?;
    let reversed = Colormap::by_name("RdBu_r")?;
    assert_eq!(rdbu.at(0.0), reversed.at(1.0));
    assert_eq!(rdbu.at(1.0), reversed.at(0.0));
    assert_eq!(rdbu.at(-3.0), rdbu.at(0.0));
    assert_eq!(Colormap::by_name("thermal")?.sample(7).len(), 7);
    assert!(Colormap::by_name("viridis")?.at(0.0).luminance() < 0.1);
    assert!(matches!(
        Colormap::by_name("jet"),
        Err(AcdError::InvalidParameter { .. })
    ));

    let norm = Normalize::new(-2.0, 2.0)?;
    assert_eq!(norm.apply(0.0), Some(0.5));
    assert_eq!(norm.apply(f64::NAN), None);
    assert!(Normalize::new(2.0, 2.0).is_err());
    Ok(())
}

#[test]
fn test_geojson_features() -> Result<()> {
    let text = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "island"},
             "geometry": {"type": "Polygon",
                          "coordinates": [[[178, -18], [179, -18], [179, -17], [178, -18]]]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "MultiLineString",
                          "coordinates": [[[150, -5], [155, -6]], [[160, -8], [161, -9]]]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Point", "coordinates": [170, 0]}},
            {"type": "Feature", "properties": {}, "geometry": null}
        ]
    }"#;
    let features = GeoFeatures::from_geojson_str(text)?;
    assert_eq!(features.polygons.len(), 1);
    assert_eq!(features.polygons[0][1], (179.0, -18.0));
    assert_eq!(features.lines.len(), 2);

    assert!(matches!(
        GeoFeatures::from_geojson_str(r#"{"type": "Topology"}"#),
        Err(AcdError::InvalidParameter { .. })
    ));
    assert!(GeoFeatures::from_geojson_str("not json").is_err());
    Ok(())
}

#[test]
fn test_tropical_pacific_map_renders_all_layers() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let field = pacific_field();

    let options = MapOptions {
        title: "Tropical Pacific SST".to_string(),
        ..MapOptions::default()
    };
    let mut figure = tropical_pacific(options, Some((&field, &ContourfOptions::default())))?;

    let land = GeoFeatures::from_geojson_str(
        r#"{"type": "Polygon", "coordinates": [[[175, -20], [185, -20], [185, -15], [175, -20]]]}"#,
    )?;
    figure.add_land(land);
    figure.add_contours(
        &field,
        &ContourOptions {
            lat_name: "latitude".to_string(),
            lon_name: "longitude".to_string(),
            levels: Some(vec![25.0, 28.0]),
            colors: Some(vec!["black".to_string()]),
            linestyle: LineStyle::Dashed,
            labels: true,
            ..ContourOptions::default()
        },
    )?;
    figure.add_points_and_labels(&[-17.7, -13.8], &[178.0, 187.0], &["Fiji", "Samoa"])?;
    figure.add_outside_text("Data: test", "bottom-right", TextOptions::default());
    figure.add_inside_text("El Niño & friends", "top", TextOptions::default());
    figure.add_diagonal_text(
        "DRAFT",
        DiagonalTextOptions {
            spacing: 1,
            ..DiagonalTextOptions::default()
        },
    );

    let path = temp_dir.path().join("map.svg");
    figure.save_svg(&path)?;
    let svg = std::fs::read_to_string(&path)?;

    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains(">Tropical Pacific SST</text>"));
    for tick in ["150°E", "180°", "150°W", "90°W", "60°S", "10°N", "0°"] {
        assert!(svg.contains(&format!(">{}</text>", tick)), "missing tick label {}", tick);
    }
    assert!(svg.contains(">sst [degC]</text>"), "colorbar label");
    assert!(svg.contains("fill=\"#f0f0dc\""), "land polygon");
    assert!(svg.contains("stroke-dasharray=\"6,3\""), "dashed contours");
    assert!(svg.contains(">25.0</text>"), "contour labels");
    assert!(svg.contains(">Fiji</text>") && svg.contains(">Samoa</text>"));
    assert!(svg.contains("fill=\"red\""), "point markers");
    assert!(svg.contains(">Data: test</text>"));
    assert!(svg.contains("El Niño &amp; friends"));
    assert!(svg.contains(">D R A F T</text>"));
    Ok(())
}

#[test]
fn test_map_input_errors() -> Result<()> {
    let field = pacific_field();
    let mut figure = tropical_pacific(MapOptions::default(), None)?;

    match figure.add_points_and_labels(&[0.0, 1.0], &[180.0], &["a", "b"]) {
        Err(AcdError::ShapeMismatch { .. }) => {}
        other => panic!("Expected ShapeMismatch, got {:?}", other),
    }

    let decreasing = ContourfOptions {
        levels: Levels::Explicit(vec![30.0, 20.0]),
        ..ContourfOptions::default()
    };
    assert!(matches!(
        figure.add_contourf(&field, &decreasing),
        Err(AcdError::InvalidParameter { .. })
    ));

    let cube = LabeledArray::new(
        "cube",
        vec!["time".to_string(), "latitude".to_string(), "longitude".to_string()],
        Array3::<f64>::zeros((2, 2, 2)).into_dyn(),
    )?;
    assert!(matches!(
        figure.add_contourf(&cube, &ContourfOptions::default()),
        Err(AcdError::ShapeMismatch { .. })
    ));

    let bad_extent = MapOptions {
        extent: [130.0, 130.0, -60.0, 30.0],
        ..MapOptions::default()
    };
    assert!(tropical_pacific(bad_extent, None).is_err());
    Ok(())
}

#[test]
fn test_heatmap() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let values = Array2::from_shape_vec((2, 3), vec![-1.5, 0.0, 1.5, 2.5, f64::NAN, -0.5])?;
    let table = HeatmapTable::new(
        vec!["ACCESS-ESM1-5".to_string(), "MIROC6".to_string()],
        vec!["DJF".to_string(), "MAM".to_string(), "JJA".to_string()],
        values,
    )?;
    let options = HeatmapOptions {
        title: "Seasonal bias".to_string(),
        annot: Some(vec![
            vec!["-1.5".to_string(), "0.0".to_string(), "1.5".to_string()],
            vec!["2.5".to_string(), "".to_string(), "-0.5".to_string()],
        ]),
        ..HeatmapOptions::default()
    };
    let figure = heatmap(&table, &options)?;
    let svg = figure.render_svg();
    assert!(svg.contains(">Seasonal bias</text>"));
    assert!(svg.contains(">ACCESS-ESM1-5</text>"));
    assert!(svg.contains(">JJA</text>"));
    assert!(svg.contains(">-0.5</text>"));

    let path = temp_dir.path().join("heatmap.svg");
    figure.save_svg(&path)?;
    assert!(path.exists());

    let wrong_annot = HeatmapOptions {
        annot: Some(vec![vec!["x".to_string()]]),
        ..HeatmapOptions::default()
    };
    assert!(matches!(heatmap(&table, &wrong_annot), Err(AcdError::ShapeMismatch { .. })));

    let flat = HeatmapOptions {
        vmin: 1.0,
        vmax: 1.0,
        ..HeatmapOptions::default()
    };
    assert!(matches!(heatmap(&table, &flat), Err(AcdError::InvalidParameter { .. })));

    let empty = HeatmapTable::new(Vec::new(), Vec::new(), Array2::zeros((0, 0)))?;
    assert!(matches!(
        heatmap(&empty, &HeatmapOptions::default()),
        Err(AcdError::InvalidParameter { .. })
    ));

    assert!(matches!(
        HeatmapTable::new(vec!["a".to_string()], Vec::new(), Array2::zeros((1, 2))),
        Err(AcdError::ShapeMismatch { .. })
    ));
    Ok(())
}
