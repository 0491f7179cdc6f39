//! Cartographic figure assembled layer by layer and rendered to SVG

use super::annotate::{
    diagonal_placement, inside_placement, label_position, outside_placement, spaced_text, BBox,
    Placement, TextPosition,
};
use super::colormap::{Colormap, Rgb};
use super::contour::{band_index, cell_edges, contour_lines, ContourLine};
use super::geo::GeoFeatures;
use super::projection::{Extent, Projection};
use super::svg::{Anchor, SvgDocument, TextStyle};
use super::ticks::{
    format_number, nice_levels, stride_positions, LatitudeFormatter, LongitudeFormatter,
};
use crate::dataarray::LabeledArray;
use crate::errors::{AcdError, Result};
use ndarray::{Array2, Ix2};
use std::path::Path;

/// Land fill colour used by cartopy's default land feature
pub const LAND_COLOR: &str = "#f0f0dc";

/// Figure-wide settings
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub central_longitude: f64,
    /// Width and height in inches
    pub figsize: (f64, f64),
    /// `[lon_min, lon_max, lat_min, lat_max]`
    pub extent: [f64; 4],
    pub xticks: Vec<f64>,
    pub yticks: Vec<f64>,
    /// Gridline spacing in degrees
    pub xstride: f64,
    pub ystride: f64,
    pub title: String,
    /// Pixels per inch; at 72 font sizes in points equal pixels
    pub dpi: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            central_longitude: 180.0,
            figsize: (16.0, 16.0),
            extent: [130.0, 290.0, -60.0, 30.0],
            xticks: vec![150.0, 180.0, 210.0, 240.0, 270.0],
            yticks: vec![-60.0, -30.0, -10.0, 0.0, 10.0],
            xstride: 10.0,
            ystride: 10.0,
            title: "my_plot_title".to_string(),
            dpi: 72.0,
        }
    }
}

/// How contour levels are chosen
#[derive(Debug, Clone, PartialEq)]
pub enum Levels {
    /// About this many round-number levels over the data (or vmin/vmax) range
    Count(usize),
    Explicit(Vec<f64>),
}

/// Filled contour settings
#[derive(Debug, Clone, PartialEq)]
pub struct ContourfOptions {
    pub lon_name: String,
    pub lat_name: String,
    pub levels: Levels,
    pub cmap: String,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    /// Colorbar label; the variable name and units when `None`
    pub label: Option<String>,
}

impl Default for ContourfOptions {
    fn default() -> Self {
        Self {
            lon_name: "longitude".to_string(),
            lat_name: "latitude".to_string(),
            levels: Levels::Count(10),
            cmap: "thermal".to_string(),
            vmin: None,
            vmax: None,
            label: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl LineStyle {
    fn dasharray(self) -> Option<&'static str> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some("6,3"),
            LineStyle::Dotted => Some("1,3"),
            LineStyle::DashDot => Some("6,3,1,3"),
        }
    }
}

/// Line contour settings
#[derive(Debug, Clone, PartialEq)]
pub struct ContourOptions {
    pub lat_name: String,
    pub lon_name: String,
    /// Automatic levels when `None`
    pub levels: Option<Vec<f64>>,
    /// Cycled over the levels; sampled from viridis when `None`
    pub colors: Option<Vec<String>>,
    pub linewidth: f64,
    pub linestyle: LineStyle,
    /// Label each line with its level (`%.1f`)
    pub labels: bool,
}

impl Default for ContourOptions {
    fn default() -> Self {
        Self {
            lat_name: "lat".to_string(),
            lon_name: "lon".to_string(),
            levels: None,
            colors: None,
            linewidth: 0.8,
            linestyle: LineStyle::Solid,
            labels: false,
        }
    }
}

/// Style of plain annotation text
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    pub fontsize: f64,
    pub color: String,
    pub italic: bool,
    pub bold: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            fontsize: 10.0,
            color: "gray".to_string(),
            italic: true,
            bold: false,
        }
    }
}

/// Semi-transparent boxed text across the axes (e.g. "DRAFT")
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalTextOptions {
    pub fontsize: f64,
    pub color: String,
    pub rotation: f64,
    pub alpha: f64,
    pub box_color: String,
    /// Spaces inserted between characters
    pub spacing: usize,
    pub position: String,
}

impl Default for DiagonalTextOptions {
    fn default() -> Self {
        Self {
            fontsize: 20.0,
            color: "white".to_string(),
            rotation: 45.0,
            alpha: 0.5,
            box_color: "black".to_string(),
            spacing: 0,
            position: "center".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Filled {
    xs: Vec<f64>,
    ys: Vec<f64>,
    values: Array2<f64>,
    levels: Vec<f64>,
    colors: Vec<Rgb>,
    label: String,
}

#[derive(Debug, Clone)]
enum Layer {
    Filled(Filled),
    Land(GeoFeatures),
    Contours {
        lines: Vec<ContourLine>,
        colors: Vec<String>,
        levels: Vec<f64>,
        width: f64,
        style: LineStyle,
        labels: bool,
    },
    Points(Vec<(f64, f64, String)>),
    Diagonal {
        x: f64,
        y: f64,
        text: String,
        options: DiagonalTextOptions,
    },
}

#[derive(Debug, Clone)]
struct FigureText {
    placement: Placement,
    text: String,
    options: TextOptions,
}

/// A map with a projection, an extent and drawing layers
#[derive(Debug, Clone)]
pub struct MapFigure {
    options: MapOptions,
    projection: Projection,
    extent: Extent,
    layers: Vec<Layer>,
    texts: Vec<FigureText>,
}

/// Extract a `(lat, lon)` grid from a 2-D array, transposing if needed
fn grid_of(
    data: &LabeledArray,
    lon_name: &str,
    lat_name: &str,
) -> Result<(Vec<f64>, Vec<f64>, Array2<f64>)> {
    if data.ndim() != 2 {
        return Err(AcdError::ShapeMismatch {
            message: format!(
                "'{}' must be 2-D to plot, it has {} dimensions",
                data.name,
                data.ndim()
            ),
        });
    }
    let lon_axis = data.axis_of(lon_name)?;
    data.axis_of(lat_name)?;
    let lons = data.numeric_coord(lon_name)?;
    let lats = data.numeric_coord(lat_name)?;
    let view = data.data.view().into_dimensionality::<Ix2>()?;
    let values = if lon_axis == 1 { view.to_owned() } else { view.t().to_owned() };
    Ok((lons, lats, values))
}

fn finite_range(values: &Array2<f64>) -> Option<(f64, f64)> {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Pixel geometry of the axes
struct Frame {
    width: f64,
    height: f64,
    left: f64,
    top: f64,
    ax_w: f64,
    ax_h: f64,
    x0: f64,
    x1: f64,
    lat_min: f64,
    lat_max: f64,
    scale: f64,
}

impl Frame {
    fn px(&self, x: f64, lat: f64) -> (f64, f64) {
        (
            self.left + (x - self.x0) / (self.x1 - self.x0) * self.ax_w,
            self.top + (self.lat_max - lat) / (self.lat_max - self.lat_min) * self.ax_h,
        )
    }

    /// Shift a projected x into the axes range by whole turns
    fn fit_x(&self, x: f64) -> f64 {
        self.x0 + (x - self.x0).rem_euclid(360.0)
    }

    fn fig(&self, fx: f64, fy: f64) -> (f64, f64) {
        (fx * self.width, (1.0 - fy) * self.height)
    }

    fn axes(&self, ax: f64, ay: f64) -> (f64, f64) {
        (self.left + ax * self.ax_w, self.top + (1.0 - ay) * self.ax_h)
    }

    fn font(&self, points: f64) -> f64 {
        points * self.scale
    }
}

impl MapFigure {
    /// Empty map
    ///
    /// # Errors
    ///
    /// Returns [`AcdError::InvalidParameter`] for a bad extent or figure size.
    pub fn new(options: MapOptions) -> Result<Self> {
        if !(options.figsize.0 > 0.0 && options.figsize.1 > 0.0 && options.dpi > 0.0) {
            return Err(AcdError::InvalidParameter {
                message: format!(
                    "figure size {:?} at {} dpi is empty",
                    options.figsize, options.dpi
                ),
            });
        }
        let extent = Extent::new(options.extent)?;
        let projection = Projection::PlateCarree {
            central_longitude: options.central_longitude,
        };
        Ok(Self {
            options,
            projection,
            extent,
            layers: Vec::new(),
            texts: Vec::new(),
        })
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    fn has_colorbar(&self) -> bool {
        self.layers.iter().any(|l| matches!(l, Layer::Filled(_)))
    }

    fn frame(&self) -> Frame {
        let width = self.options.figsize.0 * self.options.dpi;
        let height = self.options.figsize.1 * self.options.dpi;
        let (x0, x1) = self.extent.x_range(&self.projection);
        let aspect = (x1 - x0) / (self.extent.lat_max - self.extent.lat_min);

        let bottom_margin = if self.has_colorbar() { 0.16 } else { 0.07 };
        let avail_w = width * (1.0 - 0.07 - 0.03);
        let avail_h = height * (1.0 - 0.06 - bottom_margin);
        let ax_w = avail_w.min(avail_h * aspect);
        let ax_h = ax_w / aspect;
        let left = width * 0.07 + (avail_w - ax_w) / 2.0;
        let top = height * 0.06 + (avail_h - ax_h) / 2.0;
        Frame {
            width,
            height,
            left,
            top,
            ax_w,
            ax_h,
            x0,
            x1,
            lat_min: self.extent.lat_min,
            lat_max: self.extent.lat_max,
            scale: self.options.dpi / 72.0,
        }
    }

    /// Axes rectangle in figure fractions
    pub fn axes_bbox(&self) -> BBox {
        let f = self.frame();
        BBox {
            x0: f.left / f.width,
            x1: (f.left + f.ax_w) / f.width,
            y0: 1.0 - (f.top + f.ax_h) / f.height,
            y1: 1.0 - f.top / f.height,
        }
    }

    /// Filled land polygons with black edges, plus coastline lines
    pub fn add_land(&mut self, features: GeoFeatures) {
        self.layers.push(Layer::Land(features));
    }

    /// Filled contours of a 2-D field, drawn at grid resolution, with a horizontal colorbar
    pub fn add_contourf(&mut self, data: &LabeledArray, options: &ContourfOptions) -> Result<()> {
        let (xs, ys, values) = grid_of(data, &options.lon_name, &options.lat_name)?;
        let levels = match &options.levels {
            Levels::Explicit(levels) => levels.clone(),
            Levels::Count(n) => {
                let (lo, hi) = finite_range(&values).unwrap_or((0.0, 1.0));
                nice_levels(options.vmin.unwrap_or(lo), options.vmax.unwrap_or(hi), *n)
            }
        };
        if levels.len() < 2 || levels.windows(2).any(|w| w[1] <= w[0]) {
            return Err(AcdError::InvalidParameter {
                message: format!("filled contours need increasing levels, got {:?}", levels),
            });
        }
        let cmap = Colormap::by_name(&options.cmap)?;
        let colors = cmap.sample(levels.len() - 1);
        let label = options.label.clone().unwrap_or_else(|| match data.attrs.get("units") {
            Some(units) => format!("{} [{}]", data.name, units),
            None => data.name.clone(),
        });
        self.layers.push(Layer::Filled(Filled {
            xs,
            ys,
            values,
            levels,
            colors,
            label,
        }));
        Ok(())
    }

    /// Line contours of a 2-D field
    pub fn add_contours(&mut self, data: &LabeledArray, options: &ContourOptions) -> Result<()> {
        let (xs, ys, values) = grid_of(data, &options.lon_name, &options.lat_name)?;
        let levels = match &options.levels {
            Some(levels) => levels.clone(),
            None => match finite_range(&values) {
                Some((lo, hi)) => nice_levels(lo, hi, 8),
                None => Vec::new(),
            },
        };
        let lines = contour_lines(&xs, &ys, values.view(), &levels)?;
        let colors = match &options.colors {
            Some(colors) if !colors.is_empty() => colors.clone(),
            _ => Colormap::by_name("viridis")?
                .sample(levels.len())
                .into_iter()
                .map(Rgb::to_hex)
                .collect(),
        };
        self.layers.push(Layer::Contours {
            lines,
            colors,
            levels,
            width: options.linewidth,
            style: options.linestyle,
            labels: options.labels,
        });
        Ok(())
    }

    /// Red markers with a label one degree east of each point
    ///
    /// # Errors
    ///
    /// Returns [`AcdError::ShapeMismatch`] if the three lists differ in length.
    pub fn add_points_and_labels<S: AsRef<str>>(
        &mut self,
        latitudes: &[f64],
        longitudes: &[f64],
        labels: &[S],
    ) -> Result<()> {
        if latitudes.len() != longitudes.len() || latitudes.len() != labels.len() {
            return Err(AcdError::ShapeMismatch {
                message: format!(
                    "{} latitudes, {} longitudes and {} labels",
                    latitudes.len(),
                    longitudes.len(),
                    labels.len()
                ),
            });
        }
        let points = latitudes
            .iter()
            .zip(longitudes)
            .zip(labels)
            .map(|((&lat, &lon), label)| (lat, lon, label.as_ref().to_string()))
            .collect();
        self.layers.push(Layer::Points(points));
        Ok(())
    }

    /// Text outside the axes, placed in figure fractions
    pub fn add_outside_text(
        &mut self,
        text: &str,
        position: impl Into<TextPosition>,
        options: TextOptions,
    ) {
        self.texts.push(FigureText {
            placement: outside_placement(&position.into()),
            text: text.to_string(),
            options,
        });
    }

    /// Text just inside the axes frame
    pub fn add_inside_text(
        &mut self,
        text: &str,
        position: impl Into<TextPosition>,
        options: TextOptions,
    ) {
        let placement = inside_placement(&position.into(), &self.axes_bbox());
        self.texts.push(FigureText {
            placement,
            text: text.to_string(),
            options,
        });
    }

    pub fn add_diagonal_text(&mut self, text: &str, options: DiagonalTextOptions) {
        let (x, y) = diagonal_placement(&options.position);
        self.layers.push(Layer::Diagonal {
            x,
            y,
            text: spaced_text(text, options.spacing),
            options,
        });
    }

    pub fn render_svg(&self) -> String {
        let f = self.frame();
        let mut doc = SvgDocument::new(f.width, f.height);

        doc.begin_clip("axes", f.left, f.top, f.ax_w, f.ax_h);
        for layer in &self.layers {
            if let Layer::Filled(filled) = layer {
                self.draw_filled(&mut doc, &f, filled);
            }
        }
        for layer in &self.layers {
            if let Layer::Land(features) = layer {
                self.draw_land(&mut doc, &f, features);
            }
        }
        self.draw_gridlines(&mut doc, &f);
        for layer in &self.layers {
            match layer {
                Layer::Contours {
                    lines,
                    colors,
                    levels,
                    width,
                    style,
                    labels,
                } => {
                    self.draw_contours(&mut doc, &f, lines, colors, levels, *width, *style, *labels)
                }
                Layer::Points(points) => self.draw_points(&mut doc, &f, points),
                Layer::Diagonal {
                    x,
                    y,
                    text,
                    options,
                } => draw_diagonal(&mut doc, &f, *x, *y, text, options),
                _ => {}
            }
        }
        doc.end_group();

        doc.rect(f.left, f.top, f.ax_w, f.ax_h, "none", Some(("black", 1.0)), 0.0);
        self.draw_ticks(&mut doc, &f);

        let title_style = TextStyle {
            font_size: f.font(12.0),
            anchor: Anchor::Middle,
            ..TextStyle::default()
        };
        doc.text(f.left + f.ax_w / 2.0, f.top - f.font(8.0), &self.options.title, &title_style);

        if let Some(filled) = self.layers.iter().find_map(|l| match l {
            Layer::Filled(filled) => Some(filled),
            _ => None,
        }) {
            draw_colorbar(&mut doc, &f, filled);
        }

        for text in &self.texts {
            let (x, y) = f.fig(text.placement.x, text.placement.y);
            let style = TextStyle {
                font_size: f.font(text.options.fontsize),
                color: text.options.color.clone(),
                italic: text.options.italic,
                bold: text.options.bold,
                anchor: Anchor::from_ha(text.placement.ha),
                ..TextStyle::default()
            };
            doc.text(x, y, &text.text, &style);
        }
        doc.finish()
    }

    pub fn save_svg(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render_svg())?;
        tracing::info!(path = %path.display(), "saved map");
        Ok(())
    }

    fn draw_filled(&self, doc: &mut SvgDocument, f: &Frame, filled: &Filled) {
        let x_edges = cell_edges(&filled.xs);
        let y_edges = cell_edges(&filled.ys);
        for (j, row) in filled.values.outer_iter().enumerate() {
            for (i, &value) in row.iter().enumerate() {
                let Some(band) = band_index(value, &filled.levels) else { continue };
                let color = filled.colors[band].to_hex();
                let w = x_edges[i + 1] - x_edges[i];
                let x = f.fit_x(self.projection.x(x_edges[i]));
                let (px0, py0) = f.px(x, y_edges[j].max(y_edges[j + 1]));
                let (px1, py1) = f.px(x + w.abs(), y_edges[j].min(y_edges[j + 1]));
                // half-pixel overlap hides seams between cells
                doc.rect(px0, py0, px1 - px0 + 0.5, py1 - py0 + 0.5, &color, None, 1.0);
            }
        }
    }

    fn shifted_copies(&self, f: &Frame, points: &[(f64, f64)]) -> Vec<Vec<(f64, f64)>> {
        let unwrapped = self.projection.unwrap(points);
        let (min_x, max_x) = unwrapped
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
        [-360.0, 0.0, 360.0]
            .iter()
            .filter(|&&shift| max_x + shift >= f.x0 && min_x + shift <= f.x1)
            .map(|&shift| {
                unwrapped
                    .iter()
                    .map(|&(x, lat)| f.px(x + shift, lat))
                    .collect()
            })
            .collect()
    }

    fn draw_land(&self, doc: &mut SvgDocument, f: &Frame, features: &GeoFeatures) {
        for ring in &features.polygons {
            for copy in self.shifted_copies(f, ring) {
                doc.polygon(&copy, LAND_COLOR, Some(("black", 0.5)));
            }
        }
        for line in &features.lines {
            for copy in self.shifted_copies(f, line) {
                doc.polyline(&copy, "black", 0.5, None, 1.0);
            }
        }
    }

    fn draw_gridlines(&self, doc: &mut SvgDocument, f: &Frame) {
        let xstride = self.options.xstride;
        for lon in stride_positions(-180.0, 180.0 - xstride / 2.0, xstride) {
            let x = f.fit_x(self.projection.x(lon));
            let line = [f.px(x, f.lat_min), f.px(x, f.lat_max)];
            doc.polyline(&line, "black", 0.5, None, 0.3);
        }
        let ystride = self.options.ystride;
        for lat in stride_positions(-90.0, 90.0 - ystride / 2.0, ystride) {
            if lat < f.lat_min || lat > f.lat_max {
                continue;
            }
            let line = [f.px(f.x0, lat), f.px(f.x1, lat)];
            doc.polyline(&line, "black", 0.5, None, 0.3);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_contours(
        &self,
        doc: &mut SvgDocument,
        f: &Frame,
        lines: &[ContourLine],
        colors: &[String],
        levels: &[f64],
        width: f64,
        style: LineStyle,
        labels: bool,
    ) {
        let label_style = TextStyle {
            font_size: f.font(8.0),
            anchor: Anchor::Middle,
            middle_baseline: true,
            ..TextStyle::default()
        };
        for line in lines {
            let k = levels.iter().position(|&l| l == line.level).unwrap_or(0);
            let color = &colors[k % colors.len()];
            for copy in self.shifted_copies(f, &line.points) {
                doc.polyline(&copy, color, width, style.dasharray(), 1.0);
                if labels && copy.len() >= 4 {
                    let (x, y) = copy[copy.len() / 2];
                    let style = TextStyle {
                        color: color.clone(),
                        ..label_style.clone()
                    };
                    doc.text(x, y, &format!("{:.1}", line.level), &style);
                }
            }
        }
    }

    fn draw_points(&self, doc: &mut SvgDocument, f: &Frame, points: &[(f64, f64, String)]) {
        let style = TextStyle {
            font_size: f.font(10.0),
            ..TextStyle::default()
        };
        // matplotlib marker size 50 is an area in points squared
        let radius = f.font(50f64.sqrt() / 2.0);
        for (lat, lon, name) in points {
            let (px, py) = f.px(f.fit_x(self.projection.x(*lon)), *lat);
            doc.circle(px, py, radius, "red");
            let (label_lat, label_lon) = label_position(name, *lat, *lon);
            let (tx, ty) = f.px(f.fit_x(self.projection.x(label_lon)), label_lat);
            doc.text(tx, ty, name, &style);
        }
    }

    fn draw_ticks(&self, doc: &mut SvgDocument, f: &Frame) {
        let lon_fmt = LongitudeFormatter {
            zero_direction_label: true,
        };
        let lat_fmt = LatitudeFormatter;
        let tick = f.font(4.0);
        let x_style = TextStyle {
            font_size: f.font(10.0),
            anchor: Anchor::Middle,
            ..TextStyle::default()
        };
        for &lon in &self.options.xticks {
            let x = f.fit_x(self.projection.x(lon));
            if x > f.x1 {
                continue;
            }
            let (px, py) = f.px(x, f.lat_min);
            doc.polyline(&[(px, py), (px, py + tick)], "black", 1.0, None, 1.0);
            doc.text(px, py + tick + f.font(11.0), &lon_fmt.format(lon), &x_style);
        }
        let y_style = TextStyle {
            font_size: f.font(10.0),
            anchor: Anchor::End,
            middle_baseline: true,
            ..TextStyle::default()
        };
        for &lat in &self.options.yticks {
            if lat < f.lat_min || lat > f.lat_max {
                continue;
            }
            let (px, py) = f.px(f.x0, lat);
            doc.polyline(&[(px - tick, py), (px, py)], "black", 1.0, None, 1.0);
            doc.text(px - tick - f.font(2.0), py, &lat_fmt.format(lat), &y_style);
        }
    }
}

fn draw_diagonal(
    doc: &mut SvgDocument,
    f: &Frame,
    x: f64,
    y: f64,
    text: &str,
    options: &DiagonalTextOptions,
) {
    let (cx, cy) = f.axes(x, y);
    let size = f.font(options.fontsize);
    let text_w = 0.6 * size * text.chars().count() as f64;
    let text_h = 1.2 * size;
    let pad = 0.5 * size;
    doc.begin_group(&format!("translate({:.2} {:.2}) rotate({:.2})", cx, cy, -options.rotation));
    doc.rounded_rect(
        -text_w / 2.0 - pad,
        -text_h / 2.0 - pad,
        text_w + 2.0 * pad,
        text_h + 2.0 * pad,
        pad,
        &options.box_color,
        options.alpha,
    );
    let style = TextStyle {
        font_size: size,
        color: options.color.clone(),
        anchor: Anchor::Middle,
        opacity: options.alpha,
        middle_baseline: true,
        ..TextStyle::default()
    };
    doc.text(0.0, 0.0, text, &style);
    doc.end_group();
}

fn draw_colorbar(doc: &mut SvgDocument, f: &Frame, filled: &Filled) {
    // horizontal, shrink 0.6, aspect 40, pad 0.05
    let width = 0.6 * f.ax_w;
    let height = width / 40.0;
    let left = f.left + (f.ax_w - width) / 2.0;
    let top = f.top + f.ax_h + 0.05 * f.ax_h + f.font(14.0);
    let n = filled.colors.len();
    let span = filled.levels[n] - filled.levels[0];
    for (k, color) in filled.colors.iter().enumerate() {
        let x0 = left + (filled.levels[k] - filled.levels[0]) / span * width;
        let x1 = left + (filled.levels[k + 1] - filled.levels[0]) / span * width;
        doc.rect(x0, top, x1 - x0, height, &color.to_hex(), None, 1.0);
    }
    doc.rect(left, top, width, height, "none", Some(("black", 0.8)), 0.0);

    let style = TextStyle {
        font_size: f.font(9.0),
        anchor: Anchor::Middle,
        ..TextStyle::default()
    };
    let stride = (filled.levels.len() / 10).max(1);
    for level in filled.levels.iter().step_by(stride) {
        let x = left + (level - filled.levels[0]) / span * width;
        let tick = [(x, top + height), (x, top + height + f.font(3.0))];
        doc.polyline(&tick, "black", 0.8, None, 1.0);
        doc.text(x, top + height + f.font(13.0), &format_number(*level), &style);
    }
    let label_style = TextStyle {
        font_size: f.font(10.0),
        anchor: Anchor::Middle,
        ..TextStyle::default()
    };
    doc.text(left + width / 2.0, top + height + f.font(28.0), &filled.label, &label_style);
}

/// Map of the tropical Pacific, optionally with a filled-contour field
///
/// # Errors
///
/// Returns an error for a bad extent or plot data that is not a 2-D
/// longitude/latitude field.
pub fn tropical_pacific(
    options: MapOptions,
    plot_data: Option<(&LabeledArray, &ContourfOptions)>,
) -> Result<MapFigure> {
    let mut figure = MapFigure::new(options)?;
    if let Some((data, contourf)) = plot_data {
        figure.add_contourf(data, contourf)?;
    }
    Ok(figure)
}
