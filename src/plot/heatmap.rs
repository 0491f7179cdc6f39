//! Annotated heatmaps of labelled tables

use super::colormap::{Colormap, Normalize};
use super::svg::{Anchor, SvgDocument, TextStyle};
use super::ticks::{format_number, nice_levels};
use crate::errors::{AcdError, Result};
use ndarray::Array2;
use std::path::Path;

/// Values with row and column labels
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapTable {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub values: Array2<f64>,
}

impl HeatmapTable {
    /// # Errors
    ///
    /// Returns [`AcdError::ShapeMismatch`] if the labels do not match the values.
    pub fn new(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self> {
        if values.dim() != (row_labels.len(), col_labels.len()) {
            return Err(AcdError::ShapeMismatch {
                message: format!(
                    "heatmap values are {:?} but there are {} row and {} column labels",
                    values.dim(),
                    row_labels.len(),
                    col_labels.len()
                ),
            });
        }
        Ok(Self {
            row_labels,
            col_labels,
            values,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapOptions {
    /// Width and height in inches
    pub figsize: (f64, f64),
    pub cmap: String,
    pub vmin: f64,
    pub vmax: f64,
    pub title: String,
    /// Text drawn centred in each cell, same shape as the table
    pub annot: Option<Vec<Vec<String>>>,
    pub dpi: f64,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            figsize: (20.0, 8.0),
            cmap: "RdBu_r".to_string(),
            vmin: -2.0,
            vmax: 2.0,
            title: "my plot title".to_string(),
            annot: None,
            dpi: 72.0,
        }
    }
}

/// Annotated heatmap with square cells, thin white cell borders and a vertical colorbar
pub struct Heatmap {
    doc: SvgDocument,
}

impl Heatmap {
    pub fn render_svg(&self) -> String {
        self.doc.finish()
    }

    pub fn save_svg(&self, path: &Path) -> Result<()> {
        self.doc.save(path)
    }
}

/// Draw `table` as a heatmap
///
/// Annotation text is black on light cells and white on dark ones.
///
/// # Errors
///
/// Returns an error for an unknown colormap, `vmin >= vmax`, an empty table
/// or annotations of the wrong shape.
pub fn heatmap(table: &HeatmapTable, options: &HeatmapOptions) -> Result<Heatmap> {
    let cmap = Colormap::by_name(&options.cmap)?;
    let norm = Normalize::new(options.vmin, options.vmax)?;
    let (nrows, ncols) = table.values.dim();
    if nrows == 0 || ncols == 0 {
        return Err(AcdError::InvalidParameter {
            message: "cannot draw an empty heatmap".to_string(),
        });
    }
    if let Some(annot) = &options.annot {
        if annot.len() != nrows || annot.iter().any(|row| row.len() != ncols) {
            return Err(AcdError::ShapeMismatch {
                message: format!("annotations must be {} rows of {} values", nrows, ncols),
            });
        }
    }

    let scale = options.dpi / 72.0;
    let width = options.figsize.0 * options.dpi;
    let height = options.figsize.1 * options.dpi;
    let mut doc = SvgDocument::new(width, height);

    let label_chars = table.row_labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
    let left = (0.6 * 10.0 * scale * label_chars + 12.0 * scale).max(0.05 * width);
    let top = 0.08 * height;
    let bottom = 0.18 * height;
    let colorbar_space = 0.1 * width;
    let cell = ((width - left - colorbar_space) / ncols as f64)
        .min((height - top - bottom) / nrows as f64);
    let grid_w = cell * ncols as f64;
    let grid_h = cell * nrows as f64;

    for (j, row) in table.values.outer_iter().enumerate() {
        for (i, &value) in row.iter().enumerate() {
            let x = left + i as f64 * cell;
            let y = top + j as f64 * cell;
            let Some(t) = norm.apply(value) else { continue };
            let color = cmap.at(t);
            doc.rect(x, y, cell, cell, &color.to_hex(), Some(("white", 0.5)), 1.0);
            if let Some(annot) = &options.annot {
                let style = TextStyle {
                    font_size: 10.0 * scale,
                    color: if color.luminance() > 0.408 { "black" } else { "white" }.to_string(),
                    anchor: Anchor::Middle,
                    middle_baseline: true,
                    ..TextStyle::default()
                };
                doc.text(x + cell / 2.0, y + cell / 2.0, &annot[j][i], &style);
            }
        }
    }

    let row_style = TextStyle {
        font_size: 10.0 * scale,
        anchor: Anchor::End,
        middle_baseline: true,
        ..TextStyle::default()
    };
    for (j, label) in table.row_labels.iter().enumerate() {
        doc.text(left - 6.0 * scale, top + (j as f64 + 0.5) * cell, label, &row_style);
    }
    let longest_col = table.col_labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
    let vertical = 0.6 * 10.0 * scale * longest_col > cell;
    let col_style = TextStyle {
        font_size: 10.0 * scale,
        anchor: if vertical { Anchor::End } else { Anchor::Middle },
        rotation: if vertical { 90.0 } else { 0.0 },
        middle_baseline: vertical,
        ..TextStyle::default()
    };
    for (i, label) in table.col_labels.iter().enumerate() {
        let x = left + (i as f64 + 0.5) * cell;
        let y = top + grid_h + if vertical { 6.0 * scale } else { 14.0 * scale };
        doc.text(x, y, label, &col_style);
    }

    // colorbar
    let bar_x = left + grid_w + 0.02 * width;
    let bar_w = 0.015 * width;
    let steps = 64;
    for k in 0..steps {
        let t = 1.0 - (k as f64 + 0.5) / steps as f64;
        let y = top + k as f64 * grid_h / steps as f64;
        doc.rect(bar_x, y, bar_w, grid_h / steps as f64 + 0.5, &cmap.at(t).to_hex(), None, 1.0);
    }
    let tick_style = TextStyle {
        font_size: 9.0 * scale,
        middle_baseline: true,
        ..TextStyle::default()
    };
    for level in nice_levels(options.vmin, options.vmax, 8) {
        if level < options.vmin || level > options.vmax {
            continue;
        }
        let y = top + (options.vmax - level) / (options.vmax - options.vmin) * grid_h;
        let tick = [(bar_x + bar_w, y), (bar_x + bar_w + 3.0 * scale, y)];
        doc.polyline(&tick, "black", 0.8, None, 1.0);
        doc.text(bar_x + bar_w + 5.0 * scale, y, &format_number(level), &tick_style);
    }

    let title_style = TextStyle {
        font_size: 12.0 * scale,
        anchor: Anchor::Middle,
        ..TextStyle::default()
    };
    doc.text(left + grid_w / 2.0, top - 10.0 * scale, &options.title, &title_style);

    tracing::debug!(rows = nrows, cols = ncols, "drew heatmap");
    Ok(Heatmap { doc })
}
