//! Static figures rendered to SVG
//!
//! [`tropical_pacific`] builds a Pacific-centred PlateCarree map; layers
//! (land, filled and line contours, point markers, annotation text) are
//! added to the returned [`MapFigure`] before rendering. [`heatmap`] draws a
//! labelled table.

pub mod annotate;
pub mod colormap;
pub mod contour;
pub mod figure;
pub mod geo;
pub mod heatmap;
pub mod projection;
pub mod svg;
pub mod ticks;

pub use annotate::{label_position, BBox, TextPosition};
pub use colormap::{Colormap, Normalize, Rgb};
pub use contour::{contour_lines, ContourLine};
pub use figure::{
    tropical_pacific, ContourOptions, ContourfOptions, DiagonalTextOptions, Levels, LineStyle,
    MapFigure, MapOptions, TextOptions,
};
pub use geo::GeoFeatures;
pub use heatmap::{heatmap, Heatmap, HeatmapOptions, HeatmapTable};
pub use projection::{Extent, Projection};
pub use ticks::{LatitudeFormatter, LongitudeFormatter};
