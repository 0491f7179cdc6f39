//! Placement rules for map annotations
//!
//! Positions are fractions of the figure (outside text) or of the axes
//! (inside and diagonal text), with `(0, 0)` at the bottom left.

/// A named placement or explicit fractional coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum TextPosition {
    Named(String),
    Custom(f64, f64),
}

impl From<&str> for TextPosition {
    fn from(name: &str) -> Self {
        TextPosition::Named(name.to_string())
    }
}

impl From<(f64, f64)> for TextPosition {
    fn from((x, y): (f64, f64)) -> Self {
        TextPosition::Custom(x, y)
    }
}

/// Axes rectangle in figure fractions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Resolved text placement: fractional position and horizontal alignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    /// `"left"`, `"center"` or `"right"`
    pub ha: &'static str,
}

/// Placement of text outside the axes, in figure fractions
///
/// Named positions are `bottom`, `top`, `top-right` and `bottom-right`;
/// unknown names fall back to `(0.5, 0.02)`. Names containing `right` are
/// right-aligned, everything else is centred.
pub fn outside_placement(position: &TextPosition) -> Placement {
    match position {
        TextPosition::Custom(x, y) => Placement {
            x: *x,
            y: *y,
            ha: "center",
        },
        TextPosition::Named(name) => {
            let (x, y) = match name.as_str() {
                "bottom" => (0.5, 0.03),
                "top" => (0.5, 0.92),
                "top-right" => (0.98, 0.92),
                "bottom-right" => (0.98, 0.03),
                _ => (0.5, 0.02),
            };
            let ha = if name.contains("right") { "right" } else { "center" };
            Placement { x, y, ha }
        }
    }
}

/// Placement of text just inside the axes, in figure fractions
///
/// Named positions are `bottom`, `top`, `top-right`, `bottom-right` and
/// `bottom-left`; unknown names fall back to the bottom centre of the
/// figure.
pub fn inside_placement(position: &TextPosition, bbox: &BBox) -> Placement {
    let centre_x = bbox.x0 + (bbox.x1 - bbox.x0) / 2.0;
    match position {
        TextPosition::Custom(x, y) => Placement {
            x: *x,
            y: *y,
            ha: "center",
        },
        TextPosition::Named(name) => {
            let (x, y, ha) = match name.as_str() {
                "bottom" => (centre_x, bbox.y0 + 0.005, "center"),
                "top" => (centre_x, bbox.y1 - 0.005, "center"),
                "top-right" => (bbox.x1 - 0.02, bbox.y1 - 0.015, "right"),
                "bottom-right" => (bbox.x1 - 0.02, bbox.y0 + 0.005, "right"),
                "bottom-left" => (bbox.x0 + 0.02, bbox.y0 + 0.005, "left"),
                _ => (0.5, bbox.y0 + 0.005, "center"),
            };
            Placement { x, y, ha }
        }
    }
}

/// Centre of diagonal text in axes fractions; unknown names mean `center`
pub fn diagonal_placement(position: &str) -> (f64, f64) {
    match position {
        "top-center" => (0.5, 0.9),
        "bottom-center" => (0.5, 0.1),
        "top-left" => (0.1, 0.9),
        "top-right" => (0.9, 0.9),
        "bottom-left" => (0.1, 0.1),
        "bottom-right" => (0.9, 0.1),
        _ => (0.5, 0.5),
    }
}

/// Insert `spacing` spaces between the characters of `text`
pub fn spaced_text(text: &str, spacing: usize) -> String {
    let gap = " ".repeat(spacing);
    let chars: Vec<String> = text.chars().map(String::from).collect();
    chars.join(&gap)
}

/// Label anchor for a point marker: one degree east of the point, shifted
/// for a few Pacific island names whose labels would otherwise overlap
pub fn label_position(name: &str, lat: f64, lon: f64) -> (f64, f64) {
    let (dlat, dlon) = match name {
        "American Samoa" => (-1.5, -1.0),
        "Samoa" => (-2.0, -5.0),
        "Wallis and Futuna" => (1.0, -1.0),
        _ => (0.0, 0.0),
    };
    (lat + dlat, lon + dlon + 1.0)
}
