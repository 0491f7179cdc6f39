//! Colormaps by name and value normalisation

use crate::errors::{AcdError, Result};

/// An sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Relative luminance in `[0, 1]`
    pub fn luminance(self) -> f64 {
        let lin = |c: u8| {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * lin(self.0) + 0.7152 * lin(self.1) + 0.0722 * lin(self.2)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

const RDBU: [&str; 11] = [
    "#67001f", "#b2182b", "#d6604d", "#f4a582", "#fddbc7", "#f7f7f7", "#d1e5f0", "#92c5de",
    "#4393c3", "#2166ac", "#053061",
];

const VIRIDIS: [&str; 10] = [
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58",
    "#b5de2b", "#fde725",
];

const THERMAL: [&str; 7] = [
    "#042333", "#2c3395", "#744992", "#b15f82", "#eb7958", "#fbb43d", "#e8fa5b",
];

const BALANCE: [&str; 7] = [
    "#181c43", "#0c5ebe", "#75aabe", "#f1eceb", "#d08b73", "#a52125", "#3c0912",
];

/// A continuous colormap built from evenly spaced colour stops
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    stops: Vec<Rgb>,
}

impl Colormap {
    /// Look a colormap up by name; a `_r` suffix reverses it
    ///
    /// Known names: `RdBu`, `viridis`, `thermal`, `balance`.
    pub fn by_name(name: &str) -> Result<Self> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };
        let hexes: &[&str] = match base.to_ascii_lowercase().as_str() {
            "rdbu" => &RDBU,
            "viridis" => &VIRIDIS,
            "thermal" => &THERMAL,
            "balance" => &BALANCE,
            _ => {
                return Err(AcdError::InvalidParameter {
                    message: format!("unknown colormap '{}'", name),
                })
            }
        };
        let mut stops: Vec<Rgb> = hexes.iter().filter_map(|h| Rgb::from_hex(h)).collect();
        if reversed {
            stops.reverse();
        }
        Ok(Self {
            name: name.to_string(),
            stops,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Colour at position `t` in `[0, 1]` (clamped)
    pub fn at(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (self.stops.len() - 1) as f64;
        let i = (scaled.floor() as usize).min(self.stops.len() - 2);
        self.stops[i].lerp(self.stops[i + 1], scaled - i as f64)
    }

    /// `n` colours evenly spread over the map
    pub fn sample(&self, n: usize) -> Vec<Rgb> {
        match n {
            0 => Vec::new(),
            1 => vec![self.at(0.5)],
            _ => (0..n).map(|k| self.at(k as f64 / (n - 1) as f64)).collect(),
        }
    }
}

/// Linear mapping of data values onto `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub vmin: f64,
    pub vmax: f64,
}

impl Normalize {
    pub fn new(vmin: f64, vmax: f64) -> Result<Self> {
        if !(vmin.is_finite() && vmax.is_finite() && vmax > vmin) {
            return Err(AcdError::InvalidParameter {
                message: format!("vmin ({}) must be below vmax ({})", vmin, vmax),
            });
        }
        Ok(Self { vmin, vmax })
    }

    /// Position of `value`, `None` for missing values
    pub fn apply(&self, value: f64) -> Option<f64> {
        if value.is_nan() {
            None
        } else {
            Some((value - self.vmin) / (self.vmax - self.vmin))
        }
    }
}
