//! Degree tick labels for map axes

/// Format a number without a trailing `.0`
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        let s = format!("{:.6}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Longitude labels such as `150°E`, `150°W` and `180°`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongitudeFormatter {
    /// Label the prime meridian `0°E` instead of `0°`
    pub zero_direction_label: bool,
}

impl Default for LongitudeFormatter {
    fn default() -> Self {
        Self {
            zero_direction_label: true,
        }
    }
}

impl LongitudeFormatter {
    pub fn format(&self, lon: f64) -> String {
        let mut wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
        if wrapped == -180.0 {
            wrapped = 180.0;
        }
        if wrapped == 180.0 {
            "180°".to_string()
        } else if wrapped == 0.0 {
            if self.zero_direction_label {
                "0°E".to_string()
            } else {
                "0°".to_string()
            }
        } else if wrapped > 0.0 {
            format!("{}°E", format_number(wrapped))
        } else {
            format!("{}°W", format_number(-wrapped))
        }
    }
}

/// Latitude labels such as `10°S`, `0°` and `30°N`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatitudeFormatter;

impl LatitudeFormatter {
    pub fn format(&self, lat: f64) -> String {
        if lat == 0.0 {
            "0°".to_string()
        } else if lat > 0.0 {
            format!("{}°N", format_number(lat))
        } else {
            format!("{}°S", format_number(-lat))
        }
    }
}

/// Multiples of `stride` covering `[min, max]`
pub fn stride_positions(min: f64, max: f64, stride: f64) -> Vec<f64> {
    if !(stride > 0.0) {
        return Vec::new();
    }
    let first = (min / stride).ceil() as i64;
    let last = (max / stride).floor() as i64;
    (first..=last).map(|k| k as f64 * stride).collect()
}

/// Round-number contour levels spanning `[min, max]`, at most about `n` of them
pub fn nice_levels(min: f64, max: f64, n: usize) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite()) {
        return Vec::new();
    }
    if max <= min {
        return vec![min];
    }
    let raw = (max - min) / n.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);
    let first = (min / step).floor() * step;
    let count = ((max - first) / step).ceil() as usize;
    (0..=count).map(|k| first + k as f64 * step).collect()
}
