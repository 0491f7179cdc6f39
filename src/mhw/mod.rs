//! Marine heatwave detection following Hobday et al. (2016)
//!
//! A marine heatwave is a period of at least five days during which the
//! temperature exceeds a seasonally varying threshold, the 90th percentile of
//! a day-of-year climatology. Events separated by short gaps are joined, and
//! each event is categorised by how many multiples of the threshold anomaly
//! its peak reaches (Hobday et al. 2018).
//!
//! The optional `min_threshold_delta` implements the severity filter of
//! Richaud et al. (2024): the threshold is never allowed closer than `delta`
//! to the seasonal climatology, which suppresses spurious events where
//! variability is tiny (e.g. under sea ice).
//!
//! Credits: the detection scheme follows Eric Oliver's `marineHeatWaves`.

mod climatology;
mod events;
pub mod time;

pub use climatology::{
    compute_climatology, nan_percentile, periodic_running_mean, Climatology, CLIM_YEAR_DAYS,
};
pub use time::{check_daily, decode_cf_time, leap_day_of_year, read_time_axis, Calendar, TimeUnits};

use crate::dataarray::{Dataset, LabeledArray};
use crate::errors::{AcdError, Result};
use crate::statistics::parallel::par_map_lanes_with;
use chrono::NaiveDate;
use ndarray::ArrayView1;
use std::fmt;

/// Detection parameters, defaults as in Hobday et al. (2016)
#[derive(Debug, Clone, PartialEq)]
pub struct MhwParams {
    /// Threshold percentile
    pub percentile: f64,
    /// Half width, in days, of the window pooled around each day of year
    pub window_half_width: usize,
    /// Smooth climatology and threshold with a running mean
    pub smooth_percentile: bool,
    /// Width of that running mean, in days (odd)
    pub smooth_width: usize,
    /// Minimum event duration, in days
    pub min_duration: usize,
    pub join_across_gaps: bool,
    /// Largest gap, in days, bridged when joining
    pub max_gap: usize,
    /// Inclusive range of years the climatology is built from; full record if `None`
    pub climatology_period: Option<(i32, i32)>,
    /// Minimum distance between threshold and climatology
    pub min_threshold_delta: Option<f64>,
}

impl Default for MhwParams {
    fn default() -> Self {
        Self {
            percentile: 90.0,
            window_half_width: 5,
            smooth_percentile: true,
            smooth_width: 31,
            min_duration: 5,
            join_across_gaps: true,
            max_gap: 2,
            climatology_period: None,
            min_threshold_delta: None,
        }
    }
}

impl MhwParams {
    /// # Errors
    ///
    /// Returns [`AcdError::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| Err(AcdError::InvalidParameter { message });
        if !(self.percentile > 0.0 && self.percentile < 100.0) {
            return fail(format!("percentile must be in (0, 100), got {}", self.percentile));
        }
        if self.smooth_percentile && (self.smooth_width == 0 || self.smooth_width % 2 == 0) {
            return fail(format!(
                "smooth_width must be a positive odd number, got {}",
                self.smooth_width
            ));
        }
        if self.min_duration == 0 {
            return fail("min_duration must be at least 1 day".to_string());
        }
        if let Some((start, end)) = self.climatology_period {
            if start > end {
                return fail(format!("climatology period {}-{} is reversed", start, end));
            }
        }
        if let Some(delta) = self.min_threshold_delta {
            if !(delta.is_finite() && delta >= 0.0) {
                return fail(format!("min_threshold_delta must be >= 0, got {}", delta));
            }
        }
        Ok(())
    }
}

/// Hobday et al. (2018) severity category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Moderate,
    Strong,
    Severe,
    Extreme,
}

impl Category {
    /// Category for a peak anomaly expressed in multiples of `thresh - seas`
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio.is_nan() {
            return Category::Moderate;
        }
        match ratio.floor() {
            r if r >= 4.0 => Category::Extreme,
            r if r >= 3.0 => Category::Severe,
            r if r >= 2.0 => Category::Strong,
            _ => Category::Moderate,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Moderate => "Moderate",
            Category::Strong => "Strong",
            Category::Severe => "Severe",
            Category::Extreme => "Extreme",
        };
        write!(f, "{}", name)
    }
}

/// One detected event; intensities are relative to the seasonal climatology
#[derive(Debug, Clone, PartialEq)]
pub struct MhwEvent {
    pub index_start: usize,
    pub index_end: usize,
    pub index_peak: usize,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub date_peak: NaiveDate,
    /// Days from start to end inclusive
    pub duration: usize,
    pub intensity_max: f64,
    pub intensity_mean: f64,
    /// Standard deviation of the anomaly over the event
    pub intensity_var: f64,
    pub intensity_cumulative: f64,
    /// Peak temperature minus threshold
    pub intensity_max_rel_thresh: f64,
    pub category: Category,
}

/// Climatology of a series and the events found in it
#[derive(Debug, Clone)]
pub struct MhwResult {
    pub climatology: Climatology,
    /// Seasonal climatology at each time step
    pub seas: Vec<f64>,
    /// Threshold at each time step
    pub thresh: Vec<f64>,
    pub events: Vec<MhwEvent>,
}

fn check_inputs(dates: &[NaiveDate], n_temps: usize, params: &MhwParams) -> Result<()> {
    params.validate()?;
    if dates.len() != n_temps {
        return Err(AcdError::ShapeMismatch {
            message: format!(
                "{} dates for {} temperature values",
                dates.len(),
                n_temps
            ),
        });
    }
    check_daily(dates)
}

/// Climatology of a daily series
///
/// # Errors
///
/// Returns an error for invalid parameters, mismatched lengths or a
/// non-daily time axis.
pub fn climatology(dates: &[NaiveDate], temps: &[f64], params: &MhwParams) -> Result<Climatology> {
    check_inputs(dates, temps.len(), params)?;
    Ok(compute_climatology(dates, temps, params))
}

fn detect_checked(dates: &[NaiveDate], temps: &[f64], params: &MhwParams) -> MhwResult {
    let clim = compute_climatology(dates, temps, params);
    let (seas, thresh): (Vec<f64>, Vec<f64>) = dates.iter().map(|&d| clim.at(d)).unzip();
    let events = events::find_events(dates, temps, &seas, &thresh, params);
    MhwResult {
        climatology: clim,
        seas,
        thresh,
        events,
    }
}

/// Detect marine heatwaves in a daily temperature series
///
/// # Errors
///
/// Returns an error for invalid parameters, mismatched lengths or a
/// non-daily time axis.
pub fn detect(dates: &[NaiveDate], temps: &[f64], params: &MhwParams) -> Result<MhwResult> {
    check_inputs(dates, temps.len(), params)?;
    let result = detect_checked(dates, temps, params);
    tracing::debug!(events = result.events.len(), "marine heatwave detection");
    Ok(result)
}

/// Per-location event count, total heatwave days and largest peak intensity
///
/// Locations without any finite value (land) get `NaN` everywhere; locations
/// without events get a count of zero and a `NaN` maximum intensity.
///
/// # Errors
///
/// Returns an error if `time_dim` is missing, or for the reasons listed
/// under [`detect`].
pub fn mhw_summary(
    da: &LabeledArray,
    time_dim: &str,
    dates: &[NaiveDate],
    params: &MhwParams,
) -> Result<Dataset> {
    let axis = da.axis_of(time_dim)?;
    check_inputs(dates, da.data.len_of(ndarray::Axis(axis)), params)?;
    tracing::info!(
        var = %da.name,
        locations = da.data.len() / dates.len().max(1),
        "marine heatwave summary"
    );

    let stats = par_map_lanes_with(&da.data, axis, |lane: ArrayView1<f64>| {
        let temps: Vec<f64> = lane.to_vec();
        if !temps.iter().any(|v| v.is_finite()) {
            return (f64::NAN, f64::NAN, f64::NAN);
        }
        let result = detect_checked(dates, &temps, params);
        let count = result.events.len() as f64;
        let days: usize = result.events.iter().map(|e| e.duration).sum();
        let max_intensity = result
            .events
            .iter()
            .map(|e| e.intensity_max)
            .fold(f64::NAN, f64::max);
        (count, days as f64, max_intensity)
    })?;

    let mut ds = Dataset::new();
    ds.insert(
        da.reduced_with(time_dim, "mhw_count", stats.mapv(|s| s.0))?
            .with_attr("long_name", "number of marine heatwaves"),
    );
    ds.insert(
        da.reduced_with(time_dim, "mhw_total_days", stats.mapv(|s| s.1))?
            .with_attr("long_name", "total marine heatwave days")
            .with_attr("units", "days"),
    );
    let mut max = da
        .reduced_with(time_dim, "mhw_max_intensity", stats.mapv(|s| s.2))?
        .with_attr("long_name", "largest marine heatwave peak intensity");
    if let Some(units) = da.attrs.get("units") {
        max = max.with_attr("units", units.clone());
    }
    ds.insert(max);
    ds.attrs
        .insert("mhw_percentile".to_string(), params.percentile.into());
    ds.attrs
        .insert("mhw_min_duration".to_string(), (params.min_duration as f64).into());
    Ok(ds)
}
