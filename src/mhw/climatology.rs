//! Seasonal climatology and percentile threshold on a 366-day year

use super::time::leap_day_of_year;
use super::MhwParams;
use crate::statistics::nan_mean;
use chrono::{Datelike, NaiveDate};
use ndarray::ArrayView1;

/// Length of the climatological year
pub const CLIM_YEAR_DAYS: usize = 366;
/// Day of year of Feb 29 on the leap calendar
pub const FEB29: usize = 60;

/// Seasonal mean and threshold indexed by leap day-of-year minus one
#[derive(Debug, Clone, PartialEq)]
pub struct Climatology {
    pub seas: Vec<f64>,
    pub thresh: Vec<f64>,
}

impl Climatology {
    /// Climatology values for the day of year of `date`: `(seas, thresh)`
    pub fn at(&self, date: NaiveDate) -> (f64, f64) {
        let idx = leap_day_of_year(date) - 1;
        (self.seas[idx], self.thresh[idx])
    }
}

/// Percentile of the finite values with linear interpolation between ranks
///
/// Returns `NaN` when there are no finite values.
pub fn nan_percentile(values: &[f64], percentile: f64) -> f64 {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    finite.sort_by(f64::total_cmp);
    let rank = percentile / 100.0 * (finite.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    finite[lower] + (finite[upper] - finite[lower]) * frac
}

/// Running mean of width `width` treating `values` as periodic
pub fn periodic_running_mean(values: &[f64], width: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let half = width / 2;
    (0..n)
        .map(|i| {
            let window: Vec<f64> = (0..width)
                .map(|k| values[(i + n * (half / n + 1) + k - half) % n])
                .collect();
            nan_mean(ArrayView1::from(&window[..]))
        })
        .collect()
}

/// Compute the seasonal climatology and threshold of a daily series
///
/// For every day of the leap year, samples within `window_half_width` time
/// steps of each occurrence of that day are pooled, restricted to years in
/// the climatology period. Feb 29 is the mean of Feb 28 and Mar 1, then both
/// curves are optionally smoothed with a periodic running mean.
///
/// `dates` and `temps` must have equal length and `dates` must be daily.
pub fn compute_climatology(dates: &[NaiveDate], temps: &[f64], params: &MhwParams) -> Climatology {
    let (first_year, last_year) = params.climatology_period.unwrap_or_else(|| {
        let first = dates.first().map(|d| d.year()).unwrap_or(0);
        let last = dates.last().map(|d| d.year()).unwrap_or(0);
        (first, last)
    });
    let in_period: Vec<bool> = dates
        .iter()
        .map(|d| (first_year..=last_year).contains(&d.year()))
        .collect();
    let doys: Vec<usize> = dates.iter().map(|&d| leap_day_of_year(d)).collect();

    let mut pools: Vec<Vec<f64>> = vec![Vec::new(); CLIM_YEAR_DAYS];
    let w = params.window_half_width;
    for (t, &doy) in doys.iter().enumerate() {
        if doy == FEB29 || !in_period[t] {
            continue;
        }
        let lo = t.saturating_sub(w);
        let hi = (t + w).min(temps.len() - 1);
        pools[doy - 1].extend((lo..=hi).filter(|&j| in_period[j]).map(|j| temps[j]));
    }

    let mut seas: Vec<f64> = pools
        .iter()
        .map(|p| nan_mean(ArrayView1::from(&p[..])))
        .collect();
    let mut thresh: Vec<f64> = pools
        .iter()
        .map(|p| nan_percentile(p, params.percentile))
        .collect();

    let feb29 = FEB29 - 1;
    seas[feb29] = 0.5 * (seas[feb29 - 1] + seas[feb29 + 1]);
    thresh[feb29] = 0.5 * (thresh[feb29 - 1] + thresh[feb29 + 1]);

    if params.smooth_percentile {
        seas = periodic_running_mean(&seas, params.smooth_width);
        thresh = periodic_running_mean(&thresh, params.smooth_width);
    }

    if let Some(delta) = params.min_threshold_delta {
        for (th, &s) in thresh.iter_mut().zip(&seas) {
            if s.is_finite() && *th < s + delta {
                *th = s + delta;
            }
        }
    }

    Climatology { seas, thresh }
}
