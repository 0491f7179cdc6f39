//! Event identification from a series and its threshold

use super::{Category, MhwEvent, MhwParams};
use chrono::NaiveDate;

/// Inclusive `(start, end)` index runs where `exceed` is true
fn runs(exceed: &[bool]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, &e) in exceed.iter().enumerate() {
        match (e, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                out.push((s, i - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push((s, exceed.len() - 1));
    }
    out
}

/// Merge consecutive runs separated by at most `max_gap` steps
fn join_gaps(events: Vec<(usize, usize)>, max_gap: usize) -> Vec<(usize, usize)> {
    let mut joined: Vec<(usize, usize)> = Vec::with_capacity(events.len());
    for (start, end) in events {
        match joined.last_mut() {
            Some(last) if start - last.1 - 1 <= max_gap => last.1 = end,
            _ => joined.push((start, end)),
        }
    }
    joined
}

/// Identify events in a daily series given per-step climatology
pub(crate) fn find_events(
    dates: &[NaiveDate],
    temps: &[f64],
    seas: &[f64],
    thresh: &[f64],
    params: &MhwParams,
) -> Vec<MhwEvent> {
    let exceed: Vec<bool> = temps.iter().zip(thresh).map(|(t, th)| t > th).collect();

    let mut spans: Vec<(usize, usize)> = runs(&exceed)
        .into_iter()
        .filter(|(s, e)| e - s + 1 >= params.min_duration)
        .collect();
    if params.join_across_gaps {
        spans = join_gaps(spans, params.max_gap);
    }

    spans
        .into_iter()
        .map(|(start, end)| describe(dates, temps, seas, thresh, start, end))
        .collect()
}

fn describe(
    dates: &[NaiveDate],
    temps: &[f64],
    seas: &[f64],
    thresh: &[f64],
    start: usize,
    end: usize,
) -> MhwEvent {
    let rel_seas: Vec<(usize, f64)> = (start..=end)
        .map(|t| (t, temps[t] - seas[t]))
        .filter(|(_, v)| v.is_finite())
        .collect();

    // every event contains at least one exceedance, so rel_seas is not empty
    let (peak, intensity_max) = rel_seas
        .iter()
        .copied()
        .fold((start, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best });
    let n = rel_seas.len().max(1) as f64;
    let intensity_cumulative: f64 = rel_seas.iter().map(|(_, v)| v).sum();
    let intensity_mean = intensity_cumulative / n;
    let intensity_var = (rel_seas
        .iter()
        .map(|(_, v)| (v - intensity_mean).powi(2))
        .sum::<f64>()
        / n)
        .sqrt();

    let band = thresh[peak] - seas[peak];
    MhwEvent {
        index_start: start,
        index_end: end,
        index_peak: peak,
        date_start: dates[start],
        date_end: dates[end],
        date_peak: dates[peak],
        duration: end - start + 1,
        intensity_max,
        intensity_mean,
        intensity_var,
        intensity_cumulative,
        intensity_max_rel_thresh: temps[peak] - thresh[peak],
        category: Category::from_ratio(intensity_max / band),
    }
}

