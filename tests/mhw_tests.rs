mod common;

use acd_tools::dataarray::{AttrValue, Coordinate, LabeledArray};
use acd_tools::errors::{AcdError, Result};
use acd_tools::mhw::{
    check_daily, climatology, decode_cf_time, detect, leap_day_of_year, mhw_summary,
    nan_percentile, periodic_running_mean, read_time_axis, Category, MhwParams,
};
use chrono::{Datelike, NaiveDate};
use ndarray::Array2;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Thirty years of daily dates, 1990 to 2019
fn daily_dates() -> Vec<NaiveDate> {
    date(1990, 1, 1)
        .iter_days()
        .take_while(|d| d.year() < 2020)
        .collect()
}

/// Baseline alternating 19.5 / 20.5, so the climatology is near 20 and
/// the 90th percentile threshold is 20.5
fn baseline(n: usize) -> Vec<f64> {
    (0..n).map(|i| if i % 2 == 0 { 19.5 } else { 20.5 }).collect()
}

fn index_of(dates: &[NaiveDate], d: NaiveDate) -> usize {
    dates.iter().position(|x| *x == d).expect("date in range")
}

/// Ten warm days peaking at 21.2 on their fifth day
const EVENT: [f64; 10] = [20.8, 20.9, 21.0, 21.1, 21.2, 21.1, 21.0, 20.9, 20.8, 20.7];

#[test]
fn test_detect_injected_event() -> Result<()> {
    let dates = daily_dates();
    let mut temps = baseline(dates.len());
    let start = index_of(&dates, date(2005, 7, 1));
    temps[start..start + EVENT.len()].copy_from_slice(&EVENT);

    let result = detect(&dates, &temps, &MhwParams::default())?;
    assert_eq!(result.seas.len(), dates.len());
    assert_eq!(result.events.len(), 1, "exactly one event expected: {:?}", result.events);

    let event = &result.events[0];
    assert_eq!(event.index_start, start);
    assert_eq!(event.duration, 10);
    assert_eq!(event.date_start, date(2005, 7, 1));
    assert_eq!(event.date_end, date(2005, 7, 10));
    assert_eq!(event.date_peak, date(2005, 7, 5));
    assert!((result.thresh[start] - 20.5).abs() < 1e-9);
    assert!((event.intensity_max - (21.2 - result.seas[event.index_peak])).abs() < 1e-9);
    assert!((event.intensity_max_rel_thresh - 0.7).abs() < 1e-9);
    assert!(event.intensity_mean > 0.7 && event.intensity_mean < event.intensity_max);
    assert!(event.intensity_var > 0.0);
    assert!((event.intensity_cumulative - event.intensity_mean * 10.0).abs() < 1e-9);
    // peak anomaly is between two and three times the threshold anomaly
    assert_eq!(event.category, Category::Strong);
    Ok(())
}

#[test]
fn test_short_runs_and_gap_joining() -> Result<()> {
    let dates = daily_dates();
    let mut temps = baseline(dates.len());

    // 6 warm days, a 2-day gap, 6 more warm days
    let a = index_of(&dates, date(2000, 3, 10));
    for t in (a..a + 6).chain(a + 8..a + 14) {
        temps[t] = 21.0;
    }
    // 4 warm days: too short on its own
    let b = index_of(&dates, date(2010, 9, 1));
    for t in b..b + 4 {
        temps[t] = 21.0;
    }

    let joined = detect(&dates, &temps, &MhwParams::default())?;
    assert_eq!(joined.events.len(), 1);
    assert_eq!(joined.events[0].index_start, a);
    assert_eq!(joined.events[0].duration, 14);

    let params = MhwParams {
        join_across_gaps: false,
        ..MhwParams::default()
    };
    let separate = detect(&dates, &temps, &params)?;
    assert_eq!(separate.events.len(), 2);
    assert_eq!(separate.events[1].index_start, a + 8);
    assert_eq!(separate.events[1].duration, 6);

    let params = MhwParams {
        min_duration: 4,
        max_gap: 1,
        ..MhwParams::default()
    };
    let short = detect(&dates, &temps, &params)?;
    assert_eq!(short.events.len(), 3);
    assert_eq!(short.events[2].index_start, b);
    Ok(())
}

#[test]
fn test_minimum_threshold_delta() -> Result<()> {
    let dates = daily_dates();
    let mut temps = baseline(dates.len());
    let start = index_of(&dates, date(2005, 7, 1));
    temps[start..start + EVENT.len()].copy_from_slice(&EVENT);

    // threshold kept at least 1.5 above climatology: the event disappears
    let params = MhwParams {
        min_threshold_delta: Some(1.5),
        ..MhwParams::default()
    };
    let clim = climatology(&dates, &temps, &params)?;
    for (th, s) in clim.thresh.iter().zip(&clim.seas) {
        assert!(*th >= s + 1.5 - 1e-12);
    }
    assert!(detect(&dates, &temps, &params)?.events.is_empty());
    Ok(())
}

#[test]
fn test_climatology_period_restricts_years() -> Result<()> {
    let dates = daily_dates();
    // 1990-1999 are 5 degrees warmer than the rest
    let temps: Vec<f64> = dates
        .iter()
        .zip(baseline(dates.len()))
        .map(|(d, t)| if d.year() < 2000 { t + 5.0 } else { t })
        .collect();

    let params = MhwParams {
        climatology_period: Some((2000, 2019)),
        ..MhwParams::default()
    };
    let clim = climatology(&dates, &temps, &params)?;
    assert_eq!(clim.seas.len(), 366);
    assert!(clim.seas.iter().all(|s| (s - 20.0).abs() < 0.1));

    let result = detect(&dates, &temps, &params)?;
    // the warm decade is one long event, the rest is quiet
    assert_eq!(result.events.len(), 1);
    assert_eq!(result.events[0].index_start, 0);
    assert_eq!(result.events[0].date_end, date(1999, 12, 31));
    assert_eq!(result.events[0].category, Category::Extreme);
    Ok(())
}

#[test]
fn test_invalid_inputs() {
    let dates = daily_dates();
    let temps = baseline(dates.len());

    let bad_params = [
        MhwParams {
            percentile: 100.0,
            ..MhwParams::default()
        },
        MhwParams {
            smooth_width: 30,
            ..MhwParams::default()
        },
        MhwParams {
            min_duration: 0,
            ..MhwParams::default()
        },
        MhwParams {
            climatology_period: Some((2010, 2000)),
            ..MhwParams::default()
        },
        MhwParams {
            min_threshold_delta: Some(-1.0),
            ..MhwParams::default()
        },
    ];
    for params in &bad_params {
        assert!(
            matches!(detect(&dates, &temps, params), Err(AcdError::InvalidParameter { .. })),
            "{:?} must be rejected",
            params
        );
    }

    // an even width is fine when smoothing is off
    let params = MhwParams {
        smooth_percentile: false,
        smooth_width: 30,
        ..MhwParams::default()
    };
    assert!(params.validate().is_ok());

    assert!(matches!(
        detect(&dates, &temps[1..], &MhwParams::default()),
        Err(AcdError::ShapeMismatch { .. })
    ));

    let mut gappy = dates.clone();
    gappy.remove(100);
    assert!(matches!(
        detect(&gappy, &temps[1..], &MhwParams::default()),
        Err(AcdError::InvalidTime { .. })
    ));
}

#[test]
fn test_category_from_ratio() {
    assert_eq!(Category::from_ratio(1.2), Category::Moderate);
    assert_eq!(Category::from_ratio(2.0), Category::Strong);
    assert_eq!(Category::from_ratio(3.9), Category::Severe);
    assert_eq!(Category::from_ratio(7.0), Category::Extreme);
    assert_eq!(Category::from_ratio(f64::INFINITY), Category::Extreme);
    assert_eq!(Category::from_ratio(f64::NAN), Category::Moderate);
    assert_eq!(Category::Severe.to_string(), "Severe");
}

#[test]
fn test_leap_day_of_year() {
    assert_eq!(leap_day_of_year(date(2001, 1, 1)), 1);
    assert_eq!(leap_day_of_year(date(2001, 2, 28)), 59);
    assert_eq!(leap_day_of_year(date(2000, 2, 29)), 60);
    assert_eq!(leap_day_of_year(date(2001, 3, 1)), 61);
    assert_eq!(leap_day_of_year(date(2000, 3, 1)), 61);
    assert_eq!(leap_day_of_year(date(2001, 12, 31)), 366);
    assert_eq!(leap_day_of_year(date(2000, 12, 31)), 366);
}

#[test]
fn test_percentile_and_running_mean() {
    assert!((nan_percentile(&[5.0, 1.0, 3.0, 2.0, 4.0], 90.0) - 4.6).abs() < 1e-12);
    assert_eq!(nan_percentile(&[f64::NAN, 2.0], 50.0), 2.0);
    assert!(nan_percentile(&[f64::NAN], 50.0).is_nan());

    assert_eq!(periodic_running_mean(&[1.0, 2.0, 3.0], 3), vec![2.0, 2.0, 2.0]);
    // wraps around the ends
    let smoothed = periodic_running_mean(&[3.0, 0.0, 0.0, 0.0, 0.0, 0.0], 3);
    assert_eq!(smoothed[0], 1.0);
    assert_eq!(smoothed[5], 1.0);
    assert_eq!(smoothed[2], 0.0);
}

#[test]
fn test_decode_cf_time() -> Result<()> {
    let dates = decode_cf_time(&[0.0, 31.0, 59.0, 60.0], "days since 2000-01-01", None)?;
    assert_eq!(
        dates,
        vec![date(2000, 1, 1), date(2000, 2, 1), date(2000, 2, 29), date(2000, 3, 1)]
    );

    let dates = decode_cf_time(
        &[0.0, 24.0, 47.0],
        "hours since 1990-01-01 00:00:00",
        Some("proleptic_gregorian"),
    )?;
    assert_eq!(dates, vec![date(1990, 1, 1), date(1990, 1, 2), date(1990, 1, 2)]);

    let dates = decode_cf_time(&[0.0, 58.0, 59.0, 365.0], "days since 2001-01-01", Some("noleap"))?;
    assert_eq!(
        dates,
        vec![date(2001, 1, 1), date(2001, 2, 28), date(2001, 3, 1), date(2002, 1, 1)]
    );
    // a no-leap axis over a leap year skips Feb 29 and is still daily
    let noleap = decode_cf_time(&[58.0, 59.0], "days since 2000-01-01", Some("365_day"))?;
    assert_eq!(noleap, vec![date(2000, 2, 28), date(2000, 3, 1)]);
    check_daily(&noleap)?;

    for (units, calendar) in [
        ("days since 2000-01-01", Some("360_day")),
        ("days after 2000-01-01", None),
        ("fortnights since 2000-01-01", None),
        ("days since yesterday", None),
    ] {
        assert!(
            matches!(decode_cf_time(&[0.0], units, calendar), Err(AcdError::InvalidTime { .. })),
            "{} / {:?} must be rejected",
            units,
            calendar
        );
    }
    assert!(decode_cf_time(&[f64::NAN], "days since 2000-01-01", None).is_err());
    Ok(())
}

#[test]
fn test_read_time_axis_and_summary() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("sst.nc");
    let dates = daily_dates();
    let days: Vec<f64> = (0..dates.len()).map(|i| i as f64).collect();
    let temps = baseline(dates.len());
    common::write_time_series(&path, &days, "days since 1990-01-01", Some("standard"), &temps);

    let decoded = read_time_axis(&path, "time")?;
    assert_eq!(decoded, dates);

    // one ocean column with an event, one land column
    let start = index_of(&dates, date(2005, 7, 1));
    let mut ocean = temps.clone();
    ocean[start..start + EVENT.len()].copy_from_slice(&EVENT);
    let data = Array2::from_shape_fn((dates.len(), 2), |(t, k)| {
        if k == 0 {
            ocean[t]
        } else {
            f64::NAN
        }
    })
    .into_dyn();
    let da = LabeledArray::new("sst", vec!["time".to_string(), "lon".to_string()], data)?
        .with_coord("lon", Coordinate::Numeric(vec![180.0, 181.0]))?
        .with_attr("units", "degC");

    let ds = mhw_summary(&da, "time", &decoded, &MhwParams::default())?;
    let count = ds.variable("mhw_count")?;
    assert_eq!(count.dims, vec!["lon".to_string()]);
    assert_eq!(count.data[[0]], 1.0);
    assert!(count.data[[1]].is_nan(), "land columns are NaN");

    let days = ds.variable("mhw_total_days")?;
    assert_eq!(days.data[[0]], 10.0);
    assert_eq!(days.attrs.get("units"), Some(&AttrValue::Str("days".to_string())));

    let max = ds.variable("mhw_max_intensity")?;
    assert!(max.data[[0]] > 1.0);
    assert_eq!(max.attrs.get("units"), Some(&AttrValue::Str("degC".to_string())));
    assert_eq!(ds.attrs.get("mhw_percentile"), Some(&AttrValue::Num(90.0)));

    match mhw_summary(&da, "day", &decoded, &MhwParams::default()) {
        Err(AcdError::DimensionNotFound { dim, .. }) => assert_eq!(dim, "day"),
        other => panic!("Expected DimensionNotFound, got {:?}", other.map(|ds| ds.len())),
    }
    Ok(())
}
