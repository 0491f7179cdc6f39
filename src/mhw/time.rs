//! CF time decoding and the leap-year day-of-year used by the climatology

use crate::errors::{AcdError, Result};
use crate::netcdf_io::variable_attributes;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use std::path::Path;

/// Day of year on a 366-day calendar: Feb 29 is always day 60, so
/// March 1 is day 61 whether or not the year is a leap year.
pub fn leap_day_of_year(date: NaiveDate) -> usize {
    let ordinal = date.ordinal() as usize;
    if date.leap_year() || ordinal < 60 {
        ordinal
    } else {
        ordinal + 1
    }
}

/// Calendars the decoder understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    /// `standard`, `gregorian` and `proleptic_gregorian`
    Gregorian,
    /// `noleap` and `365_day`
    NoLeap,
}

impl Calendar {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "standard" | "gregorian" | "proleptic_gregorian" => Ok(Calendar::Gregorian),
            "noleap" | "365_day" => Ok(Calendar::NoLeap),
            other => Err(AcdError::InvalidTime {
                message: format!("unsupported calendar '{}'", other),
            }),
        }
    }
}

/// Parsed `"<unit> since <reference>"` string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    pub seconds_per_unit: f64,
    pub reference: NaiveDateTime,
}

impl TimeUnits {
    pub fn parse(units: &str) -> Result<Self> {
        let invalid = |message: String| AcdError::InvalidTime { message };
        let (unit, reference) = units
            .split_once(" since ")
            .ok_or_else(|| invalid(format!("time units '{}' lack 'since'", units)))?;

        let seconds_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
            "days" | "day" | "d" => 86_400.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3_600.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            other => return Err(invalid(format!("unsupported time unit '{}'", other))),
        };

        let reference = reference.trim().trim_end_matches('Z');
        let (date_part, time_part) = match reference.split_once(|c| c == ' ' || c == 'T') {
            Some((d, t)) => (d, Some(t.trim())),
            None => (reference, None),
        };
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|e| invalid(format!("bad reference date '{}': {}", date_part, e)))?;
        let time = match time_part {
            None | Some("") => NaiveTime::MIN,
            Some(t) => NaiveTime::parse_from_str(t, "%H:%M:%S%.f")
                .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
                .map_err(|e| invalid(format!("bad reference time '{}': {}", t, e)))?,
        };

        Ok(Self {
            seconds_per_unit,
            reference: date.and_time(time),
        })
    }
}

const NOLEAP_MONTH_STARTS: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

fn noleap_offset(reference: NaiveDate, days: i64) -> Option<NaiveDate> {
    let start =
        NOLEAP_MONTH_STARTS[reference.month0() as usize] as i64 + reference.day() as i64 - 1;
    let total = start + days;
    let year = reference.year() + total.div_euclid(365) as i32;
    let day_in_year = total.rem_euclid(365) as u32;
    let month0 = NOLEAP_MONTH_STARTS
        .iter()
        .rposition(|&s| s <= day_in_year)
        .unwrap_or(0);
    let day = day_in_year - NOLEAP_MONTH_STARTS[month0] + 1;
    NaiveDate::from_ymd_opt(year, month0 as u32 + 1, day)
}

/// Decode numeric CF time values into dates
///
/// # Errors
///
/// Returns [`AcdError::InvalidTime`] for unparseable units, unsupported
/// calendars, non-finite values or dates out of range.
pub fn decode_cf_time(
    values: &[f64],
    units: &str,
    calendar: Option<&str>,
) -> Result<Vec<NaiveDate>> {
    let units = TimeUnits::parse(units)?;
    let calendar = Calendar::parse(calendar.unwrap_or("standard"))?;
    let out_of_range = |v: f64| AcdError::InvalidTime {
        message: format!("time value {} cannot be represented as a date", v),
    };

    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return Err(out_of_range(v));
            }
            let seconds = v * units.seconds_per_unit;
            match calendar {
                Calendar::Gregorian => {
                    let delta = TimeDelta::try_milliseconds((seconds * 1000.0).round() as i64)
                        .ok_or_else(|| out_of_range(v))?;
                    units
                        .reference
                        .checked_add_signed(delta)
                        .map(|dt| dt.date())
                        .ok_or_else(|| out_of_range(v))
                }
                Calendar::NoLeap => {
                    let ref_seconds = units.reference.time().num_seconds_from_midnight() as f64;
                    let days = ((seconds + ref_seconds) / 86_400.0).floor() as i64;
                    noleap_offset(units.reference.date(), days).ok_or_else(|| out_of_range(v))
                }
            }
        })
        .collect()
}

/// Read and decode a time coordinate variable from a NetCDF file
pub fn read_time_axis(path: &Path, time_var: &str) -> Result<Vec<NaiveDate>> {
    let file = netcdf::open(path)?;
    let var = file
        .variable(time_var)
        .ok_or_else(|| AcdError::VariableNotFound {
            var: time_var.to_string(),
        })?;
    let values: Vec<f64> = var.get_values::<f64, _>(..)?;
    let attrs = variable_attributes(&file, time_var)?;
    let units = attrs
        .get("units")
        .map(|u| u.to_string())
        .ok_or_else(|| AcdError::InvalidTime {
            message: format!("'{}' has no units attribute", time_var),
        })?;
    let calendar = attrs.get("calendar").map(|c| c.to_string());
    decode_cf_time(&values, &units, calendar.as_deref())
}

/// Check that `dates` form a gap-free daily series.
///
/// Feb 28 followed by Mar 1 is accepted, so no-leap calendars pass.
pub fn check_daily(dates: &[NaiveDate]) -> Result<()> {
    for pair in dates.windows(2) {
        let step = (pair[1] - pair[0]).num_days();
        let skips_feb29 = step == 2
            && pair[0].month() == 2
            && pair[0].day() == 28
            && pair[1].month() == 3
            && pair[1].day() == 1;
        if step != 1 && !skips_feb29 {
            return Err(AcdError::InvalidTime {
                message: format!(
                    "time axis must be daily without gaps, found {} followed by {}",
                    pair[0], pair[1]
                ),
            });
        }
    }
    Ok(())
}
