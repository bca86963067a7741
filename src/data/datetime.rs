use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Sentinel value returned by `detect_date_format` when the column contains
/// RFC 3339 / ISO 8601 timestamps (e.g. `2017-10-31T00:00:00Z`).
pub const RFC3339_FORMAT: &str = "__rfc3339__";

/// Display format for date labels.
pub const LABEL_FORMAT: &str = "%d/%m/%Y";

/// Day-first formats come before month-first ones; the source data is day-first.
pub const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Detect the most likely date format from a sample of string values.
/// Returns the format with the highest parse success rate.
pub fn detect_date_format<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<&'static str> {
    let sample: Vec<&str> = values
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(100)
        .collect();

    if sample.is_empty() {
        return None;
    }

    let rfc3339_valid = sample
        .iter()
        .filter(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok())
        .count();

    let mut best_format: Option<&'static str> = None;
    let mut best_score = rfc3339_valid;
    if rfc3339_valid > 0 {
        best_format = Some(RFC3339_FORMAT);
    }

    for &fmt in DATE_FORMATS {
        let valid = sample.iter().filter(|s| parse_date(s, fmt).is_some()).count();
        if valid > best_score {
            best_score = valid;
            best_format = Some(fmt);
        }
    }

    best_format
}

/// Parse a value to a calendar date using the given format. Time-of-day is dropped.
pub fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if format == RFC3339_FORMAT {
        return chrono::DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.date_naive());
    }

    NaiveDate::parse_from_str(value, format)
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(value, format).ok().map(|dt| dt.date()))
}

/// Continuous day coordinate used by scales and hover search.
pub fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of `day_number`, rounding to the nearest whole day.
pub fn from_day_number(day: f64) -> Option<NaiveDate> {
    if !day.is_finite() {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(day.round() as i32)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(LABEL_FORMAT).to_string()
}
