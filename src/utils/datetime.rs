use chrono::{DateTime, NaiveDate, NaiveDateTime};

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a punch timestamp as a local wall-clock time.
///
/// RFC 3339 values keep the wall-clock part they were written with, so a
/// `09:50+06:00` punch stays `09:50` instead of being shifted to UTC.
/// Blank or unparseable input gives `None`.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    // fractional seconds, e.g. "2024-06-10 09:50:12.000"
    let value = value.split('.').next().unwrap_or(value);

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Parse a calendar date. A full timestamp is accepted and truncated to its date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(value).map(|dt| dt.date()))
}

/// Local-date key used for every calendar lookup.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
