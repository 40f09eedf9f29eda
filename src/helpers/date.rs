//! Date parsing and formatting helpers

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt::Write;

/// Display format used for post dates ("January 05, 2024")
pub const LONG_DATE: &str = "%B %d, %Y";

/// Parse a front-matter date. Any time of day is dropped.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // RFC 3339 / ISO 8601 with offset
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Format a date with either a strftime pattern, a Moment.js pattern, or `LL`.
///
/// Returns `None` when the pattern contains an unknown specifier.
pub fn format_date(date: NaiveDate, format: &str) -> Option<String> {
    let pattern = if format == "LL" {
        LONG_DATE.to_string()
    } else if format.contains('%') {
        format.to_string()
    } else {
        moment_to_chrono_format(format)
    };

    let mut out = String::new();
    write!(out, "{}", date.format(&pattern)).ok()?;
    Some(out)
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();
    for (from, to) in replacements {
        result = result.replace(from, to);
    }
    result
}
