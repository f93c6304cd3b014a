//! Date normalization for search criteria.
//!
//! Criteria arrive as loosely typed strings. Anything that does not parse
//! under the expected format is reported as `None` so the caller can treat
//! the bound as unset instead of failing the request.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Calendar date format used for production dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical timestamp format used for availability bounds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ISO_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a production date (`YYYY-MM-DD`).
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok()
}

/// Parse an availability bound.
///
/// The canonical form is `YYYY-MM-DD HH:MM:SS`. ISO-8601 inputs with a `T`
/// separator are accepted as well; inputs carrying an offset are converted
/// to UTC. A bare date resolves to midnight UTC.
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();

    NaiveDateTime::parse_from_str(input, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(input, ISO_TIMESTAMP_FORMAT))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .or_else(|| parse_date(input).map(|d| d.and_time(NaiveTime::MIN)))
}
