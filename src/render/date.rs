//! Timestamp conversion for feed output.

use chrono::{DateTime, Utc};

/// Format the search API uses for `created_at`.
const UPSTREAM_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// RFC 822 date as used by `pubDate` and `lastBuildDate`.
const RFC822_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Parse an upstream creation timestamp.
///
/// Accepts the API's native format as well as RFC 3339 and RFC 2822.
pub fn parse_created_at(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_str(value, UPSTREAM_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a timestamp as an RFC 822 date in GMT.
pub fn to_rfc822(dt: &DateTime<Utc>) -> String {
    dt.format(RFC822_FORMAT).to_string()
}
