use {
    crate::constants::HTTP_DATE_FORMAT,
    chrono::{
        format::{ParseError, ParseResult},
        offset::FixedOffset,
        DateTime, TimeZone, Utc,
    },
    lazy_static::lazy_static,
    std::str::FromStr,
};

lazy_static! {
    static ref INVALID: ParseError = DateTime::<FixedOffset>::from_str("").unwrap_err();
}

/// Render a timestamp as an RFC 1123 HTTP-date in GMT, e.g.
/// `Wed, 01 May 2019 14:00:00 GMT`. Sub-second precision is dropped.
pub(crate) fn format_http_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse the epoch-milliseconds rendering used by the `timestamp` query
/// parameter.
pub(crate) fn parse_epoch_millis(s: &str) -> ParseResult<DateTime<Utc>> {
    let millis = i64::from_str(s).map_err(|_| *INVALID)?;
    Utc.timestamp_millis_opt(millis).single().ok_or(*INVALID)
}

/// Truncate a timestamp to millisecond precision, the wire precision of the
/// `timestamp` query parameter.
pub(crate) fn truncate_to_millis(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(timestamp.timestamp_millis()).single().unwrap_or(timestamp)
}
