use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parses a wire date into a calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the day is taken in the
/// timestamp's own offset) and naive `YYYY-MM-DDTHH:MM:SS[.fff]`.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

/// `YYYY-MM-DD`
pub fn iso_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
