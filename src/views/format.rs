//! Date and time formatting for the pages and forms
//!
//! All display happens in one configured fixed UTC offset.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

/// `datetime-local` input format
const DATETIME_LOCAL: &str = "%Y-%m-%dT%H:%M";

/// Offset from minutes east of UTC, falling back to UTC when out of range
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes * 60).unwrap_or_else(utc)
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// `"UTC"`, `"UTC+05:30"`, `"UTC-08:00"`
pub fn zone_label(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    if seconds == 0 {
        return "UTC".to_string();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("UTC{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

/// Admin card date and time span: `("Mon, Jan 15", "6:00 PM - 8:00 PM")`
pub fn format_event_date(start: DateTime<Utc>, end: DateTime<Utc>, offset: FixedOffset) -> (String, String) {
    let start = start.with_timezone(&offset);
    let end = end.with_timezone(&offset);
    (
        start.format("%a, %b %-d").to_string(),
        format!("{} - {}", start.format("%-I:%M %p"), end.format("%-I:%M %p")),
    )
}

/// Full timestamp: `"Wed, Jan 15, 2025, 6:00 PM UTC"`
pub fn format_date_time(value: DateTime<Utc>, offset: FixedOffset) -> String {
    format!(
        "{} {}",
        value.with_timezone(&offset).format("%a, %b %-d, %Y, %-I:%M %p"),
        zone_label(offset)
    )
}

/// Date only: `"Wed, Jan 15, 2025"`
pub fn format_date(value: DateTime<Utc>, offset: FixedOffset) -> String {
    value.with_timezone(&offset).format("%a, %b %-d, %Y").to_string()
}

/// Date badge: `("Jan", 15)`
pub fn month_day(value: DateTime<Utc>, offset: FixedOffset) -> (String, u32) {
    let local = value.with_timezone(&offset);
    (local.format("%b").to_string(), chrono::Datelike::day(&local))
}

pub fn is_same_day(start: DateTime<Utc>, end: DateTime<Utc>, offset: FixedOffset) -> bool {
    start.with_timezone(&offset).date_naive() == end.with_timezone(&offset).date_naive()
}

/// Value for a `datetime-local` input, e.g. `"2025-01-15T18:00"`
pub fn format_datetime_local(value: DateTime<Utc>, offset: FixedOffset) -> String {
    value.with_timezone(&offset).format(DATETIME_LOCAL).to_string()
}

/// Parse a submitted datetime: `datetime-local` in `offset`, or RFC 3339
pub fn parse_form_datetime(value: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, DATETIME_LOCAL)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}
