// ISO-8601 helpers for due dates and creation timestamps

use crate::error::StoreError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current time as UTC ISO-8601 with millisecond precision
pub fn now_iso() -> String {
    to_iso(Utc::now())
}

/// Today's calendar day in the local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn to_iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// ISO-8601 instant of local midnight on `day`
///
/// Returns an empty string if local midnight does not exist on that day.
pub fn local_midnight_iso(day: NaiveDate) -> String {
    day.and_hms_opt(0, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| to_iso(local.with_timezone(&Utc)))
        .unwrap_or_default()
}

/// Normalise user due-date input to UTC ISO-8601
///
/// Accepts an empty string (no due date), `YYYY-MM-DD` (local midnight),
/// `YYYY-MM-DDTHH:MM[:SS]` (local time) or RFC 3339.
pub fn normalize_due(input: &str) -> Result<String, StoreError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(String::new());
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(to_iso(at.with_timezone(&Utc)));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| to_iso(local.with_timezone(&Utc)))
                .ok_or_else(|| StoreError::InvalidDue(input.to_string()));
        }
    }

    if let Ok(day) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        let iso = local_midnight_iso(day);
        if !iso.is_empty() {
            return Ok(iso);
        }
    }

    Err(StoreError::InvalidDue(input.to_string()))
}

/// Calendar day of a due value in the local time zone
///
/// RFC 3339 instants are shifted to local time first; naive dates and
/// date-times are taken as local already. Empty or unparseable values have
/// no day.
pub fn due_day(due: &str) -> Option<NaiveDate> {
    due_day_in(due, &Local)
}

pub(crate) fn due_day_in<Tz: TimeZone>(due: &str, tz: &Tz) -> Option<NaiveDate> {
    let due = due.trim();
    if due.is_empty() {
        return None;
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(due) {
        return Some(at.with_timezone(tz).date_naive());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(due, format).ok())
        .map(|naive| naive.date())
        .or_else(|| NaiveDate::parse_from_str(due, DATE_FORMAT).ok())
}

/// Parse a `createdAt` timestamp; malformed values yield `None`
pub fn parse_created(created_at: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(created_at.trim())
        .ok()
        .map(|at| at.with_timezone(&Utc))
}
