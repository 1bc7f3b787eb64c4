//! Calendar date helpers. Report bounds are whole days in UTC.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Serialize, Serializer};

use crate::error::{LedgerError, LedgerResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Serialize NaiveDate as "YYYY-MM-DD". Used with `#[serde(serialize_with = ...)]`.
pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    format_date(*date).serialize(serializer)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a "YYYY-MM-DD" request field; errors name the field.
pub fn parse_date(value: &str, field: &'static str) -> LedgerResult<NaiveDate> {
    if !is_iso_date_shape(value) {
        return Err(LedgerError::InvalidDateFormat { field });
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| LedgerError::InvalidDateFormat { field })
}

/// Exactly four, two and two ASCII digits separated by `-`. chrono alone
/// accepts unpadded fields, signs and leading whitespace.
fn is_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// 00:00:00 UTC of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

/// 00:00:00 UTC of the following day; `None` past the last representable date.
pub fn start_of_next_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.succ_opt().map(start_of_day)
}
