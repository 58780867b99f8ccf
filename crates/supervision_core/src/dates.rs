//! Calendar helpers shared by the lifecycle and report engines.
//!
//! Deadlines travel as `YYYY-MM-DD` strings and reporting periods as
//! `YYYY-MM` strings; everything here converts between those and
//! [`time::Date`].

use crate::error::AppError;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// Parses an ISO calendar date (`YYYY-MM-DD`).
pub fn parse_date(value: &str) -> Result<Date, AppError> {
    let trimmed = value.trim();
    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_date(format!("'{trimmed}' is not a YYYY-MM-DD date")))
}

/// Parses a reporting period (`YYYY-MM`) into the first day of that month.
pub fn parse_month(value: &str) -> Result<Date, AppError> {
    let trimmed = value.trim();
    Date::parse(
        &format!("{trimmed}-01"),
        format_description!("[year]-[month]-[day]"),
    )
    .map_err(|_| AppError::invalid_date(format!("'{trimmed}' is not a YYYY-MM month")))
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// The `YYYY-MM` reporting period containing `date`.
pub fn month_key(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

pub fn days_in_month(date: Date) -> u8 {
    date.month().length(date.year())
}

/// Today's date in the local offset, falling back to UTC when the offset
/// cannot be determined.
pub fn local_today() -> Date {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}

pub fn now_timestamp() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}
