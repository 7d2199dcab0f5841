//! Pure helpers shared by the sync and render layers.

use chrono::{Datelike, Local, NaiveDate};
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::types::Day;

/// `YYYY-MM-DD`, the form used in document ids and queries.
pub fn format_iso(date: Day) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_iso(s: &str) -> Result<Day, CoreError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::Validation(format!("Invalid date '{s}', expected YYYY-MM-DD")))
}

/// Human-facing form, e.g. `Wed, May 1 2024`.
pub fn format_display(date: Day) -> String {
    date.format("%a, %b %-d %Y").to_string()
}

/// First and last day of the given month.
pub fn month_bounds(year: i32, month: u32) -> Result<(Day, Day), CoreError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CoreError::Validation(format!("Invalid month {year}-{month:02}")))?;
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let last = NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| CoreError::Validation(format!("Invalid month {year}-{month:02}")))?;
    Ok((first, last))
}

/// Today in the local timezone.
pub fn today() -> Day {
    Local::now().date_naive()
}

/// Whether `date` falls in `year`/`month`.
pub fn in_month(date: Day, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

/// Stable colour for an exercise name, as a CSS `hsl()` value.
///
/// Case and surrounding whitespace are ignored so "Squat" and " squat"
/// share a colour.
pub fn exercise_colour(name: &str) -> String {
    let normalised = name.trim().to_lowercase();
    let digest = Sha256::digest(normalised.as_bytes());
    let hue = u16::from_be_bytes([digest[0], digest[1]]) % 360;
    format!("hsl({hue}, 65%, 55%)")
}
