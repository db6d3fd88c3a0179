//! Calendar arithmetic for deadline prediction.
//!
//! All date math in the crate goes through these helpers so that short-month
//! clamping and fiscal-calendar conventions are applied in exactly one place.

use chrono::{Datelike, NaiveDate};

/// Number of days in a given month, accounting for leap years.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Clamp a day-of-month to the last valid day of the given month.
///
/// A historical typical-day of 31 predicted into April yields 30; a
/// typical-day of 30 predicted into February yields 28 (29 in leap years).
/// Invalid dates are never produced.
pub fn clamp_day(year: i32, month: u32, day: u32) -> u32 {
    day.max(1).min(days_in_month(year, month))
}

/// Build a date from year/month/day, clamping the day to the month length.
pub fn date_clamped(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, clamp_day(year, month, day))
}

/// U.S. federal fiscal quarter (1-4) for a calendar date.
///
/// The federal fiscal year runs October through September:
/// Q1 = Oct-Dec, Q2 = Jan-Mar, Q3 = Apr-Jun, Q4 = Jul-Sep.
pub fn fiscal_quarter(date: NaiveDate) -> u8 {
    match date.month() {
        10..=12 => 1,
        1..=3 => 2,
        4..=6 => 3,
        _ => 4,
    }
}

/// U.S. federal fiscal year for a calendar date.
///
/// Dates in October or later belong to the next fiscal year.
pub fn fiscal_year(date: NaiveDate) -> i32 {
    if date.month() >= 10 {
        date.year() + 1
    } else {
        date.year()
    }
}

/// Middle calendar month of a federal fiscal quarter.
pub fn fiscal_quarter_mid_month(quarter: u8) -> u32 {
    match quarter {
        1 => 11,
        2 => 2,
        3 => 5,
        _ => 8,
    }
}

/// Day-of-year (1-366) for a date.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Add whole months to a date, clamping the day to the target month length.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.month0() + months;
    let year = date.year() + (total / 12) as i32;
    let month = total % 12 + 1;
    // clamp_day keeps the result valid, so construction cannot fail
    NaiveDate::from_ymd_opt(year, month, clamp_day(year, month, date.day()))
        .unwrap_or(date)
}
