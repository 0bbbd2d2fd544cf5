//! age.rs
//!
//! Calendar arithmetic behind the age form: Gregorian leap years, month
//! lengths, and the human-readable difference
//!     "X anos, Y meses e Z dias"
//! between a birth date and today.
//!
//! Chrono does not provide a built-in year/month/day diff (unlike Python’s
//! relativedelta), so we implement the calendar-aware borrowing rules manually.
//!
//! This logic correctly handles:
//!   • month underflow (borrowing from years)
//!   • day underflow (borrowing from previous month)
//!   • leap years
//!   • varying month lengths, including a birth day past the end of the
//!     borrowed month (Jan 31 → Mar 1)

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("invalid month {0} (must be 1-12)")]
    InvalidMonth(u32),
    #[error("invalid day {day} for {year:04}-{month:02} (max {max})")]
    InvalidDay { year: i32, month: u32, day: u32, max: u32 },
    #[error("invalid year {0} (must not be negative)")]
    InvalidYear(i32),
    #[error("date range is reversed: {from} is after {to}")]
    Reversed { from: CalendarDate, to: CalendarDate },
}

/// A validated Gregorian calendar date.
///
/// Field order matters: the derived `Ord` compares year, then month, then day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CalendarDate {
    year: i32,
    month: u32,
    day: u32,
}

impl CalendarDate {
    pub const EPOCH: Self = Self {
        year: 1970,
        month: 1,
        day: 1,
    };

    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        if year < 0 {
            return Err(CalendarError::InvalidYear(year));
        }
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        let max = max_days_in_month(month, year);
        if day < 1 || day > max {
            return Err(CalendarError::InvalidDay {
                year,
                month,
                day,
                max,
            });
        }
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Chrono view of this date. `None` only for years chrono cannot represent.
    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    pub fn from_naive(date: NaiveDate) -> Result<Self, CalendarError> {
        Self::new(date.year(), date.month(), date.day())
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Elapsed years/months/days between two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DateDifference {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl DateDifference {
    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    /// Re-adds this difference to `from`: whole months first (the day is
    /// clamped to the target month's length), then the remaining days.
    pub fn apply_to(&self, from: CalendarDate) -> Option<CalendarDate> {
        let total_months = self.years.checked_mul(12)?.checked_add(self.months)?;
        let date = from
            .to_naive()?
            .checked_add_months(Months::new(total_months))?
            .checked_add_days(Days::new(u64::from(self.days)))?;
        CalendarDate::from_naive(date).ok()
    }
}

impl fmt::Display for DateDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, {} {} e {} {}",
            self.years,
            plural(self.years, "ano", "anos"),
            self.months,
            plural(self.months, "mês", "meses"),
            self.days,
            plural(self.days, "dia", "dias")
        )
    }
}

fn plural(n: u32, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 { one } else { many }
}

/// Years, months and days elapsed from `from` to `to` (`from <= to`).
pub fn difference_ymd(from: CalendarDate, to: CalendarDate) -> Result<DateDifference, CalendarError> {
    if from > to {
        return Err(CalendarError::Reversed { from, to });
    }

    let mut years = to.year - from.year;
    let mut months = to.month as i32 - from.month as i32;
    let mut days = to.day as i32 - from.day as i32;

    // Fix day underflow
    if days < 0 {
        months -= 1;

        // Determine the previous month relative to `to`.
        let (prev_year, prev_month) = if to.month == 1 {
            (to.year - 1, 12)
        } else {
            (to.year, to.month - 1)
        };

        // A birth day past the end of that month counts from its last day.
        let days_in_prev_month = max_days_in_month(prev_month, prev_year) as i32;
        days = days_in_prev_month - (from.day as i32).min(days_in_prev_month) + to.day as i32;
    }

    // Fix month underflow
    if months < 0 {
        years -= 1;
        months += 12;
    }

    Ok(DateDifference {
        years: years as u32,
        months: months as u32,
        days: days as u32,
    })
}

/// Returns number of days in a given month/year (handles leap years).
///
/// Months outside 1-12 are the caller's problem; they get 31 so the
/// function stays total.
pub fn max_days_in_month(month: u32, year: i32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

/// Leap-year rule (Gregorian):
///   - divisible by 4 → leap year
///   - except divisible by 100 → not leap year
///   - except divisible by 400 → leap year
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
