//! Upstream time windows for each intent. All windows are UTC.

use chrono::{DateTime, Datelike as _, Days, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::QueryError;

/// An inclusive `[start, end]` time window.
pub type Window = (DateTime<Utc>, DateTime<Utc>);

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    midnight(date) + TimeDelta::seconds(86_399)
}

/// January 1st of the current year, 00:00:00, through `now`.
#[must_use]
pub fn year_to_date(now: DateTime<Utc>) -> Window {
    let today = now.date_naive();
    let jan_first = today - Days::new(u64::from(today.ordinal0()));
    (midnight(jan_first), now)
}

/// Today from 00:00:00 to 23:59:59.
#[must_use]
pub fn today(now: DateTime<Utc>) -> Window {
    let date = now.date_naive();
    (midnight(date), end_of_day(date))
}

/// The seven days before `now`.
#[must_use]
pub fn last_week(now: DateTime<Utc>) -> Window {
    (now - TimeDelta::days(7), now)
}

/// First day of the month 00:00:00 through first day of the next month
/// 00:00:00.
///
/// # Errors
///
/// Returns [`QueryError::Validation`] if the year/month pair is not
/// representable.
pub fn month(year: i32, month: u32) -> Result<Window, QueryError> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1);
    match (first, next) {
        (Some(first), Some(next)) => Ok((midnight(first), midnight(next))),
        _ => Err(QueryError::validation(
            "month",
            format!("{year}-{month:02} is not a valid month"),
        )),
    }
}

/// `start` 00:00:00 through `end` 23:59:59.
///
/// # Errors
///
/// Returns [`QueryError::Validation`] if `start` is after `end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Result<Window, QueryError> {
    if start > end {
        return Err(QueryError::validation(
            "startdate",
            format!("startdate ({start}) must not be after enddate ({end})"),
        ));
    }
    Ok((midnight(start), end_of_day(end)))
}
