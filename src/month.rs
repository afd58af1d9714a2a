use chrono::{DateTime, Datelike, Duration, NaiveDate};
use chrono_tz::Tz;

/// A canonical calendar-month window: `[start, end)`.
///
/// The exclusive end is always the 1st of the following month, so range
/// queries never double-count or drop a day across month lengths or leap
/// years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MonthWindow {
    pub(crate) year: i32,
    pub(crate) month: u32,
    /// First day of the month, inclusive.
    pub(crate) start: NaiveDate,
    /// First day of the following month, exclusive.
    pub(crate) end: NaiveDate,
}

impl MonthWindow {
    pub(crate) fn of(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
        Some(Self {
            year,
            month,
            start,
            end,
        })
    }

    /// The window containing a calendar date.
    pub(crate) fn containing(date: NaiveDate) -> Self {
        // The 1st of any valid date's month always exists.
        Self::of(date.year(), date.month()).unwrap_or(Self {
            year: date.year(),
            month: date.month(),
            start: date,
            end: date,
        })
    }

    /// The window containing a timezone-aware instant, resolved in that
    /// instant's timezone. Pure; no clock access.
    pub(crate) fn for_instant(instant: DateTime<Tz>) -> Self {
        Self::containing(instant.date_naive())
    }

    pub(crate) fn days_in_month(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub(crate) fn last_day(&self) -> NaiveDate {
        self.end - Duration::days(1)
    }

    pub(crate) fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub(crate) fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    /// (year, month) of the preceding calendar month.
    pub(crate) fn prev(&self) -> (i32, u32) {
        if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        }
    }

    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// ISO Monday–Sunday week containing `date`, both bounds inclusive.
pub(crate) fn week_window(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let since_monday = date.weekday().num_days_from_monday() as i64;
    let monday = date - Duration::days(since_monday);
    (monday, monday + Duration::days(6))
}

/// `YYYY-MM-DD` without time-of-day; the canonical boundary format.
pub(crate) fn date_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
