//! Month/week/day navigation over the calendar.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::MONTH_GRID_DAYS;
use crate::date_range::DateRange;
use crate::error::LeadcalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Month,
    Week,
    Day,
}

impl FromStr for Granularity {
    type Err = LeadcalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(Granularity::Month),
            "week" => Ok(Granularity::Week),
            "day" => Ok(Granularity::Day),
            _ => Err(LeadcalError::Validation(format!(
                "Unknown view '{}'. Expected month, week or day",
                s
            ))),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Month => f.write_str("month"),
            Granularity::Week => f.write_str("week"),
            Granularity::Day => f.write_str("day"),
        }
    }
}

/// Inclusive range of calendar days currently in view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisibleRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl VisibleRange {
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// The instant window to fetch events for, with day boundaries in `tz`.
    pub fn to_date_range(&self, tz: &Tz) -> DateRange {
        DateRange::for_days(self.start, self.end, tz)
    }
}

/// Reference date plus view granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationCursor {
    pub reference_date: NaiveDate,
    pub granularity: Granularity,
}

impl NavigationCursor {
    pub fn new(reference_date: NaiveDate, granularity: Granularity) -> Self {
        NavigationCursor {
            reference_date,
            granularity,
        }
    }

    /// Cursor on today's date (local clock).
    pub fn today(granularity: Granularity) -> Self {
        NavigationCursor::new(Local::now().date_naive(), granularity)
    }

    #[must_use]
    pub fn next(self) -> Self {
        self.step(1)
    }

    #[must_use]
    pub fn previous(self) -> Self {
        self.step(-1)
    }

    #[must_use]
    pub fn with_granularity(self, granularity: Granularity) -> Self {
        NavigationCursor {
            granularity,
            ..self
        }
    }

    #[must_use]
    pub fn go_to(self, reference_date: NaiveDate) -> Self {
        NavigationCursor {
            reference_date,
            ..self
        }
    }

    #[must_use]
    pub fn go_to_today(self) -> Self {
        self.go_to(Local::now().date_naive())
    }

    /// Move by `units` of the current granularity (negative moves back).
    ///
    /// Month steps keep the day of month, clamped to the target month's length
    /// (Jan 31 + 1 month = Feb 28/29).
    #[must_use]
    pub fn step(self, units: i32) -> Self {
        let date = self.reference_date;
        let moved = match self.granularity {
            Granularity::Month => {
                let months = Months::new(units.unsigned_abs());
                if units >= 0 {
                    date.checked_add_months(months)
                } else {
                    date.checked_sub_months(months)
                }
            }
            Granularity::Week => date.checked_add_signed(Duration::weeks(units.into())),
            Granularity::Day => date.checked_add_signed(Duration::days(units.into())),
        };

        // Only fails at the edges of the representable calendar
        self.go_to(moved.unwrap_or(date))
    }

    /// The days in view.
    ///
    /// - month: 42-cell grid starting on the Sunday on/before the 1st
    /// - week: Sunday through Saturday around the reference date
    /// - day: the reference date
    pub fn visible_range(&self) -> VisibleRange {
        match self.granularity {
            Granularity::Month => {
                let first = self.reference_date.with_day(1).unwrap_or(self.reference_date);
                let start = sunday_on_or_before(first);
                VisibleRange {
                    start,
                    end: start + Duration::days(MONTH_GRID_DAYS - 1),
                }
            }
            Granularity::Week => {
                let start = sunday_on_or_before(self.reference_date);
                VisibleRange {
                    start,
                    end: start + Duration::days(6),
                }
            }
            Granularity::Day => VisibleRange {
                start: self.reference_date,
                end: self.reference_date,
            },
        }
    }
}

fn sunday_on_or_before(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday().into())
}
