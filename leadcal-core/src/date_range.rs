//! Date range for fetching events.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::constants::DEFAULT_SYNC_DAYS;
use crate::error::{LeadcalError, LeadcalResult};
use crate::event::local_midnight;

/// Date range for filtering events.
/// None values mean unbounded in that direction.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Default for DateRange {
    /// Default range: ±DEFAULT_SYNC_DAYS from now
    fn default() -> Self {
        DateRange::around(Utc::now(), DEFAULT_SYNC_DAYS)
    }
}

impl DateRange {
    /// Range of `days` in each direction around `center`.
    pub fn around(center: DateTime<Utc>, days: i64) -> Self {
        DateRange {
            from: Some(center - Duration::days(days)),
            to: Some(center + Duration::days(days)),
        }
    }

    /// Inclusive range of calendar days, from the start of `first` to the
    /// end of `last` as seen in `tz`.
    pub fn for_days(first: NaiveDate, last: NaiveDate, tz: &Tz) -> Self {
        DateRange {
            from: Some(local_midnight(first, tz)),
            to: Some(local_midnight(last + Duration::days(1), tz) - Duration::seconds(1)),
        }
    }

    /// Get `from` as RFC3339 string, using the Unix epoch if unbounded.
    pub fn from_rfc3339(&self) -> String {
        self.from.unwrap_or(DateTime::UNIX_EPOCH).to_rfc3339()
    }

    /// Get `to` as RFC3339 string, using a far future date if unbounded.
    pub fn to_rfc3339(&self) -> String {
        self.to
            .unwrap_or_else(|| Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).single().unwrap_or(DateTime::<Utc>::MAX_UTC))
            .to_rfc3339()
    }
}

/// Parse YYYY-MM-DD
pub fn parse_date(s: &str) -> LeadcalResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        LeadcalError::Validation(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_days_covers_whole_local_days() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let first = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let last = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();

        let range = DateRange::for_days(first, last, &tz);

        assert_eq!(range.from_rfc3339(), "2025-01-05T05:00:00+00:00");
        assert_eq!(range.to_rfc3339(), "2025-01-12T04:59:59+00:00");
    }
}
