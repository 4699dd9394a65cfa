pub mod delete;
pub mod derive;
pub mod events;
pub mod new;
pub mod range;
pub mod update;

use anyhow::Result;
use clap::Args;
use leadcal_core::aggregator::CalendarAggregator;
use leadcal_core::config::LeadcalConfig;
use leadcal_core::date_range::parse_date;
use leadcal_core::navigation::{Granularity, NavigationCursor};

use crate::render::{Render, render_remote_status};

/// Which window of the calendar to look at.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// month, week or day (defaults to default_view from config)
    #[arg(long)]
    pub view: Option<Granularity>,

    /// Date inside the view (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Move this many views forward, or back when negative
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub offset: i32,
}

impl ViewArgs {
    pub fn cursor(&self, config: &LeadcalConfig) -> Result<NavigationCursor> {
        let granularity = self.view.unwrap_or(config.default_view);
        let cursor = match self.date {
            Some(ref date) => NavigationCursor::new(parse_date(date)?, granularity),
            None => NavigationCursor::today(granularity),
        };
        Ok(cursor.step(self.offset))
    }
}

/// Print remote trouble and skipped records to stderr.
pub fn report_problems(aggregator: &CalendarAggregator) {
    if let Some(line) = render_remote_status(&aggregator.remote_status()) {
        eprintln!("{}", line);
    }
    for issue in aggregator.issues() {
        eprintln!("{}", issue.render(&aggregator.timezone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::Path;

    fn config() -> LeadcalConfig {
        LeadcalConfig::load_from(Path::new("/nonexistent/leadcal.toml")).unwrap()
    }

    #[test]
    fn test_cursor_from_date_and_offset() {
        let args = ViewArgs {
            view: Some(Granularity::Week),
            date: Some("2025-06-11".to_string()),
            offset: -1,
        };

        let cursor = args.cursor(&config()).unwrap();

        assert_eq!(cursor.granularity, Granularity::Week);
        assert_eq!(cursor.reference_date, NaiveDate::from_ymd_opt(2025, 6, 4).unwrap());
    }

    #[test]
    fn test_cursor_uses_default_view() {
        let args = ViewArgs {
            date: Some("2025-06-11".to_string()),
            ..Default::default()
        };

        let cursor = args.cursor(&config()).unwrap();

        assert_eq!(cursor.granularity, Granularity::Month);
    }

    #[test]
    fn test_cursor_rejects_bad_date() {
        let args = ViewArgs {
            date: Some("11/06/2025".to_string()),
            ..Default::default()
        };

        assert!(args.cursor(&config()).is_err());
    }
}
