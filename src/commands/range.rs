use anyhow::Result;
use chrono::Datelike;
use leadcal_core::config::LeadcalConfig;
use leadcal_core::navigation::{Granularity, NavigationCursor};
use owo_colors::OwoColorize;

use crate::commands::ViewArgs;

pub fn run(config: &LeadcalConfig, view: &ViewArgs) -> Result<()> {
    let cursor = view.cursor(config)?;
    println!("{}", render_range(&cursor));
    Ok(())
}

/// Render the visible days of a view. Month grids are drawn as weeks, with
/// days outside the reference month dimmed.
fn render_range(cursor: &NavigationCursor) -> String {
    let visible = cursor.visible_range();
    let mut lines = vec![format!(
        "{} {} → {}",
        format!("{} of {}:", cursor.granularity, cursor.reference_date).bold(),
        visible.start,
        visible.end
    )];

    if cursor.granularity == Granularity::Day {
        return lines.join("\n");
    }

    lines.push(" Su Mo Tu We Th Fr Sa".dimmed().to_string());
    let days: Vec<_> = visible.days().collect();
    for week in days.chunks(7) {
        let row: Vec<String> = week
            .iter()
            .map(|d| {
                let cell = format!("{:>3}", d.day());
                if d.month() == cursor.reference_date.month() {
                    cell
                } else {
                    cell.dimmed().to_string()
                }
            })
            .collect();
        lines.push(row.join(""));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_month_grid_has_six_weeks() {
        let cursor = NavigationCursor::new(
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            Granularity::Month,
        );

        let rendered = render_range(&cursor);

        // heading + weekday row + 6 weeks
        assert_eq!(rendered.lines().count(), 8);
        assert!(rendered.contains("2025-06-01"));
        assert!(rendered.contains("2025-07-12"));
    }

    #[test]
    fn test_day_view_is_single_line() {
        let cursor = NavigationCursor::new(
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            Granularity::Day,
        );
        assert_eq!(render_range(&cursor).lines().count(), 1);
    }
}
