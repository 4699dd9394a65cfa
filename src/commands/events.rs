use anyhow::Result;
use chrono::{Local, NaiveDate};
use leadcal_core::aggregator::CalendarAggregator;
use leadcal_core::config::LeadcalConfig;
use leadcal_core::date_range::{DateRange, parse_date};
use owo_colors::OwoColorize;

use crate::commands::{ViewArgs, report_problems};
use crate::render::{Render, format_date_label, pluralize};
use crate::session;

pub async fn run(config: &LeadcalConfig, view: &ViewArgs, json: bool) -> Result<()> {
    let cursor = view.cursor(config)?;
    let visible = cursor.visible_range();

    let aggregator = session::connect(config).await?;
    aggregator
        .fetch_events(Some(visible.to_date_range(&config.timezone)))
        .await?;

    if json {
        let events = aggregator.events_for_date_range(visible.start, visible.end);
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    report_problems(&aggregator);

    let total = aggregator.events_for_date_range(visible.start, visible.end).len();
    println!(
        "{} {} → {} {}",
        format!("{} view:", cursor.granularity).bold(),
        visible.start,
        visible.end,
        format!("({} {})", total, pluralize("event", total)).dimmed()
    );

    if total == 0 {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    for day in visible.days() {
        print_day(&aggregator, day);
    }

    Ok(())
}

pub async fn run_day(config: &LeadcalConfig, date: &str, json: bool) -> Result<()> {
    let date = parse_date(date)?;

    let aggregator = session::connect(config).await?;
    aggregator
        .fetch_events(Some(DateRange::for_days(date, date, &config.timezone)))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&aggregator.events_for_date(date))?);
        return Ok(());
    }

    report_problems(&aggregator);

    if aggregator.events_for_date(date).is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    print_day(&aggregator, date);
    Ok(())
}

/// Print one day's heading and its events, skipping empty days.
fn print_day(aggregator: &CalendarAggregator, day: NaiveDate) {
    let events = aggregator.events_for_date(day);
    if events.is_empty() {
        return;
    }

    let today = Local::now().date_naive();
    println!();
    println!("{}", format_date_label(day, today).bold());

    let tz = aggregator.timezone();
    for event in &events {
        println!("{}", event.render(&tz));
    }
}
