use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use chrono_tz::Tz;
use leadcal_core::config::LeadcalConfig;
use leadcal_core::deriver::{DerivedEvent, derive_events, derive_events_in_range};
use leadcal_core::lead::Lead;
use owo_colors::OwoColorize;

use crate::commands::ViewArgs;
use crate::render::{Render, format_date_label, pluralize};

pub fn run(config: &LeadcalConfig, path: &Path, view: &ViewArgs, all: bool, json: bool) -> Result<()> {
    let leads = load_leads(path)?;
    let tz = config.timezone;

    let events = if all {
        derive_events(&leads, &tz)
    } else {
        let visible = view.cursor(config)?.visible_range();
        derive_events_in_range(&leads, visible.start, visible.end, &tz)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("{}", "No lead events found".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{} {} from {} {}",
            events.len(),
            pluralize("event", events.len()),
            leads.len(),
            pluralize("lead", leads.len())
        )
        .dimmed()
    );

    let today = Local::now().date_naive();
    let mut current_day = None;

    for event in sorted(events, &tz) {
        let day = event.start.day_in(&tz);
        if current_day != Some(day) {
            println!();
            println!("{}", format_date_label(day, today).bold());
            current_day = Some(day);
        }
        println!("{}", event.render(&tz));
    }

    Ok(())
}

fn load_leads(path: &Path) -> Result<Vec<Lead>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read leads file {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse leads file {}", path.display()))
}

/// Chronological order; the deriver's lead order breaks ties.
fn sorted(mut events: Vec<DerivedEvent>, tz: &Tz) -> Vec<DerivedEvent> {
    events.sort_by_key(|e| e.start.start_instant_in(tz));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_leads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "l1", "name": "Acme renewal", "stage": "demo_scheduled",
                  "expected_close_date": "2025-04-30", "company": "Acme"}},
                {{"id": "l2", "name": "Globex", "stage": "negotiation",
                  "expected_close_date": ""}}
            ]"#
        )
        .unwrap();

        let leads = load_leads(file.path()).unwrap();
        let events = derive_events(&leads, &Tz::UTC);

        assert_eq!(leads.len(), 2);
        assert!(leads[1].expected_close_date.is_none());
        // deadline + demo for l1, nothing for l2
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_missing_leads_file_has_context() {
        let err = load_leads(Path::new("/nonexistent/leads.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read leads file"));
    }
}
