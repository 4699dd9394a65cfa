//! Calendar events derived from CRM leads.
//!
//! Derived events are computed views: they are rebuilt from the lead list on
//! every call, never persisted, and have no conversion into `NewEvent` or
//! `EventPatch`, so they cannot reach a store.

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::constants::{DEFAULT_DEMO_LOCATION, DEMO_DURATION_MINUTES, FOLLOW_UP_AFTER_DAYS};
use crate::event::{EventTime, EventType, day_span};
use crate::lead::{Lead, PipelineStage};

/// The rule that produced a derived event. Also the id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationRule {
    Deadline,
    Demo,
    FollowUp,
}

impl DerivationRule {
    fn id_prefix(&self) -> &'static str {
        match self {
            DerivationRule::Deadline => "deadline",
            DerivationRule::Demo => "demo",
            DerivationRule::FollowUp => "follow_up",
        }
    }

    fn event_type(&self) -> EventType {
        match self {
            DerivationRule::Deadline => EventType::Deadline,
            DerivationRule::Demo => EventType::Demo,
            DerivationRule::FollowUp => EventType::FollowUp,
        }
    }
}

/// An event synthesized from a lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedEvent {
    /// `"<rule>-<leadId>"`; stable only as long as the lead keeps its id.
    pub id: String,
    pub rule: DerivationRule,
    pub title: String,
    pub description: Option<String>,
    pub start: EventTime,
    pub end: Option<EventTime>,
    pub location: Option<String>,
    pub lead_ref: String,
    /// Set when `start` was taken from a fallback field rather than the
    /// field the rule is about, so callers can flag it as approximate.
    pub start_is_fallback: bool,
}

impl DerivedEvent {
    pub fn event_type(&self) -> EventType {
        self.rule.event_type()
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_date()
    }

    pub fn touches_range(&self, from: NaiveDate, to: NaiveDate, tz: &Tz) -> bool {
        let (first, last) = day_span(&self.start, self.end.as_ref(), tz);
        first <= to && last >= from
    }

    fn new(rule: DerivationRule, lead: &Lead, title: String, start: EventTime) -> Self {
        DerivedEvent {
            id: format!("{}-{}", rule.id_prefix(), lead.id),
            rule,
            title,
            description: lead.company.clone(),
            start,
            end: None,
            location: None,
            lead_ref: lead.id.clone(),
            start_is_fallback: false,
        }
    }
}

/// Derive deadline, demo and follow-up events from `leads`.
///
/// Output is ordered by lead, then by rule (deadline, demo, follow-up).
/// The result depends only on the input; nothing reads the clock.
///
/// `tz` places date-only close dates: a demo on such a date starts at local
/// midnight, so it lands on the same day as the lead's deadline.
pub fn derive_events(leads: &[Lead], tz: &Tz) -> Vec<DerivedEvent> {
    leads.iter().flat_map(|lead| derive_for_lead(lead, tz)).collect()
}

/// Like `derive_events`, keeping only events that touch `[from, to]`.
pub fn derive_events_in_range(
    leads: &[Lead],
    from: NaiveDate,
    to: NaiveDate,
    tz: &Tz,
) -> Vec<DerivedEvent> {
    derive_events(leads, tz)
        .into_iter()
        .filter(|e| e.touches_range(from, to, tz))
        .collect()
}

fn derive_for_lead(lead: &Lead, tz: &Tz) -> Vec<DerivedEvent> {
    [deadline_event(lead), demo_event(lead, tz), follow_up_event(lead)]
        .into_iter()
        .flatten()
        .collect()
}

fn deadline_event(lead: &Lead) -> Option<DerivedEvent> {
    let close = lead.expected_close_date?;
    Some(DerivedEvent::new(
        DerivationRule::Deadline,
        lead,
        format!("Deadline: {}", lead.name),
        close,
    ))
}

fn demo_event(lead: &Lead, tz: &Tz) -> Option<DerivedEvent> {
    if lead.stage != PipelineStage::DemoScheduled {
        return None;
    }

    let (start, start_is_fallback) = match (lead.expected_close_date, lead.created_at) {
        (Some(close), _) => (EventTime::DateTime(close.start_instant_in(tz)), false),
        (None, Some(created)) => (EventTime::DateTime(created), true),
        (None, None) => return None,
    };

    let mut event = DerivedEvent::new(
        DerivationRule::Demo,
        lead,
        format!("Demo: {}", lead.name),
        start,
    );
    event.end = Some(start.plus(Duration::minutes(DEMO_DURATION_MINUTES)));
    event.location = Some(
        lead.location
            .clone()
            .unwrap_or_else(|| DEFAULT_DEMO_LOCATION.to_string()),
    );
    event.start_is_fallback = start_is_fallback;
    Some(event)
}

fn follow_up_event(lead: &Lead) -> Option<DerivedEvent> {
    if lead.stage != PipelineStage::ContactMade {
        return None;
    }

    let created = lead.created_at?;
    Some(DerivedEvent::new(
        DerivationRule::FollowUp,
        lead,
        format!("Follow-up: {}", lead.name),
        EventTime::DateTime(created + Duration::days(FOLLOW_UP_AFTER_DAYS)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_leads() -> Vec<Lead> {
        let mut closing = Lead::new("l1", "ACME rollout", "negotiation");
        closing.expected_close_date = Some(EventTime::Date(day(2025, 5, 2)));

        let mut demo = Lead::new("l2", "Globex pilot", "demo_scheduled");
        demo.expected_close_date = Some(EventTime::DateTime(at(2025, 5, 6, 14)));
        demo.company = Some("Globex".to_string());

        let mut contacted = Lead::new("l3", "Initech", "contact_made");
        contacted.created_at = Some(at(2025, 4, 28, 9));

        vec![closing, demo, contacted]
    }

    #[test]
    fn test_derive_is_deterministic() {
        let leads = sample_leads();
        assert_eq!(derive_events(&leads, &Tz::UTC), derive_events(&leads, &Tz::UTC));
    }

    #[test]
    fn test_close_date_only_yields_single_deadline() {
        let mut lead = Lead::new("l1", "ACME rollout", "proposal_sent");
        lead.expected_close_date = Some(EventTime::Date(day(2025, 5, 2)));

        let events = derive_events(&[lead], &Tz::UTC);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "deadline-l1");
        assert_eq!(events[0].event_type(), EventType::Deadline);
        assert_eq!(events[0].start, EventTime::Date(day(2025, 5, 2)));
        assert_eq!(events[0].lead_ref, "l1");
        assert!(events[0].is_all_day());
    }

    #[test]
    fn test_demo_defaults_to_online_for_one_hour() {
        let mut lead = Lead::new("l2", "Globex pilot", "demo_scheduled");
        lead.expected_close_date = Some(EventTime::DateTime(at(2025, 5, 6, 14)));

        let events = derive_events(&[lead], &Tz::UTC);
        let demo = events.iter().find(|e| e.rule == DerivationRule::Demo).unwrap();

        assert_eq!(demo.id, "demo-l2");
        assert_eq!(demo.location.as_deref(), Some("Online"));
        assert_eq!(demo.start, EventTime::DateTime(at(2025, 5, 6, 14)));
        assert_eq!(
            demo.end,
            Some(EventTime::DateTime(at(2025, 5, 6, 14) + Duration::minutes(60)))
        );
        assert!(!demo.start_is_fallback);
        // The close date also produces a deadline for the same lead
        assert!(events.iter().any(|e| e.id == "deadline-l2"));
    }

    #[test]
    fn test_demo_on_date_only_close_starts_at_local_midnight() {
        let mut lead = Lead::new("l2", "Globex pilot", "demo_scheduled");
        lead.expected_close_date = Some(EventTime::Date(day(2025, 5, 6)));
        let tz: Tz = "America/Sao_Paulo".parse().unwrap();

        let events = derive_events(&[lead], &tz);
        let demo = events.iter().find(|e| e.rule == DerivationRule::Demo).unwrap();

        assert_eq!(demo.start, EventTime::DateTime(at(2025, 5, 6, 3)));
        assert_eq!(demo.start.day_in(&tz), day(2025, 5, 6));
        assert!(demo.touches_range(day(2025, 5, 6), day(2025, 5, 6), &tz));
    }

    #[test]
    fn test_demo_falls_back_to_creation_date() {
        let mut lead = Lead::new("l2", "Globex pilot", "demo_scheduled");
        lead.created_at = Some(at(2025, 4, 1, 10));
        lead.location = Some("HQ, room 4".to_string());

        let events = derive_events(&[lead], &Tz::UTC);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, EventTime::DateTime(at(2025, 4, 1, 10)));
        assert!(events[0].start_is_fallback);
        assert_eq!(events[0].location.as_deref(), Some("HQ, room 4"));
    }

    #[test]
    fn test_demo_without_any_date_is_skipped() {
        let lead = Lead::new("l2", "Globex pilot", "demo_scheduled");
        assert!(derive_events(&[lead], &Tz::UTC).is_empty());
    }

    #[test]
    fn test_follow_up_is_seven_days_after_creation() {
        // Created years in the past: the offset comes from the record, not the clock
        let mut lead = Lead::new("l3", "Initech", "contact_made");
        lead.created_at = Some(at(2019, 2, 25, 9));

        let events = derive_events(&[lead], &Tz::UTC);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "follow_up-l3");
        assert_eq!(events[0].event_type(), EventType::FollowUp);
        assert_eq!(events[0].start, EventTime::DateTime(at(2019, 3, 4, 9)));
    }

    #[test]
    fn test_one_lead_can_match_several_rules() {
        let mut lead = Lead::new("l4", "Umbrella", "contact_made");
        lead.created_at = Some(at(2025, 4, 1, 9));
        lead.expected_close_date = Some(EventTime::Date(day(2025, 6, 30)));

        let ids: Vec<String> = derive_events(&[lead], &Tz::UTC).into_iter().map(|e| e.id).collect();

        assert_eq!(ids, vec!["deadline-l4", "follow_up-l4"]);
    }

    #[test]
    fn test_derive_in_range_filters_by_visible_window() {
        let leads = sample_leads();

        let events = derive_events_in_range(&leads, day(2025, 5, 4), day(2025, 5, 10), &Tz::UTC);

        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["deadline-l2", "demo-l2", "follow_up-l3"]);
    }
}
