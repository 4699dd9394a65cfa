use leadcal_core::remote::{ProviderAttendee, ProviderEvent, ProviderTime};

pub trait ToGoogle {
    fn to_google(&self) -> google_calendar::types::Event;
}

impl ToGoogle for ProviderEvent {
    fn to_google(&self) -> google_calendar::types::Event {
        google_calendar::types::Event {
            // Google assigns the id on insert
            id: String::new(),
            summary: self.summary.clone(),
            description: self.description.clone().unwrap_or_default(),
            location: self.location.clone().unwrap_or_default(),
            start: Some(time_to_google(&self.start)),
            end: self.end.as_ref().map(time_to_google),
            attendees: self.attendees.iter().filter_map(attendee_to_google).collect(),
            ..Default::default()
        }
    }
}

fn attendee_to_google(attendee: &ProviderAttendee) -> Option<google_calendar::types::EventAttendee> {
    let email = attendee.email.clone()?;

    Some(google_calendar::types::EventAttendee {
        email,
        display_name: attendee.display_name.clone().unwrap_or_default(),
        response_status: "needsAction".to_string(),
        additional_guests: 0,
        comment: String::new(),
        id: String::new(),
        optional: false,
        organizer: false,
        resource: false,
        self_: false,
    })
}

fn time_to_google(time: &ProviderTime) -> google_calendar::types::EventDateTime {
    google_calendar::types::EventDateTime {
        date: time.date,
        date_time: time.date_time,
        time_zone: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_to_google_all_day_event() {
        let event = ProviderEvent {
            summary: "Contract signature".to_string(),
            start: ProviderTime {
                date: NaiveDate::from_ymd_opt(2025, 4, 30),
                date_time: None,
            },
            end: Some(ProviderTime {
                date: NaiveDate::from_ymd_opt(2025, 5, 1),
                date_time: None,
            }),
            attendees: vec![
                ProviderAttendee {
                    email: Some("bob@example.com".to_string()),
                    display_name: None,
                },
                ProviderAttendee {
                    email: None,
                    display_name: Some("Front desk".to_string()),
                },
            ],
            ..Default::default()
        };

        let google = event.to_google();

        assert!(google.id.is_empty());
        assert_eq!(google.start.unwrap().date, NaiveDate::from_ymd_opt(2025, 4, 30));
        assert_eq!(google.end.unwrap().date, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(google.attendees.len(), 1);
        assert_eq!(google.attendees[0].email, "bob@example.com");
        assert!(google.description.is_empty());
    }
}
