use chrono::{DateTime, Utc};

use crate::models::{Event, EventStatus};

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub club_id: String,
    pub date: DateTime<Utc>,
    pub time: String,
    pub location: String,
    pub max_attendees: usize,
    pub event_type: String,
}

impl NewEvent {
    pub fn into_event(self, id: String, created_at: DateTime<Utc>) -> Event {
        Event {
            id,
            title: self.title,
            description: self.description,
            club_id: self.club_id,
            date: self.date,
            time: self.time,
            location: self.location,
            max_attendees: self.max_attendees,
            attendees: Vec::new(),
            event_type: self.event_type,
            status: EventStatus::Upcoming,
            created_at: Some(created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyRegistered,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.attendees.len() >= self.max_attendees
    }

    pub fn admit(&mut self, user_id: &str) -> Option<JoinOutcome> {
        if self.is_full() {
            return None;
        }
        if self.attendees.iter().any(|a| a == user_id) {
            return Some(JoinOutcome::AlreadyRegistered);
        }
        self.attendees.push(user_id.to_string());
        Some(JoinOutcome::Joined)
    }
}

pub fn events_by_club<'a>(events: &'a [Event], club_id: &str) -> Vec<&'a Event> {
    events.iter().filter(|e| e.club_id == club_id).collect()
}

pub fn upcoming_events(events: &[Event], now: DateTime<Utc>) -> Vec<Event> {
    let mut upcoming: Vec<Event> = events.iter().filter(|e| e.date > now).cloned().collect();
    upcoming.sort_by(|a, b| a.date.cmp(&b.date));
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn event(id: &str, club: &str, days_ahead: i64, seats: usize) -> Event {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        NewEvent {
            title: format!("Workshop {id}"),
            description: String::new(),
            club_id: club.to_string(),
            date: base + Duration::days(days_ahead),
            time: "6:30 PM".to_string(),
            location: "Library".to_string(),
            max_attendees: seats,
            event_type: "workshop".to_string(),
        }
        .into_event(id.to_string(), base)
    }

    #[test]
    fn upcoming_sorted_and_excludes_past() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let events = vec![
            event("e1", "c1", 5, 10),
            event("e2", "c2", -1, 10),
            event("e3", "c1", 2, 10),
        ];
        let ids: Vec<String> = upcoming_events(&events, now).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, ["e3", "e1"]);
        assert_eq!(events_by_club(&events, "c1").len(), 2);
    }

    #[test]
    fn admit_respects_capacity_and_duplicates() {
        let mut e = event("e1", "c1", 1, 1);
        assert_eq!(e.admit("u1"), Some(JoinOutcome::Joined));
        assert_eq!(e.admit("u2"), None);

        let mut roomy = event("e2", "c1", 1, 3);
        roomy.admit("u1");
        assert_eq!(roomy.admit("u1"), Some(JoinOutcome::AlreadyRegistered));
        assert_eq!(roomy.attendees.len(), 1);
    }
}
