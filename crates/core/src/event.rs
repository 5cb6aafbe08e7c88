use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::validation::validate_not_blank;
use crate::{Entity, EventId, UserId};

/// An event owned by the user who created it.
///
/// # Invariants
/// - `owner_id` is set at creation and never reassigned.
/// - Only the owner may change `description`, `date` or `location`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub owner_id: UserId,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
}

impl Event {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Full replace of the mutable fields; id and owner are untouched.
    pub fn apply(&mut self, details: EventDetails) {
        self.description = details.description;
        self.date = details.date;
        self.location = details.location;
    }
}

impl Entity for Event {
    type Id = EventId;

    fn id(&self) -> EventId {
        self.id
    }
}

/// The owner-editable part of an event (request body for create and update).
///
/// Unknown fields such as `id` or `owner_id` in a request body are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
}

impl EventDetails {
    pub fn validate(&self) -> DomainResult<()> {
        validate_not_blank("description", &self.description)?;
        validate_not_blank("location", &self.location)
    }
}

/// An event about to be inserted (id not yet assigned).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub owner_id: UserId,
    pub details: EventDetails,
}

impl NewEvent {
    pub fn with_id(self, id: EventId) -> Event {
        Event {
            id,
            owner_id: self.owner_id,
            description: self.details.description,
            date: self.details.date,
            location: self.details.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn details(description: &str, location: &str) -> EventDetails {
        EventDetails {
            description: description.to_string(),
            date: Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).unwrap(),
            location: location.to_string(),
        }
    }

    #[test]
    fn apply_replaces_details_but_keeps_identity() {
        let mut event = NewEvent {
            owner_id: UserId::new(1),
            details: details("Meetup", "Berlin"),
        }
        .with_id(EventId::new(9));

        event.apply(details("Rust meetup", "Hamburg"));

        assert_eq!(event.id, EventId::new(9));
        assert_eq!(event.owner_id, UserId::new(1));
        assert_eq!(event.description, "Rust meetup");
        assert_eq!(event.location, "Hamburg");
    }

    #[test]
    fn blank_fields_fail_validation() {
        assert!(details("Meetup", "Berlin").validate().is_ok());
        assert!(details("   ", "Berlin").validate().is_err());
        assert!(details("Meetup", "").validate().is_err());
    }

    #[test]
    fn deserializes_rfc3339_dates_and_ignores_owner() {
        let body = serde_json::json!({
            "description": "Meetup",
            "date": "2026-05-01T18:00:00Z",
            "location": "Berlin",
            "owner_id": 99
        });
        let parsed: EventDetails = serde_json::from_value(body).unwrap();
        assert_eq!(parsed, details("Meetup", "Berlin"));
    }
}
