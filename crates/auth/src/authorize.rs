//! Ownership policy for event mutations.
//!
//! - No IO
//! - No panics
//! - Pure policy check over an already-loaded event

use serde::Serialize;
use thiserror::Error;

use eventhub_core::{Event, EventId, UserId};

/// Mutations gated by event ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Update,
    Delete,
    AddAttendee,
    RemoveAttendee,
}

impl EventAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventAction::Update => "update",
            EventAction::Delete => "delete",
            EventAction::AddAttendee => "add attendees to",
            EventAction::RemoveAttendee => "remove attendees from",
        }
    }
}

impl core::fmt::Display for EventAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: only the owner may {action} event {event_id}")]
    NotOwner {
        actor: UserId,
        event_id: EventId,
        action: EventAction,
    },
}

pub fn can_mutate_event(acting_user_id: UserId, event: &Event) -> bool {
    event.is_owned_by(acting_user_id)
}

/// Gate an event mutation. Callers must return on `Err` without writing.
pub fn authorize_event_mutation(
    acting_user_id: UserId,
    event: &Event,
    action: EventAction,
) -> Result<(), AuthzError> {
    if can_mutate_event(acting_user_id, event) {
        Ok(())
    } else {
        tracing::warn!(
            actor = %acting_user_id,
            event_id = %event.id,
            owner_id = %event.owner_id,
            action = ?action,
            "event mutation denied"
        );
        Err(AuthzError::NotOwner {
            actor: acting_user_id,
            event_id: event.id,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn event_owned_by(owner: i64) -> Event {
        Event {
            id: EventId::new(1),
            owner_id: UserId::new(owner),
            description: "Meetup".to_string(),
            date: Utc::now(),
            location: "Berlin".to_string(),
        }
    }

    #[test]
    fn owner_may_mutate() {
        let event = event_owned_by(7);
        for action in [
            EventAction::Update,
            EventAction::Delete,
            EventAction::AddAttendee,
            EventAction::RemoveAttendee,
        ] {
            assert_eq!(authorize_event_mutation(UserId::new(7), &event, action), Ok(()));
        }
    }

    #[test]
    fn denial_names_the_action() {
        let event = event_owned_by(7);
        let err = authorize_event_mutation(UserId::new(8), &event, EventAction::RemoveAttendee)
            .unwrap_err();
        assert_eq!(
            err,
            AuthzError::NotOwner {
                actor: UserId::new(8),
                event_id: EventId::new(1),
                action: EventAction::RemoveAttendee,
            }
        );
        assert!(err.to_string().contains("remove attendees from event 1"));
    }

    proptest! {
        #[test]
        fn only_the_owner_is_allowed(owner in 1i64..10_000, actor in 1i64..10_000) {
            let event = event_owned_by(owner);
            prop_assert_eq!(can_mutate_event(UserId::new(actor), &event), owner == actor);
        }
    }
}
