use serde::{Deserialize, Serialize};

use crate::{AttendeeId, Entity, EventId, UserId};

/// Membership edge between a user and an event.
///
/// At most one attendee row exists per `(event_id, user_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: AttendeeId,
    pub user_id: UserId,
    pub event_id: EventId,
}

impl Attendee {
    pub fn is_edge(&self, event_id: EventId, user_id: UserId) -> bool {
        self.event_id == event_id && self.user_id == user_id
    }
}

impl Entity for Attendee {
    type Id = AttendeeId;

    fn id(&self) -> AttendeeId {
        self.id
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NewAttendee {
    pub event_id: EventId,
    pub user_id: UserId,
}

impl NewAttendee {
    pub fn with_id(self, id: AttendeeId) -> Attendee {
        Attendee {
            id,
            user_id: self.user_id,
            event_id: self.event_id,
        }
    }
}
