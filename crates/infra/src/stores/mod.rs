//! Store contracts for the credential, event and attendance tables.
//!
//! Two backends implement every contract:
//! - [`InMemoryStore`]: dev/test, no persistence.
//! - [`SqliteStore`]: SQLx-backed, every call bounded by a timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error;

use eventhub_core::{
    Attendee, Event, EventDetails, EventId, NewAttendee, NewEvent, NewUser, User, UserId,
};

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Store operation error.
///
/// Infrastructure errors (storage, timeout) as opposed to domain errors.
/// The `String` payloads carry diagnostic detail for logs only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("uniqueness violated: {0}")]
    Conflict(String),

    #[error("store call timed out")]
    Timeout,

    #[error("storage failure: {0}")]
    Storage(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Credential store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn insert(&self, user: NewUser) -> StoreResult<User>;
    async fn get_by_email(&self, email: &str) -> StoreResult<User>;
    async fn get_by_id(&self, id: UserId) -> StoreResult<User>;
}

/// Event store.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, event: NewEvent) -> StoreResult<Event>;
    /// Every event, ordered by id. No pagination.
    async fn get_all(&self) -> StoreResult<Vec<Event>>;
    async fn get_by_id(&self, id: EventId) -> StoreResult<Event>;
    /// Replace description/date/location; `NotFound` if the id is absent.
    async fn update(&self, id: EventId, details: EventDetails) -> StoreResult<Event>;
    /// Also removes the event's attendee rows.
    async fn delete(&self, id: EventId) -> StoreResult<()>;
}

/// Attendance store (user ↔ event join rows).
#[async_trait]
pub trait AttendeeStore: Send + Sync {
    /// No duplicate check beyond the `(event_id, user_id)` uniqueness
    /// constraint, which surfaces as `Conflict`.
    async fn insert(&self, attendee: NewAttendee) -> StoreResult<Attendee>;
    /// `None` when the pair has no row.
    async fn get_by_event_and_user(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<Attendee>>;
    async fn get_users_by_event(&self, event_id: EventId) -> StoreResult<Vec<User>>;
    async fn get_events_by_user(&self, user_id: UserId) -> StoreResult<Vec<Event>>;
    /// Remove the `(event_id, user_id)` edge; `NotFound` if there is none.
    async fn delete(&self, event_id: EventId, user_id: UserId) -> StoreResult<()>;
}

/// Type-erased handles to the three stores, sharing one backend.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub events: Arc<dyn EventStore>,
    pub attendees: Arc<dyn AttendeeStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let backend = Arc::new(InMemoryStore::new());
        Self {
            users: backend.clone(),
            events: backend.clone(),
            attendees: backend,
        }
    }

    pub fn sqlite(pool: SqlitePool, timeout: Duration) -> Self {
        let backend = Arc::new(SqliteStore::new(pool, timeout));
        Self {
            users: backend.clone(),
            events: backend.clone(),
            attendees: backend,
        }
    }
}

/// Contract tests run against every backend.
#[cfg(test)]
pub(crate) mod contract {
    use chrono::{TimeZone, Utc};

    use super::*;

    pub fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "$2b$04$not-a-real-hash".to_string(),
        }
    }

    pub fn details(description: &str) -> EventDetails {
        EventDetails {
            description: description.to_string(),
            date: Utc.with_ymd_and_hms(2026, 6, 1, 19, 0, 0).unwrap(),
            location: "Berlin".to_string(),
        }
    }

    pub async fn users_are_unique_by_email(stores: &Stores) {
        let ann = stores.users.insert(new_user("ann")).await.unwrap();
        assert_eq!(stores.users.get_by_id(ann.id).await.unwrap(), ann);
        assert_eq!(stores.users.get_by_email("ann@example.com").await.unwrap(), ann);

        let dup = stores.users.insert(new_user("ann")).await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));

        assert_eq!(
            stores.users.get_by_id(UserId::new(9_999)).await,
            Err(StoreError::NotFound)
        );
        assert_eq!(
            stores.users.get_by_email("nobody@example.com").await,
            Err(StoreError::NotFound)
        );
    }

    pub async fn events_support_crud(stores: &Stores) {
        let owner = stores.users.insert(new_user("owner")).await.unwrap();
        let first = stores
            .events
            .insert(NewEvent { owner_id: owner.id, details: details("first") })
            .await
            .unwrap();
        let second = stores
            .events
            .insert(NewEvent { owner_id: owner.id, details: details("second") })
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.owner_id, owner.id);

        let all = stores.events.get_all().await.unwrap();
        assert_eq!(all, vec![first.clone(), second.clone()]);

        let mut changed = details("renamed");
        changed.location = "Hamburg".to_string();
        let updated = stores.events.update(first.id, changed).await.unwrap();
        assert_eq!(updated.id, first.id);
        assert_eq!(updated.owner_id, owner.id);
        assert_eq!(updated.description, "renamed");
        assert_eq!(updated.location, "Hamburg");
        assert_eq!(stores.events.get_by_id(first.id).await.unwrap(), updated);

        stores.events.delete(first.id).await.unwrap();
        assert_eq!(stores.events.get_by_id(first.id).await, Err(StoreError::NotFound));
        assert_eq!(stores.events.delete(first.id).await, Err(StoreError::NotFound));
        assert_eq!(
            stores.events.update(first.id, details("gone")).await,
            Err(StoreError::NotFound)
        );
    }

    pub async fn attendance_joins_users_and_events(stores: &Stores) {
        let owner = stores.users.insert(new_user("host")).await.unwrap();
        let guest = stores.users.insert(new_user("guest")).await.unwrap();
        let loner = stores.users.insert(new_user("loner")).await.unwrap();
        let event = stores
            .events
            .insert(NewEvent { owner_id: owner.id, details: details("party") })
            .await
            .unwrap();

        let edge = NewAttendee { event_id: event.id, user_id: guest.id };
        assert_eq!(
            stores.attendees.get_by_event_and_user(event.id, guest.id).await,
            Ok(None)
        );
        let attendee = stores.attendees.insert(edge).await.unwrap();
        assert_eq!(attendee.event_id, event.id);
        assert_eq!(attendee.user_id, guest.id);
        assert_eq!(
            stores.attendees.get_by_event_and_user(event.id, guest.id).await,
            Ok(Some(attendee.clone()))
        );

        // The uniqueness constraint rejects a second row for the same pair.
        assert!(matches!(
            stores.attendees.insert(edge).await,
            Err(StoreError::Conflict(_))
        ));

        assert_eq!(stores.attendees.get_users_by_event(event.id).await.unwrap(), vec![guest.clone()]);
        assert_eq!(stores.attendees.get_events_by_user(guest.id).await.unwrap(), vec![event.clone()]);
        assert!(stores.attendees.get_events_by_user(loner.id).await.unwrap().is_empty());

        stores.attendees.delete(event.id, guest.id).await.unwrap();
        assert_eq!(
            stores.attendees.get_by_event_and_user(event.id, guest.id).await,
            Ok(None)
        );
        assert_eq!(
            stores.attendees.delete(event.id, guest.id).await,
            Err(StoreError::NotFound)
        );
    }

    /// Removing one pair leaves every other pair alone, including rows whose
    /// own id collides with the removed pair's event id.
    pub async fn removing_an_attendee_targets_only_that_pair(stores: &Stores) {
        let host = stores.users.insert(new_user("pair-host")).await.unwrap();
        let ada = stores.users.insert(new_user("pair-ada")).await.unwrap();
        let bob = stores.users.insert(new_user("pair-bob")).await.unwrap();
        let first = stores
            .events
            .insert(NewEvent { owner_id: host.id, details: details("first") })
            .await
            .unwrap();
        let second = stores
            .events
            .insert(NewEvent { owner_id: host.id, details: details("second") })
            .await
            .unwrap();

        let edges = [
            NewAttendee { event_id: second.id, user_id: host.id },
            NewAttendee { event_id: first.id, user_id: ada.id },
            NewAttendee { event_id: first.id, user_id: bob.id },
            NewAttendee { event_id: second.id, user_id: bob.id },
        ];
        let mut rows = Vec::new();
        for edge in edges {
            rows.push(stores.attendees.insert(edge).await.unwrap());
        }
        assert_eq!(rows[0].id.get(), first.id.get());

        stores.attendees.delete(first.id, bob.id).await.unwrap();

        assert_eq!(
            stores.attendees.get_by_event_and_user(first.id, bob.id).await,
            Ok(None)
        );
        for kept in [&rows[0], &rows[1], &rows[3]] {
            assert_eq!(
                stores
                    .attendees
                    .get_by_event_and_user(kept.event_id, kept.user_id)
                    .await,
                Ok(Some(kept.clone()))
            );
        }
        assert_eq!(
            stores.attendees.get_users_by_event(first.id).await.unwrap(),
            vec![ada.clone()]
        );
        assert_eq!(
            stores.attendees.get_events_by_user(bob.id).await.unwrap(),
            vec![second.clone()]
        );
    }

    pub async fn deleting_an_event_cascades_to_attendees(stores: &Stores) {
        let owner = stores.users.insert(new_user("cascade-owner")).await.unwrap();
        let guest = stores.users.insert(new_user("cascade-guest")).await.unwrap();
        let event = stores
            .events
            .insert(NewEvent { owner_id: owner.id, details: details("doomed") })
            .await
            .unwrap();
        stores
            .attendees
            .insert(NewAttendee { event_id: event.id, user_id: guest.id })
            .await
            .unwrap();

        stores.events.delete(event.id).await.unwrap();

        assert!(stores.attendees.get_events_by_user(guest.id).await.unwrap().is_empty());
        assert_eq!(
            stores.attendees.get_by_event_and_user(event.id, guest.id).await,
            Ok(None)
        );
    }

    pub async fn rows_must_reference_existing_entities(stores: &Stores) {
        let ghost = UserId::new(4_242);
        assert_eq!(
            stores
                .events
                .insert(NewEvent { owner_id: ghost, details: details("orphan") })
                .await,
            Err(StoreError::NotFound)
        );

        let owner = stores.users.insert(new_user("ref-owner")).await.unwrap();
        let event = stores
            .events
            .insert(NewEvent { owner_id: owner.id, details: details("real") })
            .await
            .unwrap();
        assert_eq!(
            stores
                .attendees
                .insert(NewAttendee { event_id: event.id, user_id: ghost })
                .await,
            Err(StoreError::NotFound)
        );
        assert_eq!(
            stores
                .attendees
                .insert(NewAttendee { event_id: EventId::new(4_242), user_id: owner.id })
                .await,
            Err(StoreError::NotFound)
        );
    }
}
