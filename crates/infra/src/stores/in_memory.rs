use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use eventhub_core::{
    Attendee, AttendeeId, Entity, Event, EventDetails, EventId, NewAttendee, NewEvent, NewUser,
    User, UserId,
};

use super::{AttendeeStore, EventStore, StoreError, StoreResult, UserStore};

/// Rows keyed by id, with SQLite-style never-reused id assignment.
#[derive(Debug)]
struct Table<T: Entity> {
    rows: BTreeMap<T::Id, T>,
    last_id: i64,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Entity + Clone> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn get(&self, id: T::Id) -> StoreResult<T> {
        self.rows.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    fn insert(&mut self, row: T) -> T {
        self.rows.insert(row.id(), row.clone());
        row
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    events: Table<Event>,
    attendees: Table<Attendee>,
}

/// In-memory backend for all three stores.
///
/// Intended for tests/dev. Mirrors the SQL schema's constraints: unique
/// emails, unique `(event_id, user_id)` pairs, foreign keys, and cascading
/// attendee removal when an event is deleted.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.write()?;
        if tables.users.rows.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users.email".to_string()));
        }
        let id = UserId::new(tables.users.next_id());
        Ok(tables.users.insert(user.with_id(id)))
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<User> {
        self.read()?
            .users
            .rows
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_id(&self, id: UserId) -> StoreResult<User> {
        self.read()?.users.get(id)
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn insert(&self, event: NewEvent) -> StoreResult<Event> {
        let mut tables = self.write()?;
        if !tables.users.rows.contains_key(&event.owner_id) {
            return Err(StoreError::NotFound);
        }
        let id = EventId::new(tables.events.next_id());
        Ok(tables.events.insert(event.with_id(id)))
    }

    async fn get_all(&self) -> StoreResult<Vec<Event>> {
        Ok(self.read()?.events.rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: EventId) -> StoreResult<Event> {
        self.read()?.events.get(id)
    }

    async fn update(&self, id: EventId, details: EventDetails) -> StoreResult<Event> {
        let mut tables = self.write()?;
        let event = tables.events.rows.get_mut(&id).ok_or(StoreError::NotFound)?;
        event.apply(details);
        Ok(event.clone())
    }

    async fn delete(&self, id: EventId) -> StoreResult<()> {
        let mut tables = self.write()?;
        tables.events.rows.remove(&id).ok_or(StoreError::NotFound)?;
        tables.attendees.rows.retain(|_, a| a.event_id != id);
        Ok(())
    }
}

#[async_trait]
impl AttendeeStore for InMemoryStore {
    async fn insert(&self, attendee: NewAttendee) -> StoreResult<Attendee> {
        let mut tables = self.write()?;
        if !tables.users.rows.contains_key(&attendee.user_id)
            || !tables.events.rows.contains_key(&attendee.event_id)
        {
            return Err(StoreError::NotFound);
        }
        if tables
            .attendees
            .rows
            .values()
            .any(|a| a.is_edge(attendee.event_id, attendee.user_id))
        {
            return Err(StoreError::Conflict("attendees.event_id, attendees.user_id".to_string()));
        }
        let id = AttendeeId::new(tables.attendees.next_id());
        Ok(tables.attendees.insert(attendee.with_id(id)))
    }

    async fn get_by_event_and_user(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<Attendee>> {
        Ok(self
            .read()?
            .attendees
            .rows
            .values()
            .find(|a| a.is_edge(event_id, user_id))
            .cloned())
    }

    async fn get_users_by_event(&self, event_id: EventId) -> StoreResult<Vec<User>> {
        let tables = self.read()?;
        Ok(tables
            .attendees
            .rows
            .values()
            .filter(|a| a.event_id == event_id)
            .filter_map(|a| tables.users.rows.get(&a.user_id).cloned())
            .collect())
    }

    async fn get_events_by_user(&self, user_id: UserId) -> StoreResult<Vec<Event>> {
        let tables = self.read()?;
        Ok(tables
            .attendees
            .rows
            .values()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| tables.events.rows.get(&a.event_id).cloned())
            .collect())
    }

    async fn delete(&self, event_id: EventId, user_id: UserId) -> StoreResult<()> {
        let mut tables = self.write()?;
        let id = tables
            .attendees
            .rows
            .values()
            .find(|a| a.is_edge(event_id, user_id))
            .map(|a| a.id)
            .ok_or(StoreError::NotFound)?;
        tables.attendees.rows.remove(&id);
        Ok(())
    }
}
