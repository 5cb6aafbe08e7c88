//! SQLite-backed stores.
//!
//! ## Error Mapping
//!
//! | SQLx error | StoreError |
//! |------------|------------|
//! | Database (unique violation) | `Conflict` |
//! | Database (foreign key violation) | `NotFound` (referenced row is missing) |
//! | RowNotFound | `NotFound` |
//! | anything else | `Storage` |
//!
//! A call that exceeds the configured deadline yields `Timeout`; it is not retried.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::instrument;

use eventhub_core::{
    Attendee, AttendeeId, Event, EventDetails, EventId, NewAttendee, NewEvent, NewUser, User,
    UserId,
};

use super::{AttendeeStore, EventStore, StoreError, StoreResult, UserStore};

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
        }
    }
}

#[derive(Debug, FromRow)]
struct EventRow {
    id: i64,
    owner_id: i64,
    description: String,
    date: DateTime<Utc>,
    location: String,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: EventId::new(row.id),
            owner_id: UserId::new(row.owner_id),
            description: row.description,
            date: row.date,
            location: row.location,
        }
    }
}

#[derive(Debug, FromRow)]
struct AttendeeRow {
    id: i64,
    user_id: i64,
    event_id: i64,
}

impl From<AttendeeRow> for Attendee {
    fn from(row: AttendeeRow) -> Self {
        Attendee {
            id: AttendeeId::new(row.id),
            user_id: UserId::new(row.user_id),
            event_id: EventId::new(row.event_id),
        }
    }
}

/// SQLite backend for all three stores.
///
/// Cheap to clone; the SQLx pool is shared.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn run<T, F>(&self, operation: &'static str, call: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|e| map_sqlx_error(operation, e)),
            Err(_) => {
                tracing::warn!(operation, timeout_ms = self.timeout.as_millis() as u64, "store call timed out");
                Err(StoreError::Timeout)
            }
        }
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    #[instrument(skip(self, user), fields(email = %user.email), err)]
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let row: UserRow = self
            .run(
                "users.insert",
                sqlx::query_as::<_, UserRow>(
                    r#"
                    INSERT INTO users (username, email, password_hash)
                    VALUES (?, ?, ?)
                    RETURNING id, username, email, password_hash
                    "#,
                )
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.password_hash)
                .fetch_one(&self.pool),
            )
            .await?;
        Ok(row.into())
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<User> {
        let row: Option<UserRow> = self
            .run(
                "users.get_by_email",
                sqlx::query_as::<_, UserRow>("SELECT id, username, email, password_hash FROM users WHERE email = ?")
                    .bind(email)
                    .fetch_optional(&self.pool),
            )
            .await?;
        row.map(User::from).ok_or(StoreError::NotFound)
    }

    async fn get_by_id(&self, id: UserId) -> StoreResult<User> {
        let row: Option<UserRow> = self
            .run(
                "users.get_by_id",
                sqlx::query_as::<_, UserRow>("SELECT id, username, email, password_hash FROM users WHERE id = ?")
                    .bind(id.get())
                    .fetch_optional(&self.pool),
            )
            .await?;
        row.map(User::from).ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    #[instrument(skip(self, event), fields(owner_id = %event.owner_id), err)]
    async fn insert(&self, event: NewEvent) -> StoreResult<Event> {
        let row: EventRow = self
            .run(
                "events.insert",
                sqlx::query_as::<_, EventRow>(
                    r#"
                    INSERT INTO events (owner_id, description, date, location)
                    VALUES (?, ?, ?, ?)
                    RETURNING id, owner_id, description, date, location
                    "#,
                )
                .bind(event.owner_id.get())
                .bind(&event.details.description)
                .bind(event.details.date)
                .bind(&event.details.location)
                .fetch_one(&self.pool),
            )
            .await?;
        Ok(row.into())
    }

    async fn get_all(&self) -> StoreResult<Vec<Event>> {
        let rows: Vec<EventRow> = self
            .run(
                "events.get_all",
                sqlx::query_as::<_, EventRow>("SELECT id, owner_id, description, date, location FROM events ORDER BY id")
                    .fetch_all(&self.pool),
            )
            .await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn get_by_id(&self, id: EventId) -> StoreResult<Event> {
        let row: Option<EventRow> = self
            .run(
                "events.get_by_id",
                sqlx::query_as::<_, EventRow>("SELECT id, owner_id, description, date, location FROM events WHERE id = ?")
                    .bind(id.get())
                    .fetch_optional(&self.pool),
            )
            .await?;
        row.map(Event::from).ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self, details), fields(event_id = %id), err)]
    async fn update(&self, id: EventId, details: EventDetails) -> StoreResult<Event> {
        let row: Option<EventRow> = self
            .run(
                "events.update",
                sqlx::query_as::<_, EventRow>(
                    r#"
                    UPDATE events
                    SET description = ?, date = ?, location = ?
                    WHERE id = ?
                    RETURNING id, owner_id, description, date, location
                    "#,
                )
                .bind(&details.description)
                .bind(details.date)
                .bind(&details.location)
                .bind(id.get())
                .fetch_optional(&self.pool),
            )
            .await?;
        row.map(Event::from).ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self), fields(event_id = %id), err)]
    async fn delete(&self, id: EventId) -> StoreResult<()> {
        let result = self
            .run(
                "events.delete",
                sqlx::query("DELETE FROM events WHERE id = ?")
                    .bind(id.get())
                    .execute(&self.pool),
            )
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl AttendeeStore for SqliteStore {
    #[instrument(skip(self), fields(event_id = %attendee.event_id, user_id = %attendee.user_id), err)]
    async fn insert(&self, attendee: NewAttendee) -> StoreResult<Attendee> {
        let row: AttendeeRow = self
            .run(
                "attendees.insert",
                sqlx::query_as::<_, AttendeeRow>(
                    r#"
                    INSERT INTO attendees (event_id, user_id)
                    VALUES (?, ?)
                    RETURNING id, user_id, event_id
                    "#,
                )
                .bind(attendee.event_id.get())
                .bind(attendee.user_id.get())
                .fetch_one(&self.pool),
            )
            .await?;
        Ok(row.into())
    }

    async fn get_by_event_and_user(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Option<Attendee>> {
        let row: Option<AttendeeRow> = self
            .run(
                "attendees.get_by_event_and_user",
                sqlx::query_as::<_, AttendeeRow>("SELECT id, user_id, event_id FROM attendees WHERE event_id = ? AND user_id = ?")
                    .bind(event_id.get())
                    .bind(user_id.get())
                    .fetch_optional(&self.pool),
            )
            .await?;
        Ok(row.map(Attendee::from))
    }

    async fn get_users_by_event(&self, event_id: EventId) -> StoreResult<Vec<User>> {
        let rows: Vec<UserRow> = self
            .run(
                "attendees.get_users_by_event",
                sqlx::query_as::<_, UserRow>(
                    r#"
                    SELECT u.id, u.username, u.email, u.password_hash
                    FROM users u
                    JOIN attendees a ON a.user_id = u.id
                    WHERE a.event_id = ?
                    ORDER BY a.id
                    "#,
                )
                .bind(event_id.get())
                .fetch_all(&self.pool),
            )
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get_events_by_user(&self, user_id: UserId) -> StoreResult<Vec<Event>> {
        let rows: Vec<EventRow> = self
            .run(
                "attendees.get_events_by_user",
                sqlx::query_as::<_, EventRow>(
                    r#"
                    SELECT e.id, e.owner_id, e.description, e.date, e.location
                    FROM events e
                    JOIN attendees a ON a.event_id = e.id
                    WHERE a.user_id = ?
                    ORDER BY a.id
                    "#,
                )
                .bind(user_id.get())
                .fetch_all(&self.pool),
            )
            .await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    #[instrument(skip(self), fields(event_id = %event_id, user_id = %user_id), err)]
    async fn delete(&self, event_id: EventId, user_id: UserId) -> StoreResult<()> {
        let result = self
            .run(
                "attendees.delete",
                sqlx::query("DELETE FROM attendees WHERE event_id = ? AND user_id = ?")
                    .bind(event_id.get())
                    .bind(user_id.get())
                    .execute(&self.pool),
            )
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("{operation}: {}", db_err.message());
            if db_err.is_unique_violation() {
                StoreError::Conflict(msg)
            } else if db_err.is_foreign_key_violation() {
                StoreError::NotFound
            } else {
                StoreError::Storage(msg)
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        other => StoreError::Storage(format!("{operation}: {other}")),
    }
}
