//! Request-independent application services.
//!
//! Handlers resolve HTTP concerns (paths, bodies, the [`CurrentUser`]) and call
//! into [`AppServices`]; every ownership check happens here, before any write.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use eventhub_auth::{EventAction, Hs256Jwt, authorize_event_mutation, hash_password, verify_password};
use eventhub_core::validation::{validate_login, validate_registration};
use eventhub_core::{
    Attendee, Event, EventDetails, EventId, NewAttendee, NewEvent, NewUser, User, UserId,
};
use eventhub_infra::{StoreError, Stores, db};

use crate::app::dto::{LoginRequest, RegisterRequest, TokenResponse};
use crate::app::errors::ApiError;
use crate::config::Config;
use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AppServices {
    stores: Stores,
    jwt: Arc<Hs256Jwt>,
    password_hash_cost: u32,
}

/// Pick the store backend: SQLite (migrated on startup) when a database URL
/// is configured, in-memory otherwise.
pub async fn build_stores(config: &Config) -> anyhow::Result<Stores> {
    match &config.database_url {
        Some(url) => {
            let pool = db::connect(url).await?;
            db::migrate(&pool).await?;
            tracing::info!(database_url = %url, "using sqlite stores");
            Ok(Stores::sqlite(pool, config.store_timeout))
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory stores");
            Ok(Stores::in_memory())
        }
    }
}

impl AppServices {
    pub fn new(stores: Stores, jwt: Arc<Hs256Jwt>, password_hash_cost: u32) -> Self {
        Self {
            stores,
            jwt,
            password_hash_cost,
        }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn jwt(&self) -> Arc<Hs256Jwt> {
        self.jwt.clone()
    }

    // -------------------------
    // Credentials
    // -------------------------

    pub async fn register(&self, req: RegisterRequest) -> Result<User, ApiError> {
        validate_registration(&req.email, &req.password, &req.username)?;

        let cost = self.password_hash_cost;
        let password = req.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))??;

        let user = self
            .stores
            .users
            .insert(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ApiError::Conflict("email is already registered".to_string()),
                other => other.into(),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn login(&self, req: LoginRequest, now: DateTime<Utc>) -> Result<TokenResponse, ApiError> {
        validate_login(&req.email, &req.password)?;

        let user = self
            .stores
            .users
            .get_by_email(&req.email)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ApiError::not_found("no user with that email"),
                other => other.into(),
            })?;

        let password = req.password;
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))??;

        if !matches {
            tracing::warn!(user_id = %user.id, "login with wrong password");
            return Err(ApiError::unauthenticated("invalid password"));
        }

        let token = self.jwt.issue(user.id, now)?;
        Ok(TokenResponse { token })
    }

    // -------------------------
    // Events
    // -------------------------

    pub async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        Ok(self.stores.events.get_all().await?)
    }

    pub async fn get_event(&self, id: EventId) -> Result<Event, ApiError> {
        self.stores.events.get_by_id(id).await.map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found(format!("event {id} not found")),
            other => other.into(),
        })
    }

    pub async fn create_event(&self, actor: &CurrentUser, details: EventDetails) -> Result<Event, ApiError> {
        details.validate()?;

        let event = self
            .stores
            .events
            .insert(NewEvent {
                owner_id: actor.id(),
                details,
            })
            .await?;

        tracing::info!(event_id = %event.id, owner_id = %event.owner_id, "event created");
        Ok(event)
    }

    /// `details` is the already-decoded request body; a decoding failure is
    /// reported only after the event exists and the actor owns it.
    pub async fn update_event(
        &self,
        actor: &CurrentUser,
        id: EventId,
        details: Result<EventDetails, ApiError>,
    ) -> Result<Event, ApiError> {
        let event = self.get_event(id).await?;
        authorize_event_mutation(actor.id(), &event, EventAction::Update)?;
        let details = details?;
        details.validate()?;

        let updated = self.stores.events.update(id, details).await?;
        tracing::info!(event_id = %id, "event updated");
        Ok(updated)
    }

    pub async fn delete_event(&self, actor: &CurrentUser, id: EventId) -> Result<(), ApiError> {
        let event = self.get_event(id).await?;
        authorize_event_mutation(actor.id(), &event, EventAction::Delete)?;

        self.stores.events.delete(id).await?;
        tracing::info!(event_id = %id, "event deleted");
        Ok(())
    }

    // -------------------------
    // Attendance
    // -------------------------

    pub async fn add_attendee(
        &self,
        actor: &CurrentUser,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Attendee, ApiError> {
        let event = self.get_event(event_id).await?;
        authorize_event_mutation(actor.id(), &event, EventAction::AddAttendee)?;

        self.stores.users.get_by_id(user_id).await.map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found(format!("user {user_id} not found")),
            other => other.into(),
        })?;

        let already_attending = || ApiError::Conflict(format!("user {user_id} already attends event {event_id}"));

        if self
            .stores
            .attendees
            .get_by_event_and_user(event_id, user_id)
            .await?
            .is_some()
        {
            return Err(already_attending());
        }

        // A concurrent insert of the same pair is caught by the store's uniqueness rule.
        let attendee = self
            .stores
            .attendees
            .insert(NewAttendee { event_id, user_id })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => already_attending(),
                StoreError::NotFound => ApiError::not_found("event or user no longer exists"),
                other => other.into(),
            })?;

        tracing::info!(event_id = %event_id, user_id = %user_id, "attendee added");
        Ok(attendee)
    }

    pub async fn remove_attendee(
        &self,
        actor: &CurrentUser,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<(), ApiError> {
        let event = self.get_event(event_id).await?;
        authorize_event_mutation(actor.id(), &event, EventAction::RemoveAttendee)?;

        self.stores
            .attendees
            .delete(event_id, user_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => {
                    ApiError::not_found(format!("user {user_id} does not attend event {event_id}"))
                }
                other => other.into(),
            })?;

        tracing::info!(event_id = %event_id, user_id = %user_id, "attendee removed");
        Ok(())
    }

    pub async fn attendees_for_event(&self, event_id: EventId) -> Result<Vec<User>, ApiError> {
        self.get_event(event_id).await?;
        Ok(self.stores.attendees.get_users_by_event(event_id).await?)
    }

    /// Empty for users with no attendance rows, including unknown users.
    pub async fn events_for_attendee(&self, user_id: UserId) -> Result<Vec<Event>, ApiError> {
        Ok(self.stores.attendees.get_events_by_user(user_id).await?)
    }
}
