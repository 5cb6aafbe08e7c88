//! `eventhub-core` — domain data model for users, events and attendance.
//!
//! This crate is **pure domain**: no storage, transport or crypto concerns.

pub mod attendee;
pub mod entity;
pub mod error;
pub mod event;
pub mod id;
pub mod user;
pub mod validation;

pub use attendee::{Attendee, NewAttendee};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use event::{Event, EventDetails, NewEvent};
pub use id::{AttendeeId, EventId, UserId};
pub use user::{NewUser, User};
