//! Infrastructure layer: persistence for users, events and attendance.

pub mod db;
pub mod stores;

pub use stores::{
    AttendeeStore, EventStore, InMemoryStore, SqliteStore, StoreError, StoreResult, Stores,
    UserStore,
};
