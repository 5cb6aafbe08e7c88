//! HTTP API: configuration, routing, identity resolution and request handling.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
