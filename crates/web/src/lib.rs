//! Roster web library.
//!
//! Server-rendered people directory, profiles and photo gallery in front of
//! the Roster backend API. Exposed as a library so the router can be
//! exercised from integration tests and the CLI can reuse the API client.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
mod filters;
pub mod hooks;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::app;
