//! Roster Core - Shared types library.
//!
//! This crate provides common types used across all Roster components:
//! - `web` - Server-rendered directory, profile and gallery site
//! - `cli` - Command-line tools for probing the backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure resolution logic - no I/O,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Identities, profiles, albums, emails and string ID newtypes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
