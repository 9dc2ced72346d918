//! Core types for Roster.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod album;
pub mod email;
pub mod id;
pub mod identity;
pub mod profile;

pub use album::Album;
pub use email::{Email, EmailError};
pub use id::*;
pub use identity::{Identity, IdentityEmail};
pub use profile::{ProfileUpdate, ProfileUser, UsersPage};
