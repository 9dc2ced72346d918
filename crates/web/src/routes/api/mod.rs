//! JSON pass-through API.
//!
//! Bodies come straight from the backend; only the caller's identity and
//! cookies are added on the way through.

mod auth;

pub use auth::{CheckEmailRequest, auth_status, check_email, current_user};
