//! Auth status endpoints.

use axum::Json;
use roster_core::Email;
use serde::Deserialize;
use tracing::instrument;

use crate::api::Payload;
use crate::error::{AppError, Result};
use crate::middleware::{Backend, OptionalIdentity};

/// Body of `POST /api/auth/check-email`.
#[derive(Debug, Deserialize)]
pub struct CheckEmailRequest {
    pub email: String,
}

/// Backend auth status for the caller.
///
/// # Errors
///
/// Passes backend failures through as [`AppError::Api`].
#[instrument(skip_all)]
pub async fn auth_status(
    OptionalIdentity(identity): OptionalIdentity,
    Backend(api): Backend,
) -> Result<Json<Payload>> {
    Ok(Json(api.get_auth_status(identity.as_ref()).await?))
}

/// The backend's view of the current caller.
///
/// # Errors
///
/// Passes backend failures through as [`AppError::Api`].
#[instrument(skip_all)]
pub async fn current_user(
    OptionalIdentity(identity): OptionalIdentity,
    Backend(api): Backend,
) -> Result<Json<Payload>> {
    Ok(Json(api.get_current_user(identity.as_ref()).await?))
}

/// Ask the backend whether an email address may sign up.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a malformed address without calling
/// the backend.
#[instrument(skip_all)]
pub async fn check_email(
    Backend(api): Backend,
    Json(request): Json<CheckEmailRequest>,
) -> Result<Json<Payload>> {
    let email =
        Email::parse(&request.email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    tracing::debug!(domain = email.domain(), "checking email authorization");
    Ok(Json(api.check_email_authorization(&email).await?))
}
