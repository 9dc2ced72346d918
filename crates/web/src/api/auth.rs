//! Auth endpoints on the backend.
//!
//! Credential issuance and session validation belong to the external auth
//! provider; these endpoints only report what the backend thinks of the
//! caller.

use reqwest::Method;
use roster_core::{Email, Identity};
use url::Url;

use super::{ApiClient, ApiError, Payload, RequestBody};

impl ApiClient {
    /// `GET /auth/status`, with identity headers when signed in.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn get_auth_status(&self, identity: Option<&Identity>) -> Result<Payload, ApiError> {
        self.send_json(Method::GET, &["auth", "status"], identity, RequestBody::Empty)
            .await
    }

    /// `GET /auth/me`, with identity headers when signed in.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn get_current_user(&self, identity: Option<&Identity>) -> Result<Payload, ApiError> {
        self.send_json(Method::GET, &["auth", "me"], identity, RequestBody::Empty)
            .await
    }

    /// `POST /auth/check-email` with `{email}`; never sends identity headers.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn check_email_authorization(&self, email: &Email) -> Result<Payload, ApiError> {
        let body = serde_json::json!({ "email": email.as_str() });
        self.send_json(
            Method::POST,
            &["auth", "check-email"],
            None,
            RequestBody::Json(body),
        )
        .await
    }

    /// `POST /auth/logout`; never sends identity headers.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-2xx status.
    pub async fn logout(&self) -> Result<Payload, ApiError> {
        self.send_ack(Method::POST, &["auth", "logout"], None, RequestBody::Empty)
            .await
    }

    /// Backend-hosted Google OAuth entry point.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the base URL cannot carry a path.
    pub fn google_auth_url(&self) -> Result<Url, ApiError> {
        self.endpoint(&["auth", "google"])
    }

    /// Backend-hosted Google OAuth callback.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the base URL cannot carry a path.
    pub fn google_callback_url(&self) -> Result<Url, ApiError> {
        self.endpoint(&["auth", "google", "callback"])
    }
}
