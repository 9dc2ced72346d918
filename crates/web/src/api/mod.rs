//! Backend API client.
//!
//! # Architecture
//!
//! - One `reqwest::Client` is built at startup from [`ApiConfig`] and shared
//!   through `AppState`; [`ApiClient`] is cheap to clone.
//! - Every call carries the caller's session cookies, scoped per request
//!   with [`ApiClient::with_credentials`].
//! - Identity headers are attached only when the caller passes an
//!   [`Identity`]; otherwise the call is anonymous.
//! - No retries, no backoff, no caching. Failures surface as [`ApiError`]
//!   and recovery is entirely up to the caller.
//!
//! # Resources
//!
//! Endpoint functions are grouped by backend resource:
//! - [`auth`] - auth status, current user, email check, logout, OAuth URLs
//! - [`profile`] - profiles, profile updates and profile pictures
//! - [`gallery`] - photo albums
//! - [`general`] - server info
//!
//! # Example
//!
//! ```rust,ignore
//! let client = ApiClient::new(&config.api)?.with_credentials(cookie);
//!
//! let users = client.get_all_users().await?;
//! let me = client.get_my_profile(Some(&identity)).await?;
//! ```

pub mod auth;
pub mod gallery;
pub mod general;
mod headers;
pub mod profile;

pub use headers::IdentityHeaderNames;
pub use profile::{Picture, PictureUpload};

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use roster_core::Identity;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

/// Untyped JSON payload for endpoints whose body shape the backend owns
/// (status, acknowledgements, server info).
pub type Payload = serde_json::Value;

/// Shown when the backend could not be reached.
pub const NETWORK_ERROR_MESSAGE: &str = "Network Error";

/// Shown when the backend did not answer in time.
pub const TIMEOUT_MESSAGE: &str = "Request timed out";

/// Errors surfaced by backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (connection, DNS, TLS, timeout).
    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("Request failed with status code {status}")]
    Server {
        status: u16,
        /// `message` (or `error`) field of a JSON error body, when present.
        message: Option<String>,
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// An identity field cannot be sent as a header value.
    #[error("Invalid value for identity header {0}")]
    InvalidHeader(String),

    /// The configured base URL cannot carry path segments.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// The upload payload could not be encoded.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

impl ApiError {
    /// HTTP status of a server error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-supplied message field, if the backend sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Message safe to show the caller: the server's message field, then
    /// the status text. Transport failures get a generic message that never
    /// names the backend. `None` when there is nothing to show, in which
    /// case callers use their own fallback.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Server { message, .. } => Some(
                message
                    .as_deref()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map_or_else(|| self.to_string(), str::to_owned),
            ),
            Self::Transport(e) if e.is_timeout() => Some(TIMEOUT_MESSAGE.to_owned()),
            Self::Transport(_) => Some(NETWORK_ERROR_MESSAGE.to_owned()),
            Self::InvalidUpload(_) => Some(self.to_string()),
            Self::Decode(_) | Self::InvalidHeader(_) | Self::InvalidUrl(_) => None,
        }
    }
}

/// Request body variants.
pub(crate) enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(reqwest::multipart::Form),
}

/// Client for the backend HTTP API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    credentials: Option<HeaderValue>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    identity_headers: IdentityHeaderNames,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity header prefix is not a valid header
    /// name or the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let identity_headers = IdentityHeaderNames::with_prefix(&config.identity_header_prefix)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                identity_headers,
            }),
            credentials: None,
        })
    }

    /// Scope the client to a caller's session cookies.
    ///
    /// The `Cookie` value is forwarded on every subsequent call, whether or
    /// not identity headers are attached.
    #[must_use]
    pub fn with_credentials(&self, cookie: Option<HeaderValue>) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            credentials: cookie,
        }
    }

    /// Base URL of the backend.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an absolute endpoint URL from path segments.
    ///
    /// Segments are percent-encoded, so IDs can never escape their slot.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        url: Url,
        identity: Option<&Identity>,
    ) -> Result<RequestBuilder, ApiError> {
        let mut builder = self.inner.client.request(method, url);

        if let Some(cookie) = &self.credentials {
            builder = builder.header(COOKIE, cookie.clone());
        }
        if let Some(identity) = identity {
            builder = builder.headers(self.inner.identity_headers.headers_for(identity)?);
        }

        Ok(builder)
    }

    /// Issue one call and return the successful response.
    ///
    /// Non-2xx responses and transport failures become errors; both are
    /// logged at `warn` without affecting the returned result.
    pub(crate) async fn send(
        &self,
        method: Method,
        segments: &[&str],
        identity: Option<&Identity>,
        body: RequestBody,
    ) -> Result<Response, ApiError> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_owned();

        tracing::debug!(
            method = %method,
            path = %path,
            authenticated = identity.is_some(),
            "backend request"
        );

        let builder = self.request(method.clone(), url, identity)?;
        let builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(method = %method, path = %path, error = %e, "backend unreachable");
                return Err(ApiError::Transport(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = server_message(&body);
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            message = message.as_deref().unwrap_or(""),
            "backend returned error status"
        );

        Err(ApiError::Server {
            status: status.as_u16(),
            message,
            body,
        })
    }

    /// Issue one call and decode a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        identity: Option<&Identity>,
        body: RequestBody,
    ) -> Result<T, ApiError> {
        let response = self.send(method, segments, identity, body).await?;
        let text = response.text().await.map_err(ApiError::Transport)?;
        decode(&text)
    }

    /// Issue one call whose body is an acknowledgement; an empty body is `null`.
    pub(crate) async fn send_ack(
        &self,
        method: Method,
        segments: &[&str],
        identity: Option<&Identity>,
        body: RequestBody,
    ) -> Result<Payload, ApiError> {
        let response = self.send(method, segments, identity, body).await?;
        let text = response.text().await.map_err(ApiError::Transport)?;
        if text.trim().is_empty() {
            return Ok(Payload::Null);
        }
        decode(&text)
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::warn!(
            error = %e,
            body = %text.chars().take(200).collect::<String>(),
            "failed to decode backend response"
        );
        ApiError::Decode(e)
    })
}

/// Extract the `message` (or `error`) string from a JSON error body.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(str::to_owned)
}
