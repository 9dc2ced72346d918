//! Identity resolution against the external auth provider.
//!
//! Roster never issues or validates credentials itself. An
//! [`IdentityProvider`] turns the inbound request headers into an
//! [`Identity`], or `None` for anonymous callers.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use roster_core::Identity;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::config::AuthConfig;

/// Header carrying the shared secret on session lookups.
pub const AUTH_SECRET_HEADER: &str = "x-auth-secret-key";

/// Boxed future returned by [`IdentityProvider::identify`].
pub type IdentifyFuture<'a> = Pin<Box<dyn Future<Output = Option<Identity>> + Send + 'a>>;

/// Resolves the caller's identity from request headers.
pub trait IdentityProvider: Send + Sync {
    fn identify<'a>(&'a self, headers: &'a HeaderMap) -> IdentifyFuture<'a>;
}

/// Provider that treats every caller as anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousIdentityProvider;

impl IdentityProvider for AnonymousIdentityProvider {
    fn identify<'a>(&'a self, _headers: &'a HeaderMap) -> IdentifyFuture<'a> {
        Box::pin(async { None })
    }
}

/// Provider that asks the auth service's session endpoint who the caller is.
///
/// The inbound `Cookie` and `Authorization` headers are forwarded as-is.
/// Any failure resolves to `None`.
#[derive(Clone)]
pub struct RemoteIdentityProvider {
    client: reqwest::Client,
    session_url: Url,
    secret_key: Option<SecretString>,
}

impl RemoteIdentityProvider {
    /// Create a provider for a session endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(
        session_url: Url,
        secret_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            session_url,
            secret_key,
        })
    }

    async fn resolve(&self, headers: &HeaderMap) -> Option<Identity> {
        let cookie = headers.get(COOKIE);
        let authorization = headers.get(AUTHORIZATION);
        if cookie.is_none() && authorization.is_none() {
            return None;
        }

        let mut request = self.client.get(self.session_url.clone());
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie.clone());
        }
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization.clone());
        }
        if let Some(secret) = self.secret_key.as_ref().and_then(secret_header) {
            request = request.header(AUTH_SECRET_HEADER, secret);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "auth session endpoint unreachable");
                return None;
            }
        };

        match response.status() {
            StatusCode::OK => match response.json::<Identity>().await {
                Ok(identity) => {
                    tracing::debug!(identity_id = %identity.id, "identity resolved");
                    Some(identity)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "invalid identity payload");
                    None
                }
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => None,
            status => {
                tracing::warn!(status = status.as_u16(), "unexpected auth session status");
                None
            }
        }
    }
}

/// The secret as a header value marked sensitive, so it is never logged.
fn secret_header(secret: &SecretString) -> Option<HeaderValue> {
    match HeaderValue::from_str(secret.expose_secret()) {
        Ok(mut value) => {
            value.set_sensitive(true);
            Some(value)
        }
        Err(_) => {
            tracing::warn!("auth secret key is not a valid header value; not sent");
            None
        }
    }
}

impl IdentityProvider for RemoteIdentityProvider {
    fn identify<'a>(&'a self, headers: &'a HeaderMap) -> IdentifyFuture<'a> {
        Box::pin(self.resolve(headers))
    }
}

/// Build the provider for a configuration.
///
/// Without a session URL every caller is anonymous.
///
/// # Errors
///
/// Returns an error if the HTTP client fails to build.
pub fn provider_from_config(
    config: &AuthConfig,
    timeout: Duration,
) -> Result<Box<dyn IdentityProvider>, reqwest::Error> {
    match &config.session_url {
        Some(url) => Ok(Box::new(RemoteIdentityProvider::new(
            url.clone(),
            config.secret_key.clone(),
            timeout,
        )?)),
        None => {
            tracing::warn!("ROSTER_AUTH_SESSION_URL not set; all callers are anonymous");
            Ok(Box::new(AnonymousIdentityProvider))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer, secret: Option<&str>) -> RemoteIdentityProvider {
        let url = Url::parse(&format!("{}/session", server.uri())).unwrap();
        RemoteIdentityProvider::new(
            url,
            secret.map(|s| SecretString::from(s.to_owned())),
            Duration::from_secs(2),
        )
        .unwrap()
    }

    fn with_cookie(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_secret_header_is_sensitive() {
        let value = secret_header(&SecretString::from("sk_live_abc123")).unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value, "sk_live_abc123");
        assert!(!format!("{value:?}").contains("sk_live_abc123"));
        assert!(secret_header(&SecretString::from("bad\nvalue")).is_none());
    }

    #[tokio::test]
    async fn test_session_resolves_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/session"))
            .and(header("cookie", "__session=abc"))
            .and(header("x-auth-secret-key", "sk_test_value"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "u1",
                "firstName": "A",
                "lastName": "B"
            })))
            .mount(&server)
            .await;

        let identity = provider(&server, Some("sk_test_value"))
            .identify(&with_cookie("__session=abc"))
            .await
            .unwrap();
        assert_eq!(identity.id.as_str(), "u1");
        assert_eq!(identity.display_name(), "A B");
    }

    #[tokio::test]
    async fn test_rejected_session_is_anonymous() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let identity = provider(&server, None)
            .identify(&with_cookie("__session=expired"))
            .await;
        assert!(identity.is_none());
    }

    #[tokio::test]
    async fn test_server_failure_fails_closed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let identity = provider(&server, None)
            .identify(&with_cookie("__session=abc"))
            .await;
        assert!(identity.is_none());
    }

    #[tokio::test]
    async fn test_no_credentials_skips_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let identity = provider(&server, None).identify(&HeaderMap::new()).await;
        assert!(identity.is_none());
    }

    #[tokio::test]
    async fn test_anonymous_provider() {
        let identity = AnonymousIdentityProvider
            .identify(&with_cookie("__session=abc"))
            .await;
        assert!(identity.is_none());
    }
}
