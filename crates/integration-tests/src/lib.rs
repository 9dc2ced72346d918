//! Integration tests for Roster.
//!
//! Each test builds the full router in-process against a `wiremock`
//! backend and drives it with `tower::ServiceExt::oneshot`; no server or
//! network beyond localhost is needed.
//!
//! ```bash
//! cargo test -p roster-integration-tests
//! ```
//!
//! Callers are signed in by sending the [`SIGNED_IN_COOKIE`] cookie, which
//! the test identity provider maps to [`test_identity`].

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, Request, Response};
use roster_core::{Identity, IdentityEmail};
use roster_web::auth::{IdentifyFuture, IdentityProvider};
use roster_web::config::{ApiConfig, AuthConfig, GuardConfig, RosterConfig};
use roster_web::state::AppState;
use tower::ServiceExt;
use url::Url;
use wiremock::MockServer;

/// Cookie that marks a request as signed in.
pub const SIGNED_IN_COOKIE: &str = "__session=valid";

/// Public URL of the app under test.
pub const BASE_URL: &str = "http://localhost:3000";

/// External sign-in page used by the test configuration.
pub const SIGN_IN_URL: &str = "https://accounts.example.com/sign-in";

/// The identity every signed-in test request resolves to.
#[must_use]
pub fn test_identity() -> Identity {
    Identity {
        first_name: Some("Ada".into()),
        last_name: Some("Lovelace".into()),
        email_addresses: vec![IdentityEmail::new("ada@example.com")],
        ..Identity::new("user_1")
    }
}

/// Identity provider keyed on [`SIGNED_IN_COOKIE`].
struct CookieIdentityProvider;

impl IdentityProvider for CookieIdentityProvider {
    fn identify<'a>(&'a self, headers: &'a HeaderMap) -> IdentifyFuture<'a> {
        let signed_in = headers
            .get(COOKIE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|cookies| cookies.split("; ").any(|c| c == SIGNED_IN_COOKIE));
        Box::pin(async move { signed_in.then(test_identity) })
    }
}

/// A router wired to a mock backend.
pub struct TestContext {
    pub backend: MockServer,
    pub app: Router,
}

impl TestContext {
    pub async fn new() -> Self {
        let backend = MockServer::start().await;

        let config = RosterConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: Url::parse(BASE_URL).unwrap(),
            api: ApiConfig {
                timeout: Duration::from_secs(5),
                ..ApiConfig::new(Url::parse(&backend.uri()).unwrap())
            },
            auth: AuthConfig {
                sign_in_url: Url::parse(SIGN_IN_URL).unwrap(),
                session_url: None,
                secret_key: None,
            },
            guard: GuardConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let state =
            AppState::with_identity_provider(config, Box::new(CookieIdentityProvider)).unwrap();

        Self {
            backend,
            app: roster_web::app(state),
        }
    }

    /// Send an anonymous GET.
    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Send a signed-in GET.
    pub async fn get_signed_in(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::get(uri)
                .header(COOKIE, SIGNED_IN_COOKIE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }
}

/// Read a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
