//! Route guard: redirects anonymous callers away from protected pages.
//!
//! The guard runs once per request, before handlers. Protected prefixes come
//! from configuration and are tested in order; a path is protected when it
//! begins with any of them (`/people` also covers `/people/3` and
//! `/peoplex`).

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use url::Url;

use crate::error::set_sentry_user;
use crate::state::AppState;

/// Query parameter carrying the original destination on sign-in redirects.
pub const REDIRECT_PARAM: &str = "redirect_url";

/// Path prefixes the guard never runs on (after the leading `/`).
const INTERNAL_PREFIXES: &[&str] = &["_next", "static"];

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    /// Send the caller to this sign-in URL.
    Redirected(Url),
}

/// Protected prefixes plus the sign-in destination.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    protected_prefixes: Vec<String>,
    sign_in_url: Url,
    /// Public origin of this site; return links are resolved against it.
    base_url: Url,
}

impl RouteGuard {
    #[must_use]
    pub const fn new(protected_prefixes: Vec<String>, sign_in_url: Url, base_url: Url) -> Self {
        Self {
            protected_prefixes,
            sign_in_url,
            base_url,
        }
    }

    /// The first configured prefix matching `path`.
    #[must_use]
    pub fn protected_prefix(&self, path: &str) -> Option<&str> {
        self.protected_prefixes
            .iter()
            .map(String::as_str)
            .find(|prefix| path.starts_with(prefix))
    }

    #[must_use]
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefix(path).is_some()
    }

    /// Decide whether the request may proceed.
    ///
    /// `is_authenticated` is only evaluated for protected paths.
    pub fn decide(&self, uri: &Uri, is_authenticated: impl FnOnce() -> bool) -> GuardDecision {
        if !self.is_protected(uri.path()) || is_authenticated() {
            return GuardDecision::Allowed;
        }
        GuardDecision::Redirected(self.sign_in_redirect(uri))
    }

    /// Sign-in URL carrying the absolute original URL in `redirect_url`.
    #[must_use]
    pub fn sign_in_redirect(&self, uri: &Uri) -> Url {
        let original = uri
            .path_and_query()
            .map_or_else(|| uri.path(), |pq| pq.as_str());
        let return_to = self.return_url(original);
        let mut url = self.sign_in_url.clone();
        url.query_pairs_mut()
            .append_pair(REDIRECT_PARAM, return_to.as_str());
        url
    }

    /// `path_and_query` resolved against the site's base URL.
    ///
    /// Falls back to the bare path if it cannot be joined.
    #[must_use]
    pub fn return_url(&self, path_and_query: &str) -> String {
        self.base_url
            .join(path_and_query)
            .map_or_else(|_| path_and_query.to_owned(), String::from)
    }

    #[must_use]
    pub const fn sign_in_url(&self) -> &Url {
        &self.sign_in_url
    }
}

/// Whether the guard runs on a path at all.
///
/// Runs on `/`, anything under `/api` or `/trpc`, and every other path
/// except static assets (a `.` anywhere after the leading `/`) and internal
/// prefixes.
#[must_use]
pub fn runs_on(path: &str) -> bool {
    if path == "/" || path.starts_with("/api") || path.starts_with("/trpc") {
        return true;
    }
    let rest = path.strip_prefix('/').unwrap_or(path);
    !rest.contains('.') && !INTERNAL_PREFIXES.iter().any(|p| rest.starts_with(p))
}

/// Axum middleware applying the [`RouteGuard`].
///
/// On a protected path the identity provider is consulted once; an allowed
/// request carries the resolved [`roster_core::Identity`] in its extensions.
pub async fn route_guard_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let guard = state.guard();
    let path = request.uri().path();
    if !runs_on(path) || !guard.is_protected(path) {
        return next.run(request).await;
    }

    let identity = state.identity_provider().identify(request.headers()).await;
    match guard.decide(request.uri(), || identity.is_some()) {
        GuardDecision::Allowed => {
            if let Some(identity) = identity {
                set_sentry_user(&identity);
                request.extensions_mut().insert(identity);
            }
            next.run(request).await
        }
        GuardDecision::Redirected(url) => {
            tracing::debug!(path = %request.uri().path(), "redirecting anonymous caller to sign-in");
            Redirect::to(url.as_str()).into_response()
        }
    }
}
