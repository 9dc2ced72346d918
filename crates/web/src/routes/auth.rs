//! Sign-in and logout.
//!
//! Credentials live with the external auth provider; these routes only hand
//! the caller over to it and tell the backend about logouts.

use axum::{
    extract::{Query, State},
    http::Uri,
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::clear_sentry_user;
use crate::middleware::Backend;
use crate::state::AppState;

/// Where callers land after signing in when no destination is given.
pub const DEFAULT_AFTER_SIGN_IN: &str = "/people";

#[derive(Debug, Deserialize)]
pub struct SignInQuery {
    pub redirect_url: Option<String>,
}

/// Redirect to the external sign-in page.
///
/// Only same-site paths are passed along as the return destination.
#[instrument(skip(state))]
pub async fn sign_in(State(state): State<AppState>, Query(query): Query<SignInQuery>) -> Redirect {
    let destination = query
        .redirect_url
        .as_deref()
        .filter(|url| is_local_path(url))
        .unwrap_or(DEFAULT_AFTER_SIGN_IN);

    let uri: Uri = destination
        .parse()
        .unwrap_or_else(|_| Uri::from_static(DEFAULT_AFTER_SIGN_IN));
    let url = state.guard().sign_in_redirect(&uri);
    Redirect::to(url.as_str())
}

/// Tell the backend about the logout and go home.
///
/// A backend failure is logged; the caller is redirected either way.
#[instrument(skip_all)]
pub async fn logout(Backend(api): Backend) -> Redirect {
    if let Err(e) = api.logout().await {
        tracing::warn!(error = %e, "backend logout failed");
    }
    clear_sentry_user();
    Redirect::to("/")
}

/// True for `/path` style destinations, false for absolute or
/// protocol-relative URLs.
fn is_local_path(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//") && !url.contains('\\')
}
