//! Identity and backend extractors.
//!
//! Route handlers pull the caller's identity and a cookie-scoped backend
//! client from here.

use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use roster_core::Identity;

use crate::api::ApiClient;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires a signed-in caller.
///
/// Uses the identity the route guard already resolved when present;
/// otherwise asks the identity provider.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireIdentity(identity): RequireIdentity,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", identity.display_name())
/// }
/// ```
pub struct RequireIdentity(pub Identity);

/// Rejection for [`RequireIdentity`].
pub enum IdentityRejection {
    /// Redirect to the external sign-in page (for HTML requests).
    RedirectToSignIn(String),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSignIn(url) => Redirect::to(&url).into_response(),
            Self::Unauthorized => {
                AppError::Unauthorized("Sign in required".to_string()).into_response()
            }
        }
    }
}

impl FromRequestParts<AppState> for RequireIdentity {
    type Rejection = IdentityRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = resolve(parts, state).await {
            return Ok(Self(identity));
        }

        if parts.uri.path().starts_with("/api/") {
            Err(IdentityRejection::Unauthorized)
        } else {
            let url = state.guard().sign_in_redirect(&parts.uri);
            Err(IdentityRejection::RedirectToSignIn(url.into()))
        }
    }
}

/// Extractor that optionally gets the caller's identity. Never rejects.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequestParts<AppState> for OptionalIdentity {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve(parts, state).await))
    }
}

/// Backend client scoped to the caller's session cookies.
pub struct Backend(pub ApiClient);

impl FromRequestParts<AppState> for Backend {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookie = parts.headers.get(COOKIE).cloned();
        Ok(Self(state.api().with_credentials(cookie)))
    }
}

/// Identity from request extensions, falling back to the provider.
///
/// A provider result is cached in the extensions for later extractors.
async fn resolve(parts: &mut Parts, state: &AppState) -> Option<Identity> {
    if let Some(identity) = parts.extensions.get::<Identity>() {
        return Some(identity.clone());
    }

    let identity = state.identity_provider().identify(&parts.headers).await?;
    parts.extensions.insert(identity.clone());
    Some(identity)
}
