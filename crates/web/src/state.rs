//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::auth::{IdentityProvider, provider_from_config};
use crate::config::RosterConfig;
use crate::middleware::RouteGuard;

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid API client configuration: {0}")]
    Api(#[from] ApiError),
    #[error("failed to build identity provider: {0}")]
    IdentityProvider(#[from] reqwest::Error),
}

/// Application state shared across all handlers.
///
/// Immutable after startup and cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RosterConfig,
    api: ApiClient,
    guard: RouteGuard,
    identity_provider: Box<dyn IdentityProvider>,
}

impl AppState {
    /// Create the application state, choosing the identity provider from
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client or identity provider cannot be
    /// built.
    pub fn new(config: RosterConfig) -> Result<Self, StateError> {
        let provider = provider_from_config(&config.auth, config.api.timeout)?;
        Self::with_identity_provider(config, provider)
    }

    /// Create the application state with an explicit identity provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn with_identity_provider(
        config: RosterConfig,
        identity_provider: Box<dyn IdentityProvider>,
    ) -> Result<Self, StateError> {
        let api = ApiClient::new(&config.api)?;
        let guard = RouteGuard::new(
            config.guard.protected_prefixes.clone(),
            config.auth.sign_in_url.clone(),
            config.base_url.clone(),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                guard,
                identity_provider,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RosterConfig {
        &self.inner.config
    }

    /// Shared backend client, not yet scoped to any caller's cookies.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn guard(&self) -> &RouteGuard {
        &self.inner.guard
    }

    #[must_use]
    pub fn identity_provider(&self) -> &dyn IdentityProvider {
        self.inner.identity_provider.as_ref()
    }
}
