//! Offline route guard checks.
//!
//! Uses `ROSTER_PROTECTED_PREFIXES`, `ROSTER_SIGN_IN_URL` and
//! `ROSTER_BASE_URL` when set.

use axum::http::Uri;
use roster_web::config::GuardConfig;
use roster_web::middleware::{GuardDecision, RouteGuard, runs_on};
use url::Url;

use super::{CliError, print_json};

/// Sign-in URL used when `ROSTER_SIGN_IN_URL` is not set.
const DEFAULT_SIGN_IN_URL: &str = "http://localhost:3000/auth/sign-in";

/// Site URL used when `ROSTER_BASE_URL` is not set.
const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Print the guard decision for a path.
pub fn evaluate(path: &str, authenticated: bool) -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    let guard = guard_from_env()?;
    print_json(&decision_report(&guard, path, authenticated)?)
}

fn guard_from_env() -> Result<RouteGuard, CliError> {
    let config = GuardConfig::from_env()?;
    let sign_in_url = url_from_env("ROSTER_SIGN_IN_URL", DEFAULT_SIGN_IN_URL)?;
    let base_url = url_from_env("ROSTER_BASE_URL", DEFAULT_BASE_URL)?;
    Ok(RouteGuard::new(config.protected_prefixes, sign_in_url, base_url))
}

fn url_from_env(key: &str, default: &str) -> Result<Url, CliError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_owned());
    Url::parse(&raw).map_err(|e| CliError::InvalidPath(format!("{key}={raw}: {e}")))
}

fn decision_report(
    guard: &RouteGuard,
    path: &str,
    authenticated: bool,
) -> Result<serde_json::Value, CliError> {
    let uri: Uri = path
        .parse()
        .map_err(|_| CliError::InvalidPath(path.to_owned()))?;
    if !uri.path().starts_with('/') {
        return Err(CliError::InvalidPath(path.to_owned()));
    }

    let matched = runs_on(uri.path());
    let decision = if matched {
        guard.decide(&uri, || authenticated)
    } else {
        GuardDecision::Allowed
    };

    Ok(match decision {
        GuardDecision::Allowed => serde_json::json!({
            "path": path,
            "guardRuns": matched,
            "protectedBy": guard.protected_prefix(uri.path()),
            "decision": "allowed",
        }),
        GuardDecision::Redirected(url) => serde_json::json!({
            "path": path,
            "guardRuns": matched,
            "protectedBy": guard.protected_prefix(uri.path()),
            "decision": "redirected",
            "location": url.as_str(),
        }),
    })
}
