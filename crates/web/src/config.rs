//! Roster configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ROSTER_BASE_URL` - Public URL of this site (used for sign-in return links)
//! - `ROSTER_SIGN_IN_URL` - External sign-in page of the auth provider
//!
//! ## Optional
//! - `ROSTER_HOST` - Bind address (default: 127.0.0.1)
//! - `ROSTER_PORT` - Listen port (default: 3000)
//! - `ROSTER_API_URL` - Backend API base URL (default: <http://localhost:8000>)
//! - `ROSTER_API_TIMEOUT_SECS` - Per-request backend timeout (default: 10)
//! - `ROSTER_IDENTITY_HEADER_PREFIX` - Identity header prefix (default: x-identity)
//! - `ROSTER_AUTH_SESSION_URL` - Auth provider endpoint resolving a session to an identity
//! - `ROSTER_AUTH_SECRET_KEY` - Secret key presented to the session endpoint
//! - `ROSTER_PROTECTED_PREFIXES` - Comma-separated protected path prefixes
//!   (default: /people,/profile,/my-profile,/edit-profile)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default backend location for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default identity header prefix: `x-identity-id`, `x-identity-name`, ...
pub const DEFAULT_IDENTITY_HEADER_PREFIX: &str = "x-identity";

/// Paths that require a signed-in caller unless configured otherwise.
pub const DEFAULT_PROTECTED_PREFIXES: &[&str] =
    &["/people", "/profile", "/my-profile", "/edit-profile"];

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct RosterConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of this site
    pub base_url: Url,
    /// Backend API client configuration
    pub api: ApiConfig,
    /// External auth provider configuration
    pub auth: AuthConfig,
    /// Route guard configuration
    pub guard: GuardConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend API client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every backend path is joined onto
    pub base_url: Url,
    /// Prefix for the four identity headers
    pub identity_header_prefix: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Settings for `base_url` with the default header prefix and timeout.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            identity_header_prefix: DEFAULT_IDENTITY_HEADER_PREFIX.to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// External auth provider configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct AuthConfig {
    /// Where unauthenticated callers are sent to sign in
    pub sign_in_url: Url,
    /// Endpoint that resolves a forwarded session to an identity
    pub session_url: Option<Url>,
    /// Secret key sent to the session endpoint in the `x-auth-secret-key`
    /// header
    pub secret_key: Option<SecretString>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("sign_in_url", &self.sign_in_url.as_str())
            .field("session_url", &self.session_url.as_ref().map(Url::as_str))
            .field(
                "secret_key",
                &self.secret_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Route guard configuration.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Ordered protected path prefixes; first match wins
    pub protected_prefixes: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            protected_prefixes: DEFAULT_PROTECTED_PREFIXES
                .iter()
                .map(|p| (*p).to_owned())
                .collect(),
        }
    }
}

impl RosterConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the auth secret key fails validation (placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("ROSTER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ROSTER_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("ROSTER_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ROSTER_PORT".to_owned(), e.to_string()))?;
        let base_url = parse_url("ROSTER_BASE_URL", &get_required_env("ROSTER_BASE_URL")?)?;

        Ok(Self {
            host,
            port,
            base_url,
            api: ApiConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            guard: GuardConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ApiConfig {
    /// Load the backend client settings on their own.
    ///
    /// Used by the CLI, which needs nothing else from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for an unparsable URL, prefix or
    /// timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_url(
            "ROSTER_API_URL",
            &get_env_or_default("ROSTER_API_URL", DEFAULT_API_URL),
        )?;
        let identity_header_prefix = parse_header_prefix(
            "ROSTER_IDENTITY_HEADER_PREFIX",
            &get_env_or_default("ROSTER_IDENTITY_HEADER_PREFIX", DEFAULT_IDENTITY_HEADER_PREFIX),
        )?;
        let timeout_secs = get_env_or_default("ROSTER_API_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ROSTER_API_TIMEOUT_SECS".to_owned(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            identity_header_prefix,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let sign_in_url = parse_url("ROSTER_SIGN_IN_URL", &get_required_env("ROSTER_SIGN_IN_URL")?)?;
        let session_url = get_optional_env("ROSTER_AUTH_SESSION_URL")
            .map(|raw| parse_url("ROSTER_AUTH_SESSION_URL", &raw))
            .transpose()?;
        let secret_key = get_optional_env("ROSTER_AUTH_SECRET_KEY")
            .map(|raw| {
                validate_secret_strength(&raw, "ROSTER_AUTH_SECRET_KEY")?;
                Ok::<_, ConfigError>(SecretString::from(raw))
            })
            .transpose()?;

        Ok(Self {
            sign_in_url,
            session_url,
            secret_key,
        })
    }
}

impl GuardConfig {
    /// Load the protected prefixes on their own.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a prefix does not start
    /// with `/`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match get_optional_env("ROSTER_PROTECTED_PREFIXES") {
            Some(raw) => Ok(Self {
                protected_prefixes: parse_prefixes("ROSTER_PROTECTED_PREFIXES", &raw)?,
            }),
            None => Ok(Self::default()),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_owned())
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse a comma-separated prefix list, keeping order and dropping blanks.
fn parse_prefixes(key: &str, raw: &str) -> Result<Vec<String>, ConfigError> {
    let prefixes: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect();

    if let Some(bad) = prefixes.iter().find(|p| !p.starts_with('/')) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            format!("prefix '{bad}' must start with '/'"),
        ));
    }
    Ok(prefixes)
}

/// Header names are lowercase ASCII tokens; reject anything else up front.
fn parse_header_prefix(key: &str, raw: &str) -> Result<String, ConfigError> {
    let prefix = raw.trim().to_ascii_lowercase();
    let valid = !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(prefix)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            format!("'{raw}' is not a valid header name prefix"),
        ))
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_rejects_placeholders() {
        let err = validate_secret_strength("sk_test_your-key-here", "KEY").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
        assert!(validate_secret_strength("changeme123", "KEY").is_err());
    }

    #[test]
    fn test_validate_secret_strength_rejects_low_entropy() {
        assert!(validate_secret_strength("abababababababababab", "KEY").is_err());
    }

    #[test]
    fn test_validate_secret_strength_accepts_random_key() {
        assert!(validate_secret_strength("sk_live_aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "KEY").is_ok());
    }

    #[test]
    fn test_parse_prefixes_keeps_order_and_trims() {
        let prefixes = parse_prefixes("P", " /people , /profile,, /my-profile ").unwrap();
        assert_eq!(prefixes, vec!["/people", "/profile", "/my-profile"]);
    }

    #[test]
    fn test_parse_prefixes_requires_leading_slash() {
        let err = parse_prefixes("P", "/people,profile").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, msg) if msg.contains("profile")));
    }

    #[test]
    fn test_parse_header_prefix() {
        assert_eq!(parse_header_prefix("H", "X-Clerk-User").unwrap(), "x-clerk-user");
        assert!(parse_header_prefix("H", "x identity").is_err());
        assert!(parse_header_prefix("H", "").is_err());
    }

    #[test]
    fn test_parse_url_rejects_non_http() {
        assert!(parse_url("U", "http://localhost:8000").is_ok());
        assert!(parse_url("U", "ftp://files.example.com").is_err());
        assert!(parse_url("U", "not a url").is_err());
    }

    #[test]
    fn test_defaults() {
        let guard = GuardConfig::default();
        assert_eq!(
            guard.protected_prefixes,
            vec!["/people", "/profile", "/my-profile", "/edit-profile"]
        );
        let api = ApiConfig::new(Url::parse(DEFAULT_API_URL).unwrap());
        assert_eq!(api.base_url.as_str(), "http://localhost:8000/");
        assert_eq!(api.timeout, Duration::from_secs(10));
        assert_eq!(api.identity_header_prefix, "x-identity");
    }

    #[test]
    fn test_socket_addr() {
        let config = RosterConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: Url::parse("http://localhost:3000").unwrap(),
            api: ApiConfig::new(Url::parse(DEFAULT_API_URL).unwrap()),
            auth: AuthConfig {
                sign_in_url: Url::parse("https://accounts.example.dev/sign-in").unwrap(),
                session_url: None,
                secret_key: None,
            },
            guard: GuardConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_auth_config_debug_redacts_secret() {
        let config = AuthConfig {
            sign_in_url: Url::parse("https://accounts.example.dev/sign-in").unwrap(),
            session_url: Some(Url::parse("https://auth.example.dev/v1/session").unwrap()),
            secret_key: Some(SecretString::from("sk_live_super_secret_value")),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("accounts.example.dev"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk_live_super_secret_value"));
    }
}
