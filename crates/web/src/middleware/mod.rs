//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, HTTP transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame options, etc.)
//! 5. Route guard (redirect anonymous callers off protected pages)

pub mod auth;
pub mod guard;
pub mod request_id;
pub mod security_headers;

pub use auth::{Backend, IdentityRejection, OptionalIdentity, RequireIdentity};
pub use guard::{GuardDecision, REDIRECT_PARAM, RouteGuard, route_guard_middleware, runs_on};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
