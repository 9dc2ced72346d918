//! Identity headers attached to authenticated backend calls.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use roster_core::Identity;

use super::ApiError;

/// The four identity header names derived from one configured prefix.
///
/// With the default prefix `x-identity` the names are `x-identity-id`,
/// `x-identity-name`, `x-identity-email` and `x-identity-image`.
#[derive(Debug, Clone)]
pub struct IdentityHeaderNames {
    pub id: HeaderName,
    pub name: HeaderName,
    pub email: HeaderName,
    pub image: HeaderName,
}

impl IdentityHeaderNames {
    /// Derive the header names from a prefix.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidHeader` if the prefix does not form valid
    /// header names.
    pub fn with_prefix(prefix: &str) -> Result<Self, ApiError> {
        let name = |suffix: &str| {
            let full = format!("{prefix}-{suffix}");
            HeaderName::from_bytes(full.as_bytes()).map_err(|_| ApiError::InvalidHeader(full))
        };

        Ok(Self {
            id: name("id")?,
            name: name("name")?,
            email: name("email")?,
            image: name("image")?,
        })
    }

    /// Build the identity header set for one call.
    ///
    /// Values come from the identity's fallback resolution: display name
    /// falls back to `"User"`, email and image fall back to empty strings.
    /// Non-ASCII names are sent as raw UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidHeader` if a value contains control
    /// characters.
    pub fn headers_for(&self, identity: &Identity) -> Result<HeaderMap, ApiError> {
        let display_name = identity.display_name();
        let values = [
            (&self.id, identity.id.as_str()),
            (&self.name, display_name.as_str()),
            (&self.email, identity.email()),
            (&self.image, identity.image_url()),
        ];

        let mut headers = HeaderMap::with_capacity(values.len());
        for (name, value) in values {
            let value = HeaderValue::from_bytes(value.as_bytes())
                .map_err(|_| ApiError::InvalidHeader(name.to_string()))?;
            headers.insert(name.clone(), value);
        }
        Ok(headers)
    }
}
