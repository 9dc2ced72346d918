//! Authenticated caller identity.
//!
//! An [`Identity`] is supplied by the external auth provider for a single
//! request. It is never persisted by Roster; it only flows into outbound
//! identity headers and into templates.

use serde::{Deserialize, Serialize};

use super::id::IdentityId;

/// Display name used when the provider supplies no usable name at all.
pub const FALLBACK_DISPLAY_NAME: &str = "User";

/// One email address attached to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityEmail {
    pub email_address: String,
}

impl IdentityEmail {
    #[must_use]
    pub fn new(email_address: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
        }
    }
}

/// The authenticated caller's attributes as reported by the auth provider.
///
/// Only `id` is required. Every other field is optional and resolved through
/// a fixed fallback order by [`display_name`](Self::display_name),
/// [`email`](Self::email) and [`image_url`](Self::image_url).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: IdentityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub email_addresses: Vec<IdentityEmail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_email_address: Option<IdentityEmail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Identity {
    /// Create an identity carrying only its ID.
    #[must_use]
    pub fn new(id: impl Into<IdentityId>) -> Self {
        Self {
            id: id.into(),
            first_name: None,
            last_name: None,
            username: None,
            full_name: None,
            email_addresses: Vec::new(),
            primary_email_address: None,
            image_url: None,
        }
    }

    /// Resolve the display name.
    ///
    /// Order: `"first last"` when both parts are present, then `username`,
    /// then `full_name`, then [`FALLBACK_DISPLAY_NAME`]. Empty strings count
    /// as absent.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let (Some(first), Some(last)) = (
            non_empty(self.first_name.as_deref()),
            non_empty(self.last_name.as_deref()),
        ) {
            return format!("{first} {last}");
        }

        non_empty(self.username.as_deref())
            .or_else(|| non_empty(self.full_name.as_deref()))
            .unwrap_or(FALLBACK_DISPLAY_NAME)
            .to_owned()
    }

    /// Resolve the email address.
    ///
    /// Order: first listed address, then the explicit primary address, then
    /// the empty string.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email_addresses
            .first()
            .and_then(|e| non_empty(Some(e.email_address.as_str())))
            .or_else(|| {
                self.primary_email_address
                    .as_ref()
                    .and_then(|e| non_empty(Some(e.email_address.as_str())))
            })
            .unwrap_or("")
    }

    /// Resolve the avatar URL, or the empty string when absent.
    #[must_use]
    pub fn image_url(&self) -> &str {
        self.image_url.as_deref().unwrap_or("")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn named(first: Option<&str>, last: Option<&str>) -> Identity {
        Identity {
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            ..Identity::new("u1")
        }
    }

    #[test]
    fn test_display_name_prefers_first_and_last() {
        let identity = Identity {
            username: Some("abe".into()),
            ..named(Some("A"), Some("B"))
        };
        assert_eq!(identity.display_name(), "A B");
    }

    #[test]
    fn test_display_name_needs_both_parts() {
        let identity = Identity {
            username: Some("abe".into()),
            ..named(Some("A"), None)
        };
        assert_eq!(identity.display_name(), "abe");
    }

    #[test]
    fn test_display_name_falls_back_to_full_name_then_literal() {
        let with_full = Identity {
            full_name: Some("Abe Lincoln".into()),
            ..Identity::new("u1")
        };
        assert_eq!(with_full.display_name(), "Abe Lincoln");
        assert_eq!(Identity::new("u1").display_name(), FALLBACK_DISPLAY_NAME);
    }

    #[test]
    fn test_display_name_treats_empty_as_absent() {
        let identity = Identity {
            username: Some(String::new()),
            ..named(Some(""), Some("B"))
        };
        assert_eq!(identity.display_name(), "User");
    }

    #[test]
    fn test_email_resolution_order() {
        let mut identity = Identity::new("u1");
        assert_eq!(identity.email(), "");

        identity.primary_email_address = Some(IdentityEmail::new("primary@x.com"));
        assert_eq!(identity.email(), "primary@x.com");

        identity.email_addresses = vec![
            IdentityEmail::new("a@x.com"),
            IdentityEmail::new("b@x.com"),
        ];
        assert_eq!(identity.email(), "a@x.com");
    }

    #[test]
    fn test_image_url_defaults_to_empty() {
        let mut identity = Identity::new("u1");
        assert_eq!(identity.image_url(), "");
        identity.image_url = Some("https://img.example.com/u1.png".into());
        assert_eq!(identity.image_url(), "https://img.example.com/u1.png");
    }

    #[test]
    fn test_deserialize_provider_shape() {
        let json = r#"{
            "id": "u1",
            "firstName": "A",
            "lastName": "B",
            "emailAddresses": [{"emailAddress": "a@x.com"}]
        }"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.id.as_str(), "u1");
        assert_eq!(identity.display_name(), "A B");
        assert_eq!(identity.email(), "a@x.com");
        assert_eq!(identity.image_url(), "");
    }
}
