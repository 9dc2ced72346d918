//! Profile records as served by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;

/// A user profile as stored and served by the backend.
///
/// Field names follow the backend's camelCase JSON; the record ID arrives as
/// `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emojis: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_profile_picture: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProfileUser {
    /// The name shown on cards: nickname when set, otherwise the display name.
    #[must_use]
    pub fn headline(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.display_name)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin.unwrap_or(false)
    }

    #[must_use]
    pub fn has_picture(&self) -> bool {
        self.has_profile_picture.unwrap_or(false)
    }
}

/// Response body of the all-users listing.
///
/// A body without a `users` field decodes as an empty page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersPage {
    #[serde(default)]
    pub users: Vec<ProfileUser>,
}

/// Partial profile update forwarded to the backend.
///
/// Absent fields are omitted from the JSON body so the backend leaves them
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emojis: Option<Vec<String>>,
}

impl ProfileUpdate {
    /// True when no field would be sent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nickname.is_none()
            && self.year.is_none()
            && self.interests.is_none()
            && self.bio.is_none()
            && self.emojis.is_none()
    }
}
