//! Single-profile resources.

use std::future::Future;

use roster_core::{Identity, ProfileUser, UserId};

use super::Resource;
use crate::api::{ApiClient, ApiError};

/// The caller's own profile, resolved through identity headers.
pub struct MyProfileResource {
    client: ApiClient,
    identity: Option<Identity>,
}

impl MyProfileResource {
    #[must_use]
    pub const fn new(client: ApiClient, identity: Option<Identity>) -> Self {
        Self { client, identity }
    }
}

impl Resource for MyProfileResource {
    type Output = Option<ProfileUser>;
    const FALLBACK_MESSAGE: &'static str = "Failed to fetch profile";
    const NAME: &'static str = "my_profile";

    fn fetch(&self) -> impl Future<Output = Result<Self::Output, ApiError>> + Send {
        async move {
            self.client
                .get_my_profile(self.identity.as_ref())
                .await
                .map(Some)
        }
    }
}

/// One user's profile by ID.
pub struct UserProfileResource {
    client: ApiClient,
    user_id: UserId,
}

impl UserProfileResource {
    #[must_use]
    pub const fn new(client: ApiClient, user_id: UserId) -> Self {
        Self { client, user_id }
    }
}

impl Resource for UserProfileResource {
    type Output = Option<ProfileUser>;
    const FALLBACK_MESSAGE: &'static str = "Failed to fetch user profile";
    const NAME: &'static str = "user_profile";

    fn fetch(&self) -> impl Future<Output = Result<Self::Output, ApiError>> + Send {
        async move { self.client.get_user_profile(&self.user_id).await.map(Some) }
    }
}
