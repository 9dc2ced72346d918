//! All-users listing.

use std::future::Future;

use roster_core::ProfileUser;

use super::Resource;
use crate::api::{ApiClient, ApiError};

/// Every user profile, in the order the backend serves them.
pub struct UsersResource {
    client: ApiClient,
}

impl UsersResource {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl Resource for UsersResource {
    type Output = Vec<ProfileUser>;
    const FALLBACK_MESSAGE: &'static str = "Failed to fetch users";
    const NAME: &'static str = "users";

    fn fetch(&self) -> impl Future<Output = Result<Self::Output, ApiError>> + Send {
        async move { Ok(self.client.get_all_users().await?.users) }
    }
}
