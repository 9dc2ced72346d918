//! Backend queries.
//!
//! # Environment Variables
//!
//! - `ROSTER_API_URL` - Backend base URL
//! - `ROSTER_API_TIMEOUT_SECS` - Request timeout
//! - `ROSTER_IDENTITY_HEADER_PREFIX` - Identity header prefix

use roster_core::{Email, UserId};
use roster_web::api::ApiClient;
use roster_web::config::ApiConfig;

use super::{CliError, print_json};

fn client() -> Result<ApiClient, CliError> {
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;
    tracing::debug!(api = %config.base_url, "using backend");
    Ok(ApiClient::new(&config)?)
}

/// Print every profile.
pub async fn users() -> Result<(), CliError> {
    let page = client()?.get_all_users().await?;
    tracing::info!(count = page.users.len(), "fetched users");
    print_json(&page.users)
}

/// Print one profile.
pub async fn user(id: &str) -> Result<(), CliError> {
    let user = client()?.get_user_profile(&UserId::new(id)).await?;
    print_json(&user)
}

/// Print gallery albums.
pub async fn albums() -> Result<(), CliError> {
    let albums = client()?.get_albums().await?;
    tracing::info!(count = albums.len(), "fetched albums");
    print_json(&albums)
}

/// Print backend server info.
pub async fn server_info() -> Result<(), CliError> {
    let info = client()?.get_server_info().await?;
    print_json(&info)
}

/// Print the backend's verdict on an email address.
pub async fn check_email(email: &str) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let result = client()?.check_email_authorization(&email).await?;
    print_json(&result)
}
