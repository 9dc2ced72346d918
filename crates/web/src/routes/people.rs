//! People directory.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use roster_core::ProfileUser;
use tracing::instrument;

use crate::filters;
use crate::hooks::{DataHook, UsersResource};
use crate::middleware::{Backend, RequireIdentity};
use crate::routes::Nav;

/// People grid template.
#[derive(Template, WebTemplate)]
#[template(path = "people.html")]
pub struct PeopleTemplate {
    pub nav: Nav,
    pub users: Vec<ProfileUser>,
    pub error: Option<String>,
}

/// Display every user as a card.
#[instrument(skip_all)]
pub async fn index(
    RequireIdentity(identity): RequireIdentity,
    Backend(api): Backend,
) -> impl IntoResponse {
    let hook = DataHook::mount(UsersResource::new(api));
    let snapshot = hook.settled().await;

    PeopleTemplate {
        nav: Nav::new("people", Some(&identity)),
        users: snapshot.data,
        error: snapshot.error,
    }
}
