//! Photo gallery.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use roster_core::Album;
use tracing::instrument;

use crate::filters;
use crate::hooks::{AlbumsResource, DataHook};
use crate::middleware::{Backend, OptionalIdentity};
use crate::routes::Nav;

/// Album grid template.
#[derive(Template, WebTemplate)]
#[template(path = "gallery.html")]
pub struct GalleryTemplate {
    pub nav: Nav,
    pub albums: Vec<Album>,
    pub error: Option<String>,
}

/// Display the album grid. An empty list is a normal page, not an error.
#[instrument(skip_all)]
pub async fn index(
    OptionalIdentity(identity): OptionalIdentity,
    Backend(api): Backend,
) -> impl IntoResponse {
    let hook = DataHook::mount(AlbumsResource::new(api));
    let snapshot = hook.settled().await;

    GalleryTemplate {
        nav: Nav::new("gallery", identity.as_ref()),
        albums: snapshot.data,
        error: snapshot.error,
    }
}
