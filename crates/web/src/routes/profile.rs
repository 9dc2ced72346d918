//! Profile pages: viewing, editing and pictures.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    body::Bytes,
    extract::{Multipart, Path},
    http::{
        StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{IntoResponse, Redirect, Response},
};
use roster_core::{Identity, ProfileUpdate, ProfileUser, UserId};
use serde::Deserialize;
use tracing::instrument;

use crate::api::{Picture, PictureUpload, profile::PICTURE_FIELD};
use crate::error::{AppError, Result};
use crate::filters;
use crate::hooks::{DataHook, MyProfileResource, UserProfileResource};
use crate::middleware::{Backend, RequireIdentity};
use crate::routes::Nav;

/// Profile page template, used for both other users and the caller.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub nav: Nav,
    pub user: Option<ProfileUser>,
    pub error: Option<String>,
    /// Where the profile picture is served from, when there is one.
    pub picture_url: Option<String>,
    /// True on the caller's own profile.
    pub own: bool,
}

/// Edit profile form template.
#[derive(Template, WebTemplate)]
#[template(path = "edit_profile.html")]
pub struct EditProfileTemplate {
    pub nav: Nav,
    pub user: ProfileUser,
    pub interests: String,
    pub emojis: String,
    pub error: Option<String>,
}

impl EditProfileTemplate {
    fn new(identity: &Identity, user: ProfileUser, error: Option<String>) -> Self {
        let interests = user.interests.as_deref().unwrap_or_default().join(", ");
        let emojis = user.emojis.as_deref().unwrap_or_default().join(", ");
        Self {
            nav: Nav::new("profile", Some(identity)),
            user,
            interests,
            emojis,
            error,
        }
    }
}

/// Edit form fields. List fields are comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct EditProfileForm {
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub emojis: String,
}

impl EditProfileForm {
    /// Convert the submitted form into a backend update.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a non-numeric year.
    pub fn into_update(self) -> Result<ProfileUpdate> {
        let year = match self.year.trim() {
            "" => None,
            year => Some(
                year.parse::<i32>()
                    .map_err(|_| AppError::BadRequest(format!("Invalid year: {year}")))?,
            ),
        };

        Ok(ProfileUpdate {
            nickname: Some(self.nickname.trim().to_owned()),
            year,
            interests: Some(split_list(&self.interests)),
            bio: Some(self.bio.trim().to_owned()),
            emojis: Some(split_list(&self.emojis)),
        })
    }
}

/// Split a comma-separated field, dropping blanks.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Display another user's profile.
#[instrument(skip(identity, api))]
pub async fn show(
    Path(id): Path<String>,
    RequireIdentity(identity): RequireIdentity,
    Backend(api): Backend,
) -> impl IntoResponse {
    let user_id = UserId::new(id);
    let hook = DataHook::mount(UserProfileResource::new(api, user_id.clone()));
    let snapshot = hook.settled().await;

    let picture_url = snapshot
        .data
        .as_ref()
        .filter(|u| u.has_picture())
        .map(|_| format!("/profile/{user_id}/picture"));

    ProfileTemplate {
        nav: Nav::new("people", Some(&identity)),
        user: snapshot.data,
        error: snapshot.error,
        picture_url,
        own: false,
    }
}

/// Display the caller's own profile.
#[instrument(skip_all)]
pub async fn my_profile(
    RequireIdentity(identity): RequireIdentity,
    Backend(api): Backend,
) -> impl IntoResponse {
    let hook = DataHook::mount(MyProfileResource::new(api, Some(identity.clone())));
    let snapshot = hook.settled().await;

    let picture_url = snapshot
        .data
        .as_ref()
        .filter(|u| u.has_picture())
        .map(|_| "/my-profile/picture".to_owned());

    ProfileTemplate {
        nav: Nav::new("profile", Some(&identity)),
        user: snapshot.data,
        error: snapshot.error,
        picture_url,
        own: true,
    }
}

/// Stream another user's picture.
///
/// # Errors
///
/// Passes backend failures through as [`AppError::Api`].
#[instrument(skip(identity, api))]
pub async fn picture(
    Path(id): Path<String>,
    RequireIdentity(identity): RequireIdentity,
    Backend(api): Backend,
) -> Result<Response> {
    let picture = api
        .get_user_profile_picture(&UserId::new(id), Some(&identity))
        .await?;
    Ok(picture_response(picture))
}

/// Stream the caller's own picture.
///
/// # Errors
///
/// Passes backend failures through as [`AppError::Api`].
#[instrument(skip_all)]
pub async fn my_picture(
    RequireIdentity(identity): RequireIdentity,
    Backend(api): Backend,
) -> Result<Response> {
    let picture = api.get_my_profile_picture(Some(&identity)).await?;
    Ok(picture_response(picture))
}

fn picture_response(picture: Picture) -> Response {
    let content_type = picture
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_owned());
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, content_type),
            (CACHE_CONTROL, "private, max-age=300".to_owned()),
        ],
        picture.bytes,
    )
        .into_response()
}

/// Show the edit form prefilled from the caller's profile.
///
/// # Errors
///
/// Passes backend failures through as [`AppError::Api`].
#[instrument(skip_all)]
pub async fn edit_page(
    RequireIdentity(identity): RequireIdentity,
    Backend(api): Backend,
) -> Result<impl IntoResponse> {
    let user = api.get_my_profile(Some(&identity)).await?;
    Ok(EditProfileTemplate::new(&identity, user, None))
}

/// Save the edit form.
///
/// A backend rejection re-renders the form with the backend's message.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for invalid fields, or an API error when
/// the profile cannot be reloaded.
#[instrument(skip_all)]
pub async fn update(
    RequireIdentity(identity): RequireIdentity,
    Backend(api): Backend,
    Form(form): Form<EditProfileForm>,
) -> Result<Response> {
    let update = form.into_update()?;

    match api.update_profile(&update, Some(&identity)).await {
        Ok(_) => {
            tracing::info!(identity_id = %identity.id, "profile updated");
            Ok(Redirect::to("/my-profile").into_response())
        }
        Err(e) => {
            let message = e
                .user_message()
                .or_else(|| Some("Failed to update profile".to_owned()));
            let status = AppError::from(e).status();
            let user = api.get_my_profile(Some(&identity)).await?;
            Ok((status, EditProfileTemplate::new(&identity, user, message)).into_response())
        }
    }
}

/// Accept a picture upload and forward it to the backend.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the form carries no file, otherwise
/// passes backend failures through.
#[instrument(skip_all)]
pub async fn upload_picture(
    RequireIdentity(identity): RequireIdentity,
    Backend(api): Backend,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(PICTURE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("picture").to_owned();
        let content_type = field.content_type().map(str::to_owned);
        let bytes: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if !bytes.is_empty() {
            upload = Some(PictureUpload {
                bytes,
                file_name,
                content_type,
            });
        }
        break;
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No picture uploaded".to_string()))?;
    tracing::info!(
        identity_id = %identity.id,
        size = upload.bytes.len(),
        "uploading profile picture"
    );
    api.upload_profile_picture(upload, Some(&identity)).await?;
    Ok(Redirect::to("/my-profile").into_response())
}

/// Remove the caller's picture.
///
/// # Errors
///
/// Passes backend failures through as [`AppError::Api`].
#[instrument(skip_all)]
pub async fn delete_picture(
    RequireIdentity(identity): RequireIdentity,
    Backend(api): Backend,
) -> Result<Redirect> {
    api.delete_profile_picture(Some(&identity)).await?;
    Ok(Redirect::to("/edit-profile"))
}
