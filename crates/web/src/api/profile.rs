//! Profile endpoints: listing, reading and updating profiles, plus pictures.

use axum::body::Bytes;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use roster_core::{Identity, ProfileUpdate, ProfileUser, UserId, UsersPage};

use super::{ApiClient, ApiError, Payload, RequestBody};

/// Multipart field name the backend reads the uploaded picture from.
pub const PICTURE_FIELD: &str = "profilePicture";

/// A profile picture as returned by the backend.
#[derive(Debug, Clone)]
pub struct Picture {
    pub bytes: Bytes,
    /// Content type reported by the backend, if any.
    pub content_type: Option<String>,
}

/// A picture file to upload.
#[derive(Debug, Clone)]
pub struct PictureUpload {
    pub bytes: Bytes,
    pub file_name: String,
    pub content_type: Option<String>,
}

impl ApiClient {
    /// `GET /profile/my-profile`, with identity headers when signed in.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn get_my_profile(&self, identity: Option<&Identity>) -> Result<ProfileUser, ApiError> {
        self.send_json(Method::GET, &["profile", "my-profile"], identity, RequestBody::Empty)
            .await
    }

    /// `GET /profile`; anonymous.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn get_all_users(&self) -> Result<UsersPage, ApiError> {
        self.send_json(Method::GET, &["profile"], None, RequestBody::Empty)
            .await
    }

    /// `PUT /profile/update` with the partial update as JSON.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
        identity: Option<&Identity>,
    ) -> Result<ProfileUser, ApiError> {
        let body = serde_json::to_value(update)?;
        self.send_json(
            Method::PUT,
            &["profile", "update"],
            identity,
            RequestBody::Json(body),
        )
        .await
    }

    /// `GET /profile/{id}`; anonymous.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn get_user_profile(&self, user_id: &UserId) -> Result<ProfileUser, ApiError> {
        self.send_json(
            Method::GET,
            &["profile", user_id.as_str()],
            None,
            RequestBody::Empty,
        )
        .await
    }

    /// `POST /profile/upload-picture` as multipart form data.
    ///
    /// The file goes into the fixed field [`PICTURE_FIELD`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUpload` for an unparsable content type,
    /// otherwise an [`ApiError`] on transport failure or non-2xx status.
    pub async fn upload_profile_picture(
        &self,
        upload: PictureUpload,
        identity: Option<&Identity>,
    ) -> Result<Payload, ApiError> {
        let mut part = Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| ApiError::InvalidUpload(e.to_string()))?;
        }
        let form = Form::new().part(PICTURE_FIELD, part);

        self.send_ack(
            Method::POST,
            &["profile", "upload-picture"],
            identity,
            RequestBody::Multipart(form),
        )
        .await
    }

    /// `GET /profile/my-picture` as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-2xx status.
    pub async fn get_my_profile_picture(&self, identity: Option<&Identity>) -> Result<Picture, ApiError> {
        self.fetch_picture(&["profile", "my-picture"], identity).await
    }

    /// `GET /profile/picture/{id}` as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-2xx status.
    pub async fn get_user_profile_picture(
        &self,
        user_id: &UserId,
        identity: Option<&Identity>,
    ) -> Result<Picture, ApiError> {
        self.fetch_picture(&["profile", "picture", user_id.as_str()], identity)
            .await
    }

    /// `DELETE /profile/picture`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-2xx status.
    pub async fn delete_profile_picture(&self, identity: Option<&Identity>) -> Result<Payload, ApiError> {
        self.send_ack(Method::DELETE, &["profile", "picture"], identity, RequestBody::Empty)
            .await
    }

    async fn fetch_picture(
        &self,
        segments: &[&str],
        identity: Option<&Identity>,
    ) -> Result<Picture, ApiError> {
        let response = self
            .send(Method::GET, segments, identity, RequestBody::Empty)
            .await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await.map_err(ApiError::Transport)?;

        Ok(Picture {
            bytes,
            content_type,
        })
    }
}
