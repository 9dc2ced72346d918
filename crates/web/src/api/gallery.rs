//! Gallery endpoints.

use reqwest::Method;
use roster_core::Album;
use serde::Deserialize;

use super::{ApiClient, ApiError, RequestBody};

/// Album listings arrive either wrapped as `{"data": [...]}` or as a bare
/// array.
#[derive(Deserialize)]
#[serde(untagged)]
enum AlbumsBody {
    Wrapped { data: Vec<Album> },
    Bare(Vec<Album>),
}

impl From<AlbumsBody> for Vec<Album> {
    fn from(body: AlbumsBody) -> Self {
        match body {
            AlbumsBody::Wrapped { data } | AlbumsBody::Bare(data) => data,
        }
    }
}

impl ApiClient {
    /// `GET /albums`; anonymous. Order is preserved as served.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn get_albums(&self) -> Result<Vec<Album>, ApiError> {
        let body: AlbumsBody = self
            .send_json(Method::GET, &["albums"], None, RequestBody::Empty)
            .await?;
        Ok(body.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn albums_from(body: serde_json::Value) -> Result<Vec<Album>, ApiError> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/albums"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let config = ApiConfig::new(Url::parse(&server.uri()).unwrap());
        ApiClient::new(&config).unwrap().get_albums().await
    }

    #[tokio::test]
    async fn test_wrapped_albums_keep_order() {
        let albums = albums_from(serde_json::json!({
            "data": [
                {"albumUrl": "https://p.example/1", "title": "First", "photos": ["a.jpg"]},
                {"albumUrl": "https://p.example/2", "title": "Second", "photos": []}
            ]
        }))
        .await
        .unwrap();

        let titles: Vec<_> = albums.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn test_bare_array_is_accepted() {
        let albums = albums_from(serde_json::json!([
            {"albumUrl": "https://p.example/1", "title": "Only"}
        ]))
        .await
        .unwrap();
        assert_eq!(albums.len(), 1);
        assert!(albums[0].photos.is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_decode_error() {
        let err = albums_from(serde_json::json!({"albums": []}))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
