//! Gallery albums.

use std::future::Future;

use roster_core::Album;

use super::Resource;
use crate::api::{ApiClient, ApiError};

pub struct AlbumsResource {
    client: ApiClient,
}

impl AlbumsResource {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl Resource for AlbumsResource {
    type Output = Vec<Album>;
    const FALLBACK_MESSAGE: &'static str = "Failed to fetch albums";
    const NAME: &'static str = "albums";

    fn fetch(&self) -> impl Future<Output = Result<Self::Output, ApiError>> + Send {
        self.client.get_albums()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::hooks::DataHook;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_refetch_picks_up_new_albums() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/albums"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/albums"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"albumUrl": "https://p.example/1", "title": "Launch"}]
            })))
            .mount(&server)
            .await;

        let config = ApiConfig::new(Url::parse(&server.uri()).unwrap());
        let hook = DataHook::mount(AlbumsResource::new(ApiClient::new(&config).unwrap()));

        let first = hook.settled().await;
        assert!(first.data.is_empty());
        assert_eq!(first.error, None);

        hook.refetch();
        assert!(hook.snapshot().loading);
        let second = hook.settled().await;
        assert_eq!(second.data.len(), 1);
        assert_eq!(second.data[0].title, "Launch");
    }
}
