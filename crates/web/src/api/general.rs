//! Server-level endpoints.

use reqwest::Method;

use super::{ApiClient, ApiError, Payload, RequestBody};

impl ApiClient {
    /// `GET /` on the backend; the body shape is owned by the backend.
    ///
    /// Also used as the readiness probe.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn get_server_info(&self) -> Result<Payload, ApiError> {
        self.send_ack(Method::GET, &[], None, RequestBody::Empty)
            .await
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

    #[tokio::test]
    async fn test_server_info_passes_body_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"name": "roster-api", "version": "1.2.0"})),
            )
            .mount(&server)
            .await;

        let config = ApiConfig::new(Url::parse(&server.uri()).unwrap());
        let info = ApiClient::new(&config)
            .unwrap()
            .get_server_info()
            .await
            .unwrap();
        assert_eq!(info["name"], "roster-api");
    }
}
