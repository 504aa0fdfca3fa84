//! HTTP client for the planet catalogue service.
//!
//! The service exposes two routes relative to its base URL:
//! - `GET <base>` returns the JSON listing of planets
//! - `GET <base>/<planetId>/image` returns the raw image bytes for one planet

use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::{Planet, PlanetId};

/// Error type for planet service operations.
#[derive(Debug, thiserror::Error)]
pub enum PlanetsError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),
    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
    /// Connection failed
    #[error("Connection error: {0}")]
    Connection(String),
    /// Request timed out
    #[error("Timeout")]
    Timeout,
    /// Server returned an error status
    #[error("Server error (status {status}): {message}")]
    ServerError { status: u16, message: String },
}

impl PlanetsError {
    /// True when the failure happened before a usable response body arrived.
    pub fn is_transport(&self) -> bool {
        !matches!(self, PlanetsError::Parse(_))
    }
}

impl From<reqwest::Error> for PlanetsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PlanetsError::Timeout
        } else if err.is_connect() {
            PlanetsError::Connection(err.to_string())
        } else if err.is_decode() {
            PlanetsError::Parse(err.to_string())
        } else {
            PlanetsError::Http(err.to_string())
        }
    }
}

/// Client for the planet catalogue HTTP API.
#[derive(Debug, Clone)]
pub struct PlanetsClient {
    base_url: String,
    http: reqwest::Client,
}

impl PlanetsClient {
    /// Create a new client pointing to the given base URL.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The listing URL of the service (e.g., "http://localhost:3000/planets")
    pub fn new(base_url: &str) -> Self {
        Self::with_http(base_url, reqwest::Client::new())
    }

    /// Create a client whose requests fail with [`PlanetsError::Timeout`]
    /// after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, PlanetsError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http(base_url, http))
    }

    fn with_http(base_url: &str, http: reqwest::Client) -> Self {
        // Remove trailing slash if present
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    /// Get the base URL this client is configured for.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the image for one planet.
    pub fn image_url(&self, id: PlanetId) -> String {
        format!("{}/{}/image", self.base_url, id)
    }

    // === Internal HTTP helpers ===

    async fn get_ok(&self, url: &str) -> Result<reqwest::Response, PlanetsError> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlanetsError::ServerError {
                status: status.as_u16(),
                message: response
                    .text()
                    .await
                    .ok()
                    .filter(|body| !body.trim().is_empty())
                    .unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, PlanetsError> {
        let body = self.get_ok(url).await?.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| PlanetsError::Parse(e.to_string()))
    }

    // === Catalogue ===

    /// Fetch the planet listing, in the order the service returns it.
    pub async fn fetch_planets(&self) -> Result<Vec<Planet>, PlanetsError> {
        tracing::debug!("GET {}", self.base_url);
        self.get_json(&self.base_url).await
    }

    /// Fetch the raw image bytes for one planet.
    ///
    /// The response body is read to completion and released before this
    /// returns, whether or not reading succeeds.
    pub async fn fetch_image_bytes(&self, id: PlanetId) -> Result<Bytes, PlanetsError> {
        let url = self.image_url(id);
        tracing::debug!("GET {url}");
        let bytes = self.get_ok(&url).await?.bytes().await?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_url_construction() {
        let client = PlanetsClient::new("http://localhost:3000/planets");
        assert_eq!(client.base_url(), "http://localhost:3000/planets");
        assert_eq!(
            client.image_url(PlanetId(4)),
            "http://localhost:3000/planets/4/image"
        );
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = PlanetsClient::new("http://localhost:3000/planets/");
        assert_eq!(client.base_url(), "http://localhost:3000/planets");
    }

    #[tokio::test]
    async fn test_fetch_planets_parses_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/planets"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"planetId": 1, "name": "Mercury"}, {"planetId": 2, "name": "Venus"}]"#,
            ))
            .mount(&server)
            .await;

        let client = PlanetsClient::new(&format!("{}/planets", server.uri()));
        let planets = client.fetch_planets().await.unwrap();

        assert_eq!(planets, vec![Planet::new(1, "Mercury"), Planet::new(2, "Venus")]);
    }

    #[tokio::test]
    async fn test_server_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
            .mount(&server)
            .await;

        let client = PlanetsClient::new(&server.uri());
        match client.fetch_planets().await {
            Err(PlanetsError::ServerError { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "database offline");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_error_body_gets_placeholder_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = PlanetsClient::new(&server.uri());
        let err = client.fetch_planets().await.unwrap_err();
        assert_eq!(err.to_string(), "Server error (status 404): Unknown error");
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_malformed_listing_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"planets\": "))
            .mount(&server)
            .await;

        let client = PlanetsClient::new(&server.uri());
        let err = client.fetch_planets().await.unwrap_err();
        assert!(matches!(err, PlanetsError::Parse(_)));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_fetch_image_bytes_uses_image_route() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/planets/7/image"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .expect(1)
            .mount(&server)
            .await;

        let client = PlanetsClient::new(&format!("{}/planets", server.uri()));
        let bytes = client.fetch_image_bytes(PlanetId(7)).await.unwrap();
        assert_eq!(bytes.as_ref(), &[1u8, 2, 3]);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments
        let client = PlanetsClient::new("http://127.0.0.1:9/planets");
        let err = client.fetch_planets().await.unwrap_err();
        assert!(err.is_transport());
        assert!(!err.to_string().is_empty());
    }
}
