use crate::adapters::{build_http_client, call_timeout, endpoint};
use crate::core::{ItemMetadata, MetadataSource, ServiceResolver};
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct MoviePayload {
    name: String,
    description: Option<String>,
}

/// Reads item details from `GET {base}/movies/{itemId}`.
///
/// The movie service does not always send a description; a missing one
/// becomes the empty string.
pub struct HttpMetadataClient {
    client: Client,
    resolver: Arc<dyn ServiceResolver>,
    service: String,
    timeout: Duration,
}

impl HttpMetadataClient {
    pub fn new(
        resolver: Arc<dyn ServiceResolver>,
        service: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            resolver,
            service: service.into(),
            timeout,
        })
    }
}

#[async_trait]
impl MetadataSource for HttpMetadataClient {
    async fn fetch_metadata(&self, item_id: &str) -> Result<ItemMetadata> {
        self.fetch_metadata_within(item_id, None).await
    }

    async fn fetch_metadata_within(
        &self,
        item_id: &str,
        budget: Option<Duration>,
    ) -> Result<ItemMetadata> {
        let base = self.resolver.resolve(&self.service)?;
        let url = endpoint(&self.service, &base, &["movies", item_id])?;

        tracing::debug!("Requesting movie details: {}", url);
        let response = self
            .client
            .get(url)
            .timeout(call_timeout(self.timeout, budget))
            .send()
            .await
            .map_err(|e| CatalogError::unavailable(&self.service, e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::ItemNotFound {
                item_id: item_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(CatalogError::unavailable(
                &self.service,
                format!("HTTP {} for item {}", status, item_id),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::unavailable(&self.service, e.to_string()))?;
        let payload: MoviePayload = serde_json::from_slice(&body)
            .map_err(|e| CatalogError::malformed(&self.service, e.to_string()))?;

        Ok(ItemMetadata {
            name: payload.name,
            description: payload.description.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::resolver::StaticResolver;
    use crate::utils::error::ErrorKind;
    use httpmock::prelude::*;

    const SERVICE: &str = "movie-info-service";

    fn client_for(base_url: &str) -> HttpMetadataClient {
        let mut resolver = StaticResolver::new();
        resolver.register(SERVICE, base_url).unwrap();
        HttpMetadataClient::new(Arc::new(resolver), SERVICE, Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_missing_description_defaults_to_empty() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/movies/1234");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"movieId": "1234", "name": "Alpha"}));
        });

        let metadata = client_for(&server.base_url())
            .fetch_metadata("1234")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(metadata.name, "Alpha");
        assert_eq!(metadata.description, "");
    }

    #[tokio::test]
    async fn test_description_is_passed_through() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/movies/5678");
            then.status(200)
                .json_body(serde_json::json!({"name": "Beta", "description": "A sequel"}));
        });

        let metadata = client_for(&server.base_url())
            .fetch_metadata("5678")
            .await
            .unwrap();

        assert_eq!(metadata.description, "A sequel");
    }

    #[tokio::test]
    async fn test_not_found_is_item_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/movies/0000");
            then.status(404);
        });

        let err = client_for(&server.base_url())
            .fetch_metadata("0000")
            .await
            .unwrap_err();

        match err {
            CatalogError::ItemNotFound { item_id } => assert_eq!(item_id, "0000"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/movies/1234");
            then.status(500);
        });

        let err = client_for(&server.base_url())
            .fetch_metadata("1234")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/movies/1234");
            then.status(200).body("not json");
        });

        let err = client_for(&server.base_url())
            .fetch_metadata("1234")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamMalformedResponse);
    }

    #[tokio::test]
    async fn test_slow_upstream_hits_client_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/movies/1234");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(serde_json::json!({"name": "Alpha"}));
        });

        let mut resolver = StaticResolver::new();
        resolver.register(SERVICE, &server.base_url()).unwrap();
        let client =
            HttpMetadataClient::new(Arc::new(resolver), SERVICE, Duration::from_millis(50))
                .unwrap();

        let err = client.fetch_metadata("1234").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }

    #[tokio::test]
    async fn test_deadline_budget_tightens_client_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/movies/1234");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(serde_json::json!({"name": "Alpha"}));
        });

        let client = client_for(&server.base_url());
        let started = std::time::Instant::now();
        let err = client
            .fetch_metadata_within("1234", Some(Duration::from_millis(50)))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_concurrent_lookups_match_sequential_lookups() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/movies/1234");
            then.status(200)
                .delay(Duration::from_millis(20))
                .json_body(serde_json::json!({"name": "Alpha"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/movies/5678");
            then.status(200).json_body(serde_json::json!({"name": "Beta"}));
        });

        let client = client_for(&server.base_url());

        let a_then_b = (
            client.fetch_metadata("1234").await.unwrap(),
            client.fetch_metadata("5678").await.unwrap(),
        );
        let b = client.fetch_metadata("5678").await.unwrap();
        let a = client.fetch_metadata("1234").await.unwrap();
        let (joined_a, joined_b) =
            tokio::join!(client.fetch_metadata("1234"), client.fetch_metadata("5678"));

        assert_eq!(a_then_b, (a.clone(), b.clone()));
        assert_eq!(joined_a.unwrap(), a);
        assert_eq!(joined_b.unwrap(), b);
    }
}
