// Adapters layer: HTTP clients for the upstream services and service-name resolution.

pub mod metadata_http;
pub mod ratings_http;
pub mod resolver;

use crate::utils::error::{CatalogError, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CatalogError::ConfigError {
            message: format!("failed to build HTTP client: {}", e),
        })
}

/// The client's own limit, tightened to what is left of the caller's deadline.
pub(crate) fn call_timeout(client_timeout: Duration, budget: Option<Duration>) -> Duration {
    budget.map_or(client_timeout, |left| left.min(client_timeout))
}

/// Appends percent-encoded path segments to a service's base URL.
pub(crate) fn endpoint(service: &str, base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| CatalogError::ConfigError {
            message: format!("base URL for '{}' cannot take a path: {}", service, base),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
