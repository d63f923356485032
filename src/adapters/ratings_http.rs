use crate::adapters::{build_http_client, call_timeout, endpoint};
use crate::core::{Rating, RatingsSource, ServiceResolver, UserRatings};
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct UserRatingPayload {
    #[serde(rename = "userRating")]
    user_rating: Option<Vec<RatingPayload>>,
}

#[derive(Debug, Deserialize)]
struct RatingPayload {
    #[serde(rename = "movieId")]
    movie_id: String,
    rating: i32,
}

/// Reads a user's ratings from `GET {base}/ratingsdata/users/{userId}`.
pub struct HttpRatingsClient {
    client: Client,
    resolver: Arc<dyn ServiceResolver>,
    service: String,
    timeout: Duration,
}

impl HttpRatingsClient {
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
impl RatingsSource for HttpRatingsClient {
    async fn fetch_ratings(&self, user_id: &str) -> Result<UserRatings> {
        self.fetch_ratings_within(user_id, None).await
    }

    async fn fetch_ratings_within(
        &self,
        user_id: &str,
        budget: Option<Duration>,
    ) -> Result<UserRatings> {
        let base = self.resolver.resolve(&self.service)?;
        let url = endpoint(&self.service, &base, &["ratingsdata", "users", user_id])?;

        tracing::debug!("Requesting ratings: {}", url);
        let response = self
            .client
            .get(url)
            .timeout(call_timeout(self.timeout, budget))
            .send()
            .await
            .map_err(|e| CatalogError::unavailable(&self.service, e.to_string()))?;

        let status = response.status();
        tracing::debug!("Ratings response status: {}", status);
        if !status.is_success() {
            return Err(CatalogError::unavailable(
                &self.service,
                format!("HTTP {}", status),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::unavailable(&self.service, e.to_string()))?;
        let payload: UserRatingPayload = serde_json::from_slice(&body)
            .map_err(|e| CatalogError::malformed(&self.service, e.to_string()))?;

        payload
            .user_rating
            .unwrap_or_default()
            .into_iter()
            .map(|r| {
                if r.movie_id.trim().is_empty() {
                    Err(CatalogError::malformed(
                        &self.service,
                        "rating entry has an empty movieId",
                    ))
                } else {
                    Ok(Rating::new(r.movie_id, r.rating))
                }
            })
            .collect()
    }
}
