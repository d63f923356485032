use crate::core::policy::FailurePolicy;
use crate::core::{CatalogItem, CatalogResponse, ConfigProvider, MetadataSource, RatingsSource};
use crate::utils::error::{CatalogError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// Builds a user's catalog from their ratings and per-item metadata.
///
/// The ratings lookup runs first and alone. Metadata lookups then fan out,
/// at most `max_in_flight` at a time, and the result keeps the ratings order.
pub struct CatalogAggregator {
    ratings: Arc<dyn RatingsSource>,
    metadata: Arc<dyn MetadataSource>,
    policy: FailurePolicy,
    max_in_flight: Option<usize>,
    request_timeout: Option<Duration>,
}

impl CatalogAggregator {
    pub fn new(ratings: Arc<dyn RatingsSource>, metadata: Arc<dyn MetadataSource>) -> Self {
        Self {
            ratings,
            metadata,
            policy: FailurePolicy::default(),
            max_in_flight: Some(DEFAULT_MAX_IN_FLIGHT),
            request_timeout: None,
        }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(
        ratings: Arc<dyn RatingsSource>,
        metadata: Arc<dyn MetadataSource>,
        config: &C,
    ) -> Self {
        Self::new(ratings, metadata)
            .with_policy(config.failure_policy())
            .with_max_in_flight(config.max_in_flight())
            .with_request_timeout(config.request_timeout())
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `None` lets every lookup run at once.
    pub fn with_max_in_flight(mut self, max_in_flight: Option<usize>) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub async fn build(&self, user_id: &str) -> Result<CatalogResponse> {
        let Some(timeout) = self.request_timeout else {
            return self.aggregate(user_id, None).await;
        };

        let started = Instant::now();
        let deadline = started + timeout;
        match tokio::time::timeout(timeout, self.aggregate(user_id, Some(deadline))).await {
            Ok(result) => result,
            Err(_) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                tracing::warn!(user_id, elapsed_ms, "Catalog build hit its deadline");
                Err(CatalogError::DeadlineExceeded { elapsed_ms })
            }
        }
    }

    async fn aggregate(&self, user_id: &str, deadline: Option<Instant>) -> Result<CatalogResponse> {
        let ratings = self
            .ratings
            .fetch_ratings_within(user_id, remaining(deadline))
            .await?;
        tracing::debug!(user_id, ratings = ratings.len(), "Fetched user ratings");

        if ratings.is_empty() {
            return Ok(Vec::new());
        }

        let limit = self.max_in_flight.unwrap_or(ratings.len()).max(1);
        let policy = self.policy;
        let metadata = &self.metadata;

        // Dropping the stream on the first error cancels the lookups still in flight.
        let mut indexed: Vec<(usize, CatalogItem)> = stream::iter(ratings.into_iter().enumerate())
            .map(|(index, rating)| async move {
                let outcome = metadata
                    .fetch_metadata_within(&rating.item_id, remaining(deadline))
                    .await;
                policy.combine(&rating, outcome).map(|item| (index, item))
            })
            .buffer_unordered(limit)
            .try_collect()
            .await?;

        indexed.sort_unstable_by_key(|(index, _)| *index);

        tracing::info!(
            user_id,
            items = indexed.len(),
            policy = %policy,
            "Catalog assembled"
        );

        Ok(indexed.into_iter().map(|(_, item)| item).collect())
    }
}

/// What is left of the deadline, handed to clients as their per-call timeout.
fn remaining(deadline: Option<Instant>) -> Option<Duration> {
    deadline.map(|d| d.saturating_duration_since(Instant::now()))
}
