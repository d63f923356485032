use crate::core::policy::FailurePolicy;
use crate::domain::model::{ItemMetadata, UserRatings};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

#[async_trait]
pub trait RatingsSource: Send + Sync {
    async fn fetch_ratings(&self, user_id: &str) -> Result<UserRatings>;

    /// Same as `fetch_ratings`, bounded by what is left of the caller's deadline.
    async fn fetch_ratings_within(
        &self,
        user_id: &str,
        _budget: Option<Duration>,
    ) -> Result<UserRatings> {
        self.fetch_ratings(user_id).await
    }
}

#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_metadata(&self, item_id: &str) -> Result<ItemMetadata>;

    async fn fetch_metadata_within(
        &self,
        item_id: &str,
        _budget: Option<Duration>,
    ) -> Result<ItemMetadata> {
        self.fetch_metadata(item_id).await
    }
}

/// Maps a logical service name to the base address it currently lives at.
pub trait ServiceResolver: Send + Sync {
    fn resolve(&self, service_name: &str) -> Result<Url>;
}

pub trait ConfigProvider: Send + Sync {
    fn bind_address(&self) -> &str;
    fn ratings_service(&self) -> &str;
    fn metadata_service(&self) -> &str;
    /// `(service name, base url)` pairs known to this configuration.
    fn service_urls(&self) -> Vec<(String, String)>;
    fn max_in_flight(&self) -> Option<usize>;
    fn failure_policy(&self) -> FailurePolicy;
    fn request_timeout(&self) -> Option<Duration>;
    fn client_timeout(&self) -> Duration;
}
