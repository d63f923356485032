pub mod aggregator;
pub mod policy;

pub use crate::domain::model::{
    CatalogItem, CatalogResponse, ItemMetadata, Rating, UserRatings,
};
pub use crate::domain::ports::{ConfigProvider, MetadataSource, RatingsSource, ServiceResolver};
pub use crate::utils::error::Result;
