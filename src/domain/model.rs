use serde::{Deserialize, Serialize};

/// One user's score for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub item_id: String,
    pub rating_value: i32,
}

impl Rating {
    pub fn new(item_id: impl Into<String>, rating_value: i32) -> Self {
        Self {
            item_id: item_id.into(),
            rating_value,
        }
    }
}

/// Ratings in the order the ratings provider returned them.
pub type UserRatings = Vec<Rating>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    pub description: String,
    #[serde(rename = "rating")]
    pub rating_value: i32,
}

impl CatalogItem {
    pub fn from_parts(rating: &Rating, metadata: ItemMetadata) -> Self {
        Self {
            name: metadata.name,
            description: metadata.description,
            rating_value: rating.rating_value,
        }
    }

    /// Stand-in for an item whose metadata could not be fetched.
    pub fn placeholder(rating: &Rating) -> Self {
        Self::from_parts(rating, ItemMetadata::default())
    }
}

pub type CatalogResponse = Vec<CatalogItem>;
