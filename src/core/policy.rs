use crate::domain::model::{CatalogItem, ItemMetadata, Rating};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a failed metadata lookup affects the aggregated catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Any failed lookup fails the whole catalog.
    #[default]
    Strict,
    /// A failed lookup becomes a placeholder item and is logged.
    BestEffort,
}

impl FailurePolicy {
    /// Joins one rating with the outcome of its metadata lookup.
    pub fn combine(&self, rating: &Rating, outcome: Result<ItemMetadata>) -> Result<CatalogItem> {
        match (self, outcome) {
            (_, Ok(metadata)) => Ok(CatalogItem::from_parts(rating, metadata)),
            (FailurePolicy::Strict, Err(e)) => Err(e),
            (FailurePolicy::BestEffort, Err(e)) => {
                tracing::warn!(
                    item_id = %rating.item_id,
                    error = %e,
                    "Metadata lookup failed, serving placeholder item"
                );
                Ok(CatalogItem::placeholder(rating))
            }
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(FailurePolicy::Strict),
            "best-effort" | "best_effort" => Ok(FailurePolicy::BestEffort),
            other => Err(format!(
                "unknown failure policy '{}', expected 'strict' or 'best-effort'",
                other
            )),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Strict => write!(f, "strict"),
            FailurePolicy::BestEffort => write!(f, "best-effort"),
        }
    }
}
