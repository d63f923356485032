pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use api::AppState;
pub use config::toml_config::TomlConfig;
pub use crate::core::{aggregator::CatalogAggregator, policy::FailurePolicy};
pub use utils::error::{CatalogError, ErrorKind, Result};
