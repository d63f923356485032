use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Upstream '{service}' unavailable: {message}")]
    UpstreamUnavailable { service: String, message: String },

    #[error("Upstream '{service}' returned a malformed response: {message}")]
    UpstreamMalformedResponse { service: String, message: String },

    #[error("Item not found: {item_id}")]
    ItemNotFound { item_id: String },

    #[error("Catalog build exceeded its deadline after {elapsed_ms}ms")]
    DeadlineExceeded { elapsed_ms: u64 },

    #[error("No address registered for service '{service}'")]
    ServiceNotRegistered { service: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

/// Coarse classification used when only the kind of failure matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UpstreamUnavailable,
    UpstreamMalformedResponse,
    ItemNotFound,
    DeadlineExceeded,
    ServiceNotRegistered,
    Configuration,
    Io,
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            CatalogError::UpstreamMalformedResponse { .. } => {
                ErrorKind::UpstreamMalformedResponse
            }
            CatalogError::ItemNotFound { .. } => ErrorKind::ItemNotFound,
            CatalogError::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
            CatalogError::ServiceNotRegistered { .. } => ErrorKind::ServiceNotRegistered,
            CatalogError::ConfigError { .. }
            | CatalogError::InvalidConfigValueError { .. }
            | CatalogError::MissingConfigError { .. } => ErrorKind::Configuration,
            CatalogError::IoError(_) => ErrorKind::Io,
        }
    }

    pub fn unavailable(service: &str, message: impl Into<String>) -> Self {
        CatalogError::UpstreamUnavailable {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed(service: &str, message: impl Into<String>) -> Self {
        CatalogError::UpstreamMalformedResponse {
            service: service.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
