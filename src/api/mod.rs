//! HTTP surface: `GET /catalog/:user_id` and `GET /health`.

use crate::adapters::{
    metadata_http::HttpMetadataClient, ratings_http::HttpRatingsClient, resolver::StaticResolver,
};
use crate::core::aggregator::CatalogAggregator;
use crate::core::{CatalogResponse, ConfigProvider, ServiceResolver};
use crate::utils::error::{CatalogError, ErrorKind, Result};
use crate::utils::validation::validate_socket_addr;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<CatalogAggregator>,
}

impl AppState {
    pub fn new(aggregator: CatalogAggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }

    /// Wires the HTTP clients and the aggregator from configuration.
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let resolver: Arc<dyn ServiceResolver> = Arc::new(StaticResolver::from_config(config)?);
        let timeout = config.client_timeout();

        let ratings = HttpRatingsClient::new(resolver.clone(), config.ratings_service(), timeout)?;
        let metadata = HttpMetadataClient::new(resolver, config.metadata_service(), timeout)?;

        let aggregator =
            CatalogAggregator::from_config(Arc::new(ratings), Arc::new(metadata), config);
        Ok(Self::new(aggregator))
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/catalog/:user_id", get(get_catalog))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let addr = validate_socket_addr("bind", bind)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Catalog service listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Catalog service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn get_catalog(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> std::result::Result<Json<CatalogResponse>, CatalogError> {
    let catalog = state.aggregator.build(&user_id).await?;
    Ok(Json(catalog))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::UpstreamUnavailable | ErrorKind::UpstreamMalformedResponse => {
            StatusCode::BAD_GATEWAY
        }
        ErrorKind::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::ItemNotFound => StatusCode::NOT_FOUND,
        ErrorKind::ServiceNotRegistered => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Configuration | ErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = status_for(self.kind());
        if status.is_server_error() {
            tracing::error!(status = %status, "Catalog request failed: {}", self);
        } else {
            tracing::warn!(status = %status, "Catalog request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
