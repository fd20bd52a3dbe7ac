use std::sync::Arc;

use axum::{routing::get, Json, Router};
use client::CatalogClient;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

pub mod service_types;

/// Shared handler state: the catalog client is constructed once at startup
/// and reused for every request.
#[derive(Clone)]
pub struct ServerState {
    pub client: Arc<dyn CatalogClient>,
    pub tenant: String,
    pub environment: String,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let api = Router::new()
        .route(
            "/api/servicetypes",
            get(service_types::list).put(service_types::replace),
        )
        .route(
            "/api/servicetypes/csv",
            get(service_types::export_csv).post(service_types::import_csv),
        );

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
