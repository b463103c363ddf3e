use anyhow::{anyhow, Result};
use axum::{http::Method, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{health, open_data};
use crate::services::OpenDataService;

#[derive(Clone)]
pub struct AppState {
    pub service: OpenDataService,
}

pub fn create_app(service: OpenDataService, cors_origin: Option<&str>) -> Result<Router> {
    let state = AppState { service };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new().allow_origin(
            origin
                .parse::<axum::http::HeaderValue>()
                .map_err(|e| anyhow!("Invalid CORS origin: {}", e))?,
        ),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods([Method::GET, Method::OPTIONS])
    .allow_headers(Any);

    let app = Router::new()
        // Health check endpoint
        .route("/health", get(health::health_check))
        // API v2 routes
        .nest("/api/v2", api_v2_routes())
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}

fn api_v2_routes() -> Router<AppState> {
    Router::new()
        .route("/open-data/:uuid/schema", get(open_data::schema))
        .route("/open-data/:uuid/data", get(open_data::data))
}
