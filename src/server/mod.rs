pub mod app;
pub mod handlers;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::ServiceConfig;
use crate::services::OpenDataService;

pub async fn start_server(port: u16, config: &ServiceConfig, cors_origin: Option<&str>) -> Result<()> {
    let service = OpenDataService::new(Arc::new(config.source()), &config.base_url);
    let app = app::create_app(service, cors_origin)?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                             - Health check");
    info!("  /api/v2/open-data/{{uuid}}/schema     - Table schemas for a form");
    info!("  /api/v2/open-data/{{uuid}}/data       - Streamed rows (?gt_id=N, ?count=true)");
}
