use axum::{
    body::{Body, Bytes},
    extract::{rejection::QueryRejection, Path, Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::io;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::ApiError;
use crate::export::to_json::JsonArrayChunks;
use crate::export::TableSchema;
use crate::server::app::AppState;
use crate::source::SubmissionFilter;

/// Encoded rows buffered between the producer and the response body.
const STREAM_BUFFER: usize = 64;

#[derive(Deserialize, Debug, Default)]
pub struct DataQuery {
    pub gt_id: Option<i64>,
    #[serde(default)]
    pub count: bool,
}

fn parse_uuid(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidUuid(raw.to_string()))
}

/// Run a blocking store operation off the async runtime.
async fn blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError::Internal(format!("Worker task failed: {}", e)))?
}

pub async fn schema(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<Vec<TableSchema>>, ApiError> {
    let uuid = parse_uuid(&uuid)?;
    let service = state.service.clone();

    let schemas = blocking(move || Ok(service.schema(&uuid)?)).await?;
    Ok(Json(schemas))
}

pub async fn data(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    query: Result<Query<DataQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let uuid = parse_uuid(&uuid)?;
    let Query(query) = query.map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))?;
    let filter = SubmissionFilter {
        gt_id: query.gt_id,
    };
    let service = state.service.clone();

    if query.count {
        let count = blocking(move || Ok(service.count(&uuid, filter)?)).await?;
        return Ok(Json(json!({ "count": count })).into_response());
    }

    // Resolve the entry and open the store before committing to a 200.
    let rows = blocking(move || Ok(service.rows(&uuid, filter)?)).await?;

    let (tx, rx) = mpsc::channel::<Result<Bytes, io::Error>>(STREAM_BUFFER);
    tokio::task::spawn_blocking(move || {
        let mut emitted = 0usize;
        for chunk in JsonArrayChunks::new(rows) {
            let chunk = chunk.map(Bytes::from).map_err(|err| {
                error!("Export of open data {} failed: {}", uuid, err);
                io::Error::new(io::ErrorKind::Other, err.to_string())
            });
            let failed = chunk.is_err();

            if tx.blocking_send(chunk).is_err() {
                debug!("Client went away after {} chunk(s) of {}", emitted, uuid);
                return;
            }
            if failed {
                return;
            }
            emitted += 1;
        }
        info!("Finished streaming open data {}", uuid);
    });

    let body = Body::from_stream(ReceiverStream::new(rx));
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
