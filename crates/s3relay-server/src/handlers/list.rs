use crate::AppState;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use s3relay_core::RelayError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "bucketName")]
    pub bucket_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListedFile {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "URL")]
    pub url: String,
}

/// GET /list-files?bucketName=...
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<ListedFile>>, RelayError> {
    let Query(query) = query.map_err(|e| RelayError::InvalidParameter(e.body_text()))?;
    let bucket = query
        .bucket_name
        .filter(|b| !b.is_empty())
        .ok_or_else(RelayError::missing_bucket_name)?;

    let objects = state.store.list_objects(&bucket).await.inspect_err(|_| {
        metrics::counter!(crate::metrics::UPSTREAM_FAILURES, "operation" => "list_objects")
            .increment(1);
    })?;
    tracing::debug!(bucket = %bucket, count = objects.len(), "listed objects");

    Ok(Json(
        objects
            .into_iter()
            .map(|object| ListedFile {
                url: state.urls.object_url(&bucket, &object.key),
                key: object.key,
            })
            .collect(),
    ))
}
