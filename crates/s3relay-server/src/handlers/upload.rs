use crate::AppState;
use axum::Json;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use futures::future::join_all;
use s3relay_core::{PutObject, RelayError};
use serde::Serialize;
use std::sync::Arc;

pub const FILES_FIELD: &str = "files";
pub const BUCKET_FIELD: &str = "bucketName";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub urls: Vec<String>,
}

struct UploadedFile {
    file_name: String,
    declared_content_type: Option<String>,
    data: axum::body::Bytes,
}

#[derive(Default)]
struct UploadForm {
    bucket: Option<String>,
    files: Vec<UploadedFile>,
}

fn invalid(e: MultipartError) -> RelayError {
    RelayError::InvalidMultipart(e.body_text())
}

impl UploadForm {
    async fn read(mut multipart: Multipart, max_files: usize) -> Result<Self, RelayError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(invalid)? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);

            match (name.as_str(), file_name) {
                (BUCKET_FIELD, None) => {
                    form.bucket = Some(field.text().await.map_err(invalid)?);
                }
                (FILES_FIELD, Some(file_name)) => {
                    if form.files.len() == max_files {
                        return Err(RelayError::InvalidMultipart(format!(
                            "Too many files: at most {max_files} per request"
                        )));
                    }
                    let declared_content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await.map_err(invalid)?;
                    form.files.push(UploadedFile {
                        file_name,
                        declared_content_type,
                        data,
                    });
                }
                (FILES_FIELD, None) => {
                    return Err(RelayError::InvalidMultipart(format!(
                        "Every part of field {FILES_FIELD} must carry a filename"
                    )));
                }
                (other, Some(_)) => {
                    return Err(RelayError::InvalidMultipart(format!(
                        "Unexpected file field {other:?}"
                    )));
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

/// POST /upload (multipart: bucketName + files)
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, RelayError> {
    // A body that is not multipart at all cannot carry a bucket name.
    let multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "upload request is not multipart");
            return Err(RelayError::missing_bucket_name());
        }
    };

    let form = UploadForm::read(multipart, state.config.max_files).await?;
    let bucket = form
        .bucket
        .filter(|b| !b.is_empty())
        .ok_or_else(RelayError::missing_bucket_name)?;

    let objects: Vec<PutObject> = form
        .files
        .into_iter()
        .map(|file| {
            let object = PutObject::public_inline(&bucket, file.file_name, file.data);
            tracing::info!(
                bucket = %bucket,
                key = %object.key,
                size_bytes = object.body.len(),
                content_type = %object.content_type,
                declared_content_type = file.declared_content_type.as_deref().unwrap_or("none"),
                "forwarding file"
            );
            object
        })
        .collect();

    let keys: Vec<String> = objects.iter().map(|o| o.key.clone()).collect();
    let total_bytes: u64 = objects.iter().map(|o| o.body.len() as u64).sum();

    // Wait for every put to settle before answering, even after a failure.
    let results = join_all(objects.into_iter().map(|o| state.store.put_object(o))).await;

    let mut first_failure = None;
    for (key, result) in keys.iter().zip(results) {
        if let Err(e) = result {
            metrics::counter!(crate::metrics::UPSTREAM_FAILURES, "operation" => "put_object")
                .increment(1);
            tracing::error!(bucket = %bucket, key = %key, error = %e, "store failed");
            if first_failure.is_none() {
                first_failure = Some(e);
            }
        }
    }
    if let Some(e) = first_failure {
        return Err(e);
    }

    metrics::counter!(crate::metrics::OBJECTS_UPLOADED).increment(keys.len() as u64);
    metrics::counter!(crate::metrics::BYTES_UPLOADED).increment(total_bytes);
    tracing::info!(bucket = %bucket, files = keys.len(), total_bytes, "upload complete");

    let urls = keys
        .iter()
        .map(|key| state.urls.object_url(&bucket, key))
        .collect();
    Ok(Json(UploadResponse { urls }))
}
