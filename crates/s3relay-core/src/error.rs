use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("{0} is required")]
    MissingParameter(&'static str),
    #[error("{0}")]
    InvalidParameter(String),
    #[error("{0}")]
    InvalidMultipart(String),
    #[error("{message}")]
    UpstreamFailure {
        message: String,
        cause: Option<String>,
    },
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl RelayError {
    pub fn missing_bucket_name() -> Self {
        RelayError::MissingParameter("Bucket name")
    }

    pub fn upstream(message: impl Into<String>, cause: impl ToString) -> Self {
        RelayError::UpstreamFailure {
            message: message.into(),
            cause: Some(cause.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MissingParameter(_) => "MissingParameter",
            RelayError::InvalidParameter(_) => "InvalidParameter",
            RelayError::InvalidMultipart(_) => "InvalidMultipart",
            RelayError::UpstreamFailure { .. } => "UpstreamFailure",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingParameter(_)
            | RelayError::InvalidParameter(_)
            | RelayError::InvalidMultipart(_) => StatusCode::BAD_REQUEST,
            RelayError::UpstreamFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let cause = match self {
            RelayError::UpstreamFailure { cause, .. } => cause.clone(),
            _ => None,
        };
        ErrorEnvelope {
            error: self.to_string(),
            kind: self.kind(),
            cause,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, cause = ?self.envelope().cause, "request failed");
        } else {
            tracing::warn!(kind = self.kind(), error = %self, "request rejected");
        }
        (status, Json(self.envelope())).into_response()
    }
}
