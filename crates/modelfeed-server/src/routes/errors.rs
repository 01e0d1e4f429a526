use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use modelfeed::FeedError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ErrorResponse {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: StatusCode::NOT_FOUND,
        }
    }

    pub(crate) fn unavailable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "message": self.message,
        }));

        (self.status, body).into_response()
    }
}

impl From<FeedError> for ErrorResponse {
    fn from(err: FeedError) -> Self {
        match err {
            // Not yet initialized is distinct from "no models matched":
            // the latter is a 200 with an empty list.
            FeedError::ManifestNotFound => Self::unavailable(err.to_string()),
            FeedError::UpstreamUnavailable(_) => Self::unavailable(err.to_string()),
            FeedError::MalformedManifest(_) | FeedError::Storage(_) => {
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for ErrorResponse {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON serialization error: {}", err))
    }
}

impl From<anyhow::Error> for ErrorResponse {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}
