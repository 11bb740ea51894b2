//! Error taxonomy shared by the pipeline and the HTTP surface.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Rejected input. Raised before any pipeline stage runs, so nothing is
    /// generated or persisted for the request.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The org's release quota is exhausted.
    #[error("release quota exhausted for org {org_id}")]
    QuotaExceeded { org_id: Uuid },

    /// A pipeline stage failed. The release is marked `error`; the caller
    /// decides whether to resubmit, there is no automatic retry.
    #[error("generation failed in {stage} stage")]
    Generation {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("storage failure")]
    Storage(#[source] anyhow::Error),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn generation(stage: &'static str, source: anyhow::Error) -> Self {
        Self::Generation { stage, source }
    }

    /// Stage label for generation failures, used by metrics and the stored
    /// release record.
    #[must_use]
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Self::Generation { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Error::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_FAILED",
                msg.clone(),
            ),
            Error::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            Error::QuotaExceeded { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "QUOTA_EXCEEDED",
                self.to_string(),
            ),
            Error::Generation { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GENERATION_FAILED",
                self.to_string(),
            ),
            Error::Storage(_) | Error::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
