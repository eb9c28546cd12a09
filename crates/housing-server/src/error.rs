//! Application error types and Axum response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use housing_core::PredictError;
use housing_model::CsvError;
use serde::Serialize;

/// Application-level errors with HTTP status code mapping.
#[derive(Debug)]
pub enum AppError {
    ModelNotLoaded,
    BadRequest(String),
    MissingColumns(Vec<String>),
    Internal(String),
}

impl From<PredictError> for AppError {
    fn from(e: PredictError) -> Self {
        match e {
            PredictError::ArtifactsNotLoaded(_) => AppError::ModelNotLoaded,
            PredictError::MissingColumns(cols) => AppError::MissingColumns(cols),
            PredictError::MalformedRequest(msg) => AppError::BadRequest(msg),
            PredictError::TransformOrPredictFailure(msg) => AppError::Internal(msg),
        }
    }
}

impl From<CsvError> for AppError {
    fn from(e: CsvError) -> Self {
        AppError::Internal(e.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_columns: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, missing_columns) = match self {
            AppError::ModelNotLoaded => {
                (StatusCode::SERVICE_UNAVAILABLE, "Model not loaded".to_string(), None)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::MissingColumns(cols) => (
                StatusCode::BAD_REQUEST,
                PredictError::MissingColumns(cols.clone()).to_string(),
                Some(cols),
            ),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        };
        (status, Json(ErrorResponse { error, missing_columns })).into_response()
    }
}
