use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::catalog::CatalogError;
use crate::filter::CriterionParseError;
use crate::preferences::PreferenceError;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Class {0} not found")]
    NotFound(u32),
    #[error("Class {class_id} is full ({capacity} spots)")]
    CapacityExceeded { class_id: u32, capacity: u32 },
    #[error("No class is selected")]
    NoSelection,
    #[error("Class catalog is still loading")]
    CatalogLoading,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unavailable(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg).into_response(),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

impl From<StudioError> for ApiError {
    fn from(value: StudioError) -> Self {
        match value {
            StudioError::NotFound(_) => ApiError::NotFound(value.to_string()),
            StudioError::CapacityExceeded { .. } => ApiError::Conflict(value.to_string()),
            StudioError::NoSelection => ApiError::BadRequest(value.to_string()),
            StudioError::CatalogLoading => ApiError::Unavailable(value.to_string()),
            StudioError::Catalog(err) => {
                error!("Catalog error: {err}");
                ApiError::Internal("Class catalog is unavailable".into())
            }
        }
    }
}

impl From<CriterionParseError> for ApiError {
    fn from(value: CriterionParseError) -> Self {
        ApiError::BadRequest(value.to_string())
    }
}

impl From<PreferenceError> for ApiError {
    fn from(value: PreferenceError) -> Self {
        error!("Preference error: {value}");
        ApiError::Internal("Failed to store preferences".into())
    }
}
