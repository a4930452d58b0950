use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Field name to the messages rejecting it.
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,

    #[error("invalid page")]
    InvalidPage,

    #[error("invalid fields: {0:?}")]
    Validation(FieldErrors),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
            }
            ServiceError::InvalidPage => {
                (StatusCode::NOT_FOUND, Json(json!({"detail": "Invalid page."}))).into_response()
            }
            ServiceError::Validation(fields) => {
                (StatusCode::BAD_REQUEST, Json(fields)).into_response()
            }
        }
    }
}
