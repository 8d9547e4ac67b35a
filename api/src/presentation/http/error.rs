use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::error::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

pub fn status_of(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn code_of(err: &AppError) -> &'static str {
    match err {
        AppError::Validation(_) => "BAD_REQUEST",
        AppError::Authentication(_) => "UNAUTHORIZED",
        AppError::Forbidden(_) => "FORBIDDEN",
        AppError::NotFound(_) => "NOT_FOUND",
        AppError::Conflict(_) => "CONFLICT",
        AppError::Connection(_) => "SERVICE_UNAVAILABLE",
        AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
    }
}

pub(crate) fn log_error(err: &AppError) {
    match err {
        AppError::Internal(e) => tracing::error!(error = ?e, "request_failed"),
        AppError::Connection(msg) => tracing::warn!(error = %msg, "store_unavailable"),
        other => tracing::debug!(error = %other, "request_rejected"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log_error(&self);
        let body = ErrorBody {
            code: code_of(&self),
            message: self.public_message(),
        };
        (status_of(&self), Json(body)).into_response()
    }
}
