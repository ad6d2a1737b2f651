use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use cine_catalog::SeatError;
use cine_core::DirectoryError;
use cine_notify::DeliveryError;
use cine_order::CartError;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    SeatConflict(String),
    DeliveryFailed(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::SeatConflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DeliveryFailed(msg) => (
                StatusCode::BAD_GATEWAY,
                format!("{} - su carrito se conserva, intente nuevamente", msg),
            ),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<SeatError> for AppError {
    fn from(err: SeatError) -> Self {
        match err {
            SeatError::UnknownShowtime(id) => {
                AppError::NotFoundError(format!("Función no encontrada: {}", id))
            }
            // A repeated label is a malformed request, not a conflict.
            SeatError::DuplicateSeat(_) => AppError::ValidationError(err.to_string()),
            // Both conflict kinds go back to the client so they can re-select.
            SeatError::UnknownSeat(_) | SeatError::AlreadyTaken(_) => {
                AppError::SeatConflict(err.to_string())
            }
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DuplicateEmail(_) => AppError::ValidationError(err.to_string()),
            DirectoryError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            DirectoryError::Store(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<DeliveryError> for AppError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::InvalidAddress(_) => AppError::ValidationError(err.to_string()),
            DeliveryError::DeliveryFailed(msg) => AppError::DeliveryFailed(msg),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}
