use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use booth_catalog::CatalogError;
use booth_core::{ApiError, CoreError};
use booth_order::{CartError, SessionError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    /// Upstream failed or answered with something unusable.
    BadGateway(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    fn from_api(err: ApiError) -> Self {
        if err.is_rejection() {
            return AppError::ValidationError(err.to_string());
        }
        match err {
            ApiError::NotFound(path) => AppError::NotFoundError(format!("Not found: {}", path)),
            other => {
                tracing::warn!("Upstream failure: {}", other);
                AppError::BadGateway(other.to_string())
            }
        }
    }

    /// Maps the library error types onto HTTP semantics.
    fn classify(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ApiError>() {
            Ok(api) => return Self::from_api(api),
            Err(err) => err,
        };
        let err = match err.downcast::<CoreError>() {
            Ok(CoreError::ValidationError(msg)) => return AppError::ValidationError(msg),
            Ok(CoreError::Upstream(api)) => return Self::from_api(api),
            Err(err) => err,
        };
        let err = match err.downcast::<CartError>() {
            Ok(e @ CartError::SoldOut(_)) => return AppError::ConflictError(e.to_string()),
            Ok(e @ CartError::NotInCart(_)) => return AppError::NotFoundError(e.to_string()),
            Ok(e @ CartError::QuantityLimit { .. }) => return AppError::ValidationError(e.to_string()),
            Err(err) => err,
        };
        let err = match err.downcast::<SessionError>() {
            Ok(e @ SessionError::NotFound(_)) => return AppError::NotFoundError(e.to_string()),
            Ok(e @ SessionError::InvalidRedirect(_)) => return AppError::BadGateway(e.to_string()),
            Ok(e) => return AppError::ConflictError(e.to_string()),
            Err(err) => err,
        };
        match err.downcast::<CatalogError>() {
            Ok(e) => AppError::ValidationError(e.to_string()),
            Err(err) => AppError::Anyhow(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::classify(err.into())
    }
}
