use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use vigil_services::auth::AuthError;
use vigil_services::calendar::DateRangeError;
use vigil_services::dao::base::DaoError;
use vigil_services::export::ExportError;

/// Where a client should send the user after an auth failure.
pub const ENTRY_PAGE: &str = "/auth";
pub const HOME_PAGE: &str = "/";

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// No usable identity; the client goes back to the entry page.
    Unauthorized(String),
    /// Identity lacks a role; the client goes back home.
    Forbidden(String),
    Conflict(String),
    Internal(String),
    Validation(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, redirect) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg, Some(ENTRY_PAGE))
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, Some(HOME_PAGE)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Internal(msg) => {
                tracing::error!(message = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg, None)
            }
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg, None)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            redirect,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DaoError> for ApiError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            DaoError::DuplicateKey(msg) => ApiError::Conflict(msg),
            DaoError::Validation(msg) => ApiError::Validation(msg),
            DaoError::Mongo(e) => ApiError::Internal(e.to_string()),
            DaoError::BsonSer(e) => ApiError::Internal(e.to_string()),
            DaoError::BsonDe(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::TokenExpired => ApiError::Unauthorized("Token expired".to_string()),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
            AuthError::SessionRevoked => {
                ApiError::Unauthorized("Session has been signed out".to_string())
            }
            AuthError::HashError(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<DateRangeError> for ApiError {
    fn from(err: DateRangeError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::EmptySelection => ApiError::NotFound(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
