//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::AreaId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4002,
///     "message": "parking area 3 is full",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status                  |
/// |-----------|---------------------|------------------------------|
/// | 1000–1999 | Validation          | 400 Bad Request              |
/// | 2000–2999 | State/Not Found     | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server/Storage      | 500 Internal Server Error    |
/// | 4000–4999 | Business rejections | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed: malformed or missing fields.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Signal references a user that was never registered.
    #[error("unknown user: {0}")]
    UnknownUser(uuid::Uuid),

    /// No parking area with the given id exists.
    #[error("parking area not found: {0}")]
    AreaNotFound(AreaId),

    /// No parking area with the given name exists.
    #[error("parking area not found: {0:?}")]
    AreaNameNotFound(String),

    /// An area with the same name already exists.
    #[error("parking area name already taken: {0:?}")]
    DuplicateAreaName(String),

    /// No user with the given username exists.
    #[error("user not found: {0:?}")]
    UserNotFound(String),

    /// No event with the given id exists.
    #[error("parking event not found: {0}")]
    EventNotFound(i64),

    /// The reported coordinate falls inside no known area polygon.
    #[error("location ({longitude}, {latitude}) is outside any parking area")]
    OutsideAnyArea {
        /// Reported longitude.
        longitude: f64,
        /// Reported latitude.
        latitude: f64,
    },

    /// Park rejected: the area has no free slot.
    #[error("parking area {0} is full")]
    AreaFull(AreaId),

    /// Leave rejected: every slot in the area is already free.
    #[error("parking area {0} is already empty")]
    AreaEmpty(AreaId),

    /// Backing-store failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidInput(_) => 1001,
            Self::UnknownUser(_) => 1002,
            Self::AreaNotFound(_) | Self::AreaNameNotFound(_) => 2001,
            Self::DuplicateAreaName(_) => 2002,
            Self::UserNotFound(_) => 2003,
            Self::EventNotFound(_) => 2004,
            Self::OutsideAnyArea { .. } => 4001,
            Self::AreaFull(_) => 4002,
            Self::AreaEmpty(_) => 4003,
            Self::Storage(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::UnknownUser(_) => StatusCode::BAD_REQUEST,
            Self::AreaNotFound(_)
            | Self::AreaNameNotFound(_)
            | Self::UserNotFound(_)
            | Self::EventNotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateAreaName(_) => StatusCode::CONFLICT,
            Self::OutsideAnyArea { .. } | Self::AreaFull(_) | Self::AreaEmpty(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn capacity_rejections_map_to_422() {
        assert_eq!(
            GatewayError::AreaFull(AreaId::new(1)).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            GatewayError::AreaEmpty(AreaId::new(1)).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            GatewayError::OutsideAnyArea {
                longitude: 50.0,
                latitude: 50.0
            }
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn unknown_user_is_bad_request() {
        let err = GatewayError::UnknownUser(uuid::Uuid::new_v4());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1002);
    }

    #[test]
    fn duplicate_name_is_conflict() {
        let err = GatewayError::DuplicateAreaName("piazza".to_string());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_fault_is_server_error() {
        let err = GatewayError::Storage("connection reset".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), 3001);
    }
}
