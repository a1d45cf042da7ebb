use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} not found: id={id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Check constraint violated: {constraint} - {cause}")]
    CheckViolation { constraint: String, cause: String },

    #[error("Uniqueness constraint violated: {constraint} - {cause}")]
    UniqueViolation { constraint: String, cause: String },

    #[error("Referenced row does not exist: {constraint} - {cause}")]
    ForeignKeyViolation { constraint: String, cause: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Connection failed: {cause}")]
    ConnectionFailed { cause: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "not_found".to_string(),
                    message: format!("{} with id {} not found", entity, id),
                    constraint: None,
                    cause: None,
                },
            ),
            AppError::CheckViolation { constraint, cause } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "check_violation".to_string(),
                    message: format!("Write rejected by check constraint '{}'", constraint),
                    constraint: Some(constraint.clone()),
                    cause: Some(cause.clone()),
                },
            ),
            AppError::UniqueViolation { constraint, cause } => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: "unique_violation".to_string(),
                    message: format!("Write rejected by unique constraint '{}'", constraint),
                    constraint: Some(constraint.clone()),
                    cause: Some(cause.clone()),
                },
            ),
            AppError::ForeignKeyViolation { constraint, cause } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "foreign_key_violation".to_string(),
                    message: format!("Write references a missing row ('{}')", constraint),
                    constraint: Some(constraint.clone()),
                    cause: Some(cause.clone()),
                },
            ),
            AppError::InvalidRequest { message } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "invalid_request".to_string(),
                    message: message.clone(),
                    constraint: None,
                    cause: None,
                },
            ),
            AppError::ConnectionFailed { cause } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse {
                    error: "connection_failed".to_string(),
                    message: "Failed to reach PostgreSQL".to_string(),
                    constraint: None,
                    cause: Some(cause.clone()),
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "internal_error".to_string(),
                    message: msg.clone(),
                    constraint: None,
                    cause: None,
                },
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Classify a PostgreSQL error by SQLSTATE so that standing-constraint
/// failures surface as client errors instead of opaque 500s.
///
/// - 23514 (check_violation): date ordering, rating range, guest counts
/// - 23505 (unique_violation): one review per (listing, reviewer)
/// - 23503 (foreign_key_violation): write against a missing listing or user
/// - 23502 (not_null_violation): missing required column
pub fn classify_db_error(code: &str, constraint: Option<&str>, message: &str) -> AppError {
    let constraint = constraint.unwrap_or("unknown").to_string();
    match code {
        "23514" => AppError::CheckViolation {
            constraint,
            cause: message.to_string(),
        },
        "23505" => AppError::UniqueViolation {
            constraint,
            cause: message.to_string(),
        },
        "23503" => AppError::ForeignKeyViolation {
            constraint,
            cause: message.to_string(),
        },
        "23502" => AppError::InvalidRequest {
            message: message.to_string(),
        },
        _ => AppError::Internal(message.to_string()),
    }
}

impl From<tokio_postgres::Error> for AppError {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            return classify_db_error(db_err.code().code(), db_err.constraint(), db_err.message());
        }
        AppError::Internal(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for AppError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        AppError::ConnectionFailed {
            cause: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_violation_is_bad_request() {
        let err = classify_db_error(
            "23514",
            Some("booking_dates_valid"),
            "new row violates check constraint",
        );
        assert!(matches!(
            &err,
            AppError::CheckViolation { constraint, .. } if constraint == "booking_dates_valid"
        ));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let err = classify_db_error(
            "23505",
            Some("review_one_per_reviewer"),
            "duplicate key value violates unique constraint",
        );
        assert!(matches!(
            &err,
            AppError::UniqueViolation { constraint, .. } if constraint == "review_one_per_reviewer"
        ));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_foreign_key_violation_is_bad_request() {
        let err = classify_db_error(
            "23503",
            Some("bookings_listing_id_fkey"),
            "insert violates foreign key constraint",
        );
        assert!(matches!(&err, AppError::ForeignKeyViolation { .. }));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_sqlstate_is_internal() {
        let err = classify_db_error("42601", None, "syntax error");
        assert!(matches!(&err, AppError::Internal(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_status() {
        let err = AppError::NotFound {
            entity: "listing",
            id: 42,
        };
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
