use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, RepositoryError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::Domain(err) => match &err {
                DomainError::ValidationError { field, message } => ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("{}: {}", field, message),
                ),
                DomainError::ResourceNotFound { .. } => {
                    ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
                }
                DomainError::PermissionDenied { .. } => {
                    ApiError::new(StatusCode::FORBIDDEN, "PERMISSION_DENIED", err.to_string())
                }
                DomainError::BusinessRuleViolation { .. } => ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "BUSINESS_RULE_VIOLATION",
                    err.to_string(),
                ),
            },
            ApplicationError::Repository(repo_err) => match repo_err {
                RepositoryError::NotFound => ApiError::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    "requested resource not found",
                ),
                RepositoryError::Conflict => {
                    ApiError::new(StatusCode::CONFLICT, "CONFLICT", "resource already exists")
                }
                RepositoryError::Storage { message } => {
                    tracing::error!(error = %message, "持久化失败");
                    ApiError::new(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "STORAGE_ERROR",
                        format!("storage error: {}", message),
                    )
                }
            },
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApplicationError::from(DomainError::validation_error("title", "too long")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApplicationError::not_found("chat", "42"),
                StatusCode::NOT_FOUND,
            ),
            (
                ApplicationError::from(DomainError::permission_denied("delete chat")),
                StatusCode::FORBIDDEN,
            ),
            (
                ApplicationError::from(RepositoryError::Conflict),
                StatusCode::CONFLICT,
            ),
            (
                ApplicationError::from(RepositoryError::storage("down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status(), expected);
        }
    }
}
