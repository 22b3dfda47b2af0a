use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::content::ContentError;
use crate::ideas::IdeasError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `MISSING_LABEL`,
    /// `MISSING_TYPE`, `INVALID_FIELD_TYPE`, `TOKEN_MISSING`, `TOKEN_INVALID`,
    /// `PERMISSION_DENIED`, `NOT_FOUND`, `DUPLICATE_SLUG`, `UNRESOLVABLE_TYPE`,
    /// `CROSS_ORGANISATION_REFERENCE`, `PAYLOAD_TOO_LARGE`, `UPSTREAM_ERROR`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "INVALID_FIELD_TYPE")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Field 'Nested': invalid type 'banner'")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// Field schema rejected; carries the specific code.
    FieldSchema {
        code: &'static str,
        message: String,
    },
    TokenMissing,
    TokenInvalid,
    PermissionDenied,
    NotFound(String),
    DuplicateSlug(String),
    UnresolvableType(String),
    CrossOrganisation(String),
    PayloadTooLarge(String),
    /// An external service failed or timed out.
    Upstream(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::FieldSchema { code, message } => {
                (StatusCode::BAD_REQUEST, ErrorBody { code, message })
            }
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: "Insufficient permissions".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::DuplicateSlug(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "DUPLICATE_SLUG",
                    message: msg,
                },
            ),
            AppError::UnresolvableType(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    code: "UNRESOLVABLE_TYPE",
                    message: msg,
                },
            ),
            AppError::CrossOrganisation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    code: "CROSS_ORGANISATION_REFERENCE",
                    message: msg,
                },
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    code: "PAYLOAD_TOO_LARGE",
                    message: msg,
                },
            ),
            AppError::Upstream(detail) => {
                tracing::warn!("Upstream error: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        code: "UPSTREAM_ERROR",
                        message: "An upstream service failed to respond".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::NotFound("File not found".into()),
            StorageError::InvalidPath(_) => AppError::NotFound("File not found".into()),
            StorageError::SizeLimitExceeded { .. } => AppError::PayloadTooLarge(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::FieldSchema(e) => AppError::FieldSchema {
                code: e.code(),
                message: e.to_string(),
            },
            ContentError::DuplicateSlug { .. } => AppError::DuplicateSlug(err.to_string()),
            ContentError::UnresolvableType(_) => AppError::UnresolvableType(err.to_string()),
            ContentError::CrossOrganisationReference(_) => {
                AppError::CrossOrganisation(err.to_string())
            }
            ContentError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            ContentError::Validation(msg) => AppError::Validation(msg),
            ContentError::Storage(e) => e.into(),
            ContentError::Db(e) => e.into(),
        }
    }
}

impl From<IdeasError> for AppError {
    fn from(err: IdeasError) -> Self {
        AppError::Upstream(err.to_string())
    }
}
