use axum::{
    Json,
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::clients::chat::ChatError;
use crate::services::{ApplicantError, AuthError, TokenError, UserError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    ConstraintViolation(String),

    UploadError(String),

    /// Login could not complete; the detail is surfaced in `error`.
    LoginFailed(String),

    TokenIssuance(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ExternalApiError { service, message } => {
                write!(f, "{} error: {}", service, message)
            }
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::ConstraintViolation(msg) => write!(f, "Constraint violation: {}", msg),
            ApiError::UploadError(msg) => write!(f, "Upload error: {}", msg),
            ApiError::LoginFailed(msg) => write!(f, "Login failed: {}", msg),
            ApiError::TokenIssuance(msg) => write!(f, "Token issuance failed: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Status, top-level message and optional detail for the envelope.
    fn parts(&self) -> (StatusCode, String, Option<String>) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "A database error occurred".to_string(),
                    None,
                )
            }
            ApiError::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{} request failed", service),
                    Some(message.clone()),
                )
            }
            ApiError::ValidationError(msg) | ApiError::ConstraintViolation(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone(), None)
            }
            ApiError::UploadError(msg) => {
                tracing::error!("Upload error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Image upload failed".to_string(),
                    Some(msg.clone()),
                )
            }
            ApiError::LoginFailed(msg) => (
                StatusCode::UNAUTHORIZED,
                "Failed to login".to_string(),
                Some(msg.clone()),
            ),
            ApiError::TokenIssuance(msg) => {
                tracing::error!("Token issuance failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to login".to_string(),
                    Some(msg.clone()),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, error) = self.parts();
        let body = ApiResponse::<()>::error(message, error);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::EmailTaken | UserError::InUse(_) => {
                ApiError::ConstraintViolation(err.to_string())
            }
            UserError::Validation(msg) => ApiError::ValidationError(msg),
            UserError::Database(msg) => ApiError::DatabaseError(msg),
            UserError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::UserNotFound(_) => ApiError::LoginFailed(err.to_string()),
            AuthError::Validation(msg) => ApiError::ValidationError(msg),
            AuthError::Token(e) => ApiError::TokenIssuance(e.to_string()),
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<ApplicantError> for ApiError {
    fn from(err: ApplicantError) -> Self {
        match err {
            ApplicantError::Validation(msg) => ApiError::ValidationError(msg),
            ApplicantError::UnknownUser(_) => ApiError::ValidationError(err.to_string()),
            ApplicantError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ApplicantError::Upload(e) => ApiError::UploadError(e.to_string()),
            ApplicantError::Persistence(msg) | ApplicantError::Database(msg) => {
                ApiError::DatabaseError(msg)
            }
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        ApiError::ExternalApiError {
            service: "Chat".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Unauthorized(format!("Invalid token: {err}"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::ValidationError(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::ValidationError(format!("Invalid multipart body: {}", rejection.body_text()))
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApplicantId, UserId};

    fn status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn user_errors_map_to_statuses() {
        assert_eq!(
            status(UserError::NotFound(UserId::new(1)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status(UserError::EmailTaken.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(UserError::InUse(UserId::new(1)).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(UserError::Database("locked".into()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn auth_errors_map_to_unauthorized() {
        assert_eq!(
            status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(AuthError::UserNotFound("a@x.com".into()).into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(AuthError::Token(TokenError::Creation("bad key".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn applicant_errors_map_to_statuses() {
        assert_eq!(
            status(ApplicantError::Validation("Invalid user_id".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(ApplicantError::UnknownUser(9).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(ApplicantError::NotFound(ApplicantId::new(9)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(ApplicantError::Persistence("rolled back".into()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn chat_errors_are_bad_gateway() {
        assert_eq!(
            status(ChatError::EmptyResponse.into()),
            StatusCode::BAD_GATEWAY
        );
    }
}
