//! Error handling - every failure leaves as an error envelope.

use actix_web::{HttpResponse, ResponseError, error::JsonPayloadError, http::StatusCode, web};
use grove_core::error::{DomainError, RepoError};
use grove_core::ports::AuthError;
use grove_shared::{ErrorResponse, ErrorType, Message};

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{}", .0.join(", "))]
    BadRequest(Vec<String>),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn envelope(&self) -> ErrorResponse {
        match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(messages) => ErrorResponse::param(messages.clone()),
            AppError::Auth(AuthError::Misconfigured(_)) => ErrorResponse::unknown(),
            AppError::Auth(e) => ErrorResponse::auth(Message::error(e)),
            AppError::Conflict(detail) => ErrorResponse::new("409", ErrorType::ParamError, [detail]),
            AppError::Internal(_) => ErrorResponse::unknown(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::Misconfigured(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Internal(detail) => tracing::error!(error = %detail, "Internal error"),
            AppError::Auth(AuthError::Misconfigured(detail)) => {
                tracing::error!(error = %detail, "Authentication misconfigured")
            }
            other => tracing::debug!(error = %other, "Request rejected"),
        }

        HttpResponse::build(self.status_code()).json(self.envelope())
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => AppError::NotFound(err.to_string()),
            DomainError::Validation(messages) => AppError::BadRequest(messages),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized => AppError::Auth(AuthError::MissingAuth),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        DomainError::from(err).into()
    }
}

/// JSON extractor settings: malformed bodies become `ParamError`s.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req| {
        AppError::BadRequest(vec!["request body mismatch".to_string(), err.to_string()]).into()
    })
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, ErrorResponse) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_rt::test]
    async fn test_validation_is_param_error() {
        let err: AppError = DomainError::Validation(vec!["name is required".to_string()]).into();
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.errors[0].code, "400");
        assert_eq!(body.errors[0].error_type, ErrorType::ParamError);
        assert_eq!(body.errors[0].messages, vec!["name is required"]);
    }

    #[actix_rt::test]
    async fn test_auth_failure_is_401() {
        let (status, body) = body_of(AuthError::MissingAuth.into()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.errors[0].code, "401");
        assert_eq!(body.errors[0].error_type, ErrorType::AuthError);
        assert_eq!(
            body.errors[0].messages,
            vec!["Bearer token was not found in Authorization header"]
        );
    }

    #[actix_rt::test]
    async fn test_not_found_is_404() {
        let err: AppError = DomainError::not_found("fruit", 3).into();
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.errors[0].error_type, ErrorType::NotFoundError);
        assert_eq!(body.errors[0].messages, vec!["data not found for fruit id = 3"]);
    }

    #[actix_rt::test]
    async fn test_internal_detail_is_hidden() {
        let (status, body) = body_of(AppError::Internal("db password wrong".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.errors[0].error_type, ErrorType::UnknownError);
        assert!(!body.errors[0].messages[0].contains("password"));
    }
}
