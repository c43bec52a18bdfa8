use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::account::errors::AccountError;
use crate::account::errors::AccountErrorKind;

pub mod current_account;
pub mod login;
pub mod register;
pub mod validate_token;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        let message = err.public_message();
        match err.kind() {
            AccountErrorKind::Validation => ApiError::BadRequest(message),
            AccountErrorKind::Duplicate => ApiError::Conflict(message),
            AccountErrorKind::Authentication => ApiError::Unauthorized(message),
            AccountErrorKind::Inactive => ApiError::Forbidden(message),
            AccountErrorKind::Unexpected => {
                tracing::error!(error = %err, "Request failed");
                ApiError::InternalServerError(message)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::errors::AccountField;
    use crate::account::errors::EmailError;

    #[test]
    fn test_account_error_status_mapping() {
        assert_eq!(
            ApiError::from(AccountError::InvalidEmail(EmailError::Empty)),
            ApiError::BadRequest("Email is required".to_string())
        );
        assert_eq!(
            ApiError::from(AccountError::DuplicateAccount {
                field: AccountField::Username,
                value: "alice".to_string(),
            }),
            ApiError::Conflict("Account with username 'alice' already exists".to_string())
        );
        assert_eq!(
            ApiError::from(AccountError::NotFound("ghost@example.com".to_string())),
            ApiError::Unauthorized("Invalid email or password".to_string())
        );
        assert_eq!(
            ApiError::from(AccountError::Inactive),
            ApiError::Forbidden("Account is inactive".to_string())
        );
        assert_eq!(
            ApiError::from(AccountError::DatabaseError("pool timed out".to_string())),
            ApiError::InternalServerError("Something went wrong".to_string())
        );
    }
}
