//! HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error};

use crate::auth::{AuthError, RegistrationError};
use crate::messages::MessageError;

/// Error returned by handlers and the auth middleware.
///
/// Bodies carry fixed messages; the underlying reason is logged when the
/// error is converted, never sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Forbidden,
    InvalidCredentials,
    ServiceUnavailable,
    Internal,
}

/// Error body: `{ "status": 401, "message": "unauthorized" }`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::BadRequest(message) => message.clone(),
            Self::Unauthorized => "unauthorized".to_string(),
            Self::Forbidden => "forbidden".to_string(),
            Self::InvalidCredentials => "invalid username or password".to_string(),
            Self::ServiceUnavailable => "service unavailable".to_string(),
            Self::Internal => "internal server error".to_string(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status().as_u16(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            status: status.as_u16(),
            message: self.message(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized(reason) => {
                debug!("Rejected request: {}", reason);
                Self::Unauthorized
            }
            AuthError::Forbidden(reason) => {
                debug!("Refused request: {}", reason);
                Self::Forbidden
            }
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Internal(cause) => {
                error!("Auth internal error: {}", cause);
                Self::Internal
            }
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::InvalidUsername => Self::bad_request("invalid username"),
            RegistrationError::InvalidPassword => Self::bad_request("invalid password"),
            RegistrationError::UserExists => Self::bad_request("user already exists"),
            RegistrationError::Internal(cause) => {
                error!("Registration failed: {}", cause);
                Self::Internal
            }
        }
    }
}

impl From<MessageError> for ApiError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::Auth(e) => e.into(),
            MessageError::InvalidType(_) => Self::bad_request("invalid message type"),
            MessageError::UnknownUser(_) => Self::bad_request("user not found"),
            MessageError::Storage(cause) => {
                error!("Message storage failed: {}", cause);
                Self::Internal
            }
        }
    }
}
