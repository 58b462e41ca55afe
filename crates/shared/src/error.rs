use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NETWORK_ERROR: &str = "Network error";
pub const MALFORMED_BODY: &str = "Malformed response body";
pub const NOT_AUTHENTICATED: &str = "Not authenticated";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Network,
    MalformedBody,
    Http,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400 | 422 => Self::Validation,
            _ => Self::Http,
        }
    }

    pub fn requires_login(self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Typed failure surfaced when a caller converts an envelope into a `Result`.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{code:?}: {message}")]
pub struct ApiException {
    pub code: ErrorCode,
    pub status: Option<u16>,
    pub message: String,
    pub error: Option<String>,
}

impl ApiException {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status: None,
            message: message.into(),
            error: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    pub fn requires_login(&self) -> bool {
        self.code.requires_login()
    }
}

impl From<ApiException> for ApiError {
    fn from(value: ApiException) -> Self {
        Self {
            code: value.code,
            message: value.message,
        }
    }
}
