use std::fmt::{Display, Formatter};

use ocr_table_core::TableError;
use worker::{Response, Result};

use crate::models::ErrorResponse;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error during OCR processing";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    PayloadTooLarge(String),
    Unavailable(String),
    Upstream(String),
    Parse(String),
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Unavailable(_) => "service_unavailable",
            Self::Upstream(_) => "upstream_error",
            Self::Parse(_) => "parse_error",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::PayloadTooLarge(message)
            | Self::Unavailable(message)
            | Self::Upstream(message)
            | Self::Parse(message)
            | Self::Internal(message) => message,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::PayloadTooLarge(_) => 413,
            Self::Unavailable(_) => 503,
            Self::Upstream(_) => 502,
            Self::Parse(_) => 422,
            Self::Internal(_) => 500,
        }
    }

    /// Internal failures get a generic message; the cause is only exposed
    /// as `details` when `debug` is set.
    pub fn to_error_response(&self, debug: bool) -> ErrorResponse {
        match self {
            Self::Internal(message) => ErrorResponse {
                code: self.code().to_string(),
                error: INTERNAL_ERROR_MESSAGE.to_string(),
                details: debug.then(|| message.clone()),
            },
            _ => ErrorResponse {
                code: self.code().to_string(),
                error: self.message().to_string(),
                details: None,
            },
        }
    }

    pub fn into_response(self, debug: bool) -> Result<Response> {
        if let Self::Internal(message) = &self {
            worker::console_error!("request failed: {message}");
        }
        let response = Response::from_json(&self.to_error_response(debug))?;
        Ok(response.with_status(self.status_code()))
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<worker::Error> for ApiError {
    fn from(error: worker::Error) -> Self {
        Self::Internal(error.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(error: url::ParseError) -> Self {
        Self::Unavailable(format!("OCR engine URL is invalid: {error}"))
    }
}

impl From<TableError> for ApiError {
    fn from(error: TableError) -> Self {
        match error {
            TableError::Json(error) => Self::Parse(error.to_string()),
            TableError::InvalidOption(message) => Self::BadRequest(message),
            TableError::Io(_) | TableError::Csv(_) => Self::Internal(error.to_string()),
        }
    }
}
