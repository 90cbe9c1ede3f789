//! HTTP client for the chat backend.
//!
//! The backend exposes three endpoints: `POST /api/chat`,
//! `GET /api/health`, and `GET /api/documents/count`. All failures are
//! folded into [`ApiError`] with a category the caller can log; the
//! transcript layer shows the same apology regardless of category.

mod client;
pub mod types;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use client::ApiClient;

/// Categories of backend errors for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Connection timeout or request timeout
    Timeout,
    /// Connection-level failure (refused, DNS, TLS)
    Transport,
    /// Failed to parse the response body
    Parse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Timeout => write!(f, "timeout"),
            ApiErrorKind::Transport => write!(f, "transport"),
            ApiErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from the backend with kind and details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for logging
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error.
    ///
    /// The backend wraps handler failures as `{"detail": ...}`; when the
    /// body carries one, it is surfaced in the message.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}");
        let details = if body.is_empty() {
            None
        } else {
            if let Ok(json) = serde_json::from_str::<Value>(body) {
                if let Some(detail) = json.get("detail").and_then(|v| v.as_str()) {
                    return Self {
                        kind: ApiErrorKind::HttpStatus,
                        message: format!("HTTP {status}: {detail}"),
                        details: Some(body.to_string()),
                    };
                }
            }
            Some(body.to_string())
        };
        Self {
            kind: ApiErrorKind::HttpStatus,
            message,
            details,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Timeout, message)
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if err.is_decode() {
            Self::parse(err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}
