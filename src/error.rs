// src/error.rs

use std::fmt;

/// Global client error enum.
/// Every failure of a bulletin action ends up as one of these variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    // Request never produced a response (connectivity, timeout)
    Network(String),

    // Non-2xx status, or a 2xx body carrying `ok: false`
    Server {
        status: Option<u16>,
        message: String,
    },

    // Response body is not the JSON we expected
    Parse(String),

    // Rejected locally before any request was sent
    Validation(String),

    // Missing or malformed configuration
    Config(String),
}

impl AppError {
    /// Text shown in the transient, dismissible notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(_) => "Network error, please try again.".to_string(),
            AppError::Server { message, .. } => message.clone(),
            AppError::Parse(_) => "The server sent an unreadable response.".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Config(msg) => format!("Configuration error: {}", msg),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Network(msg) => write!(f, "network error: {}", msg),
            AppError::Server {
                status: Some(status),
                message,
            } => write!(f, "server error ({}): {}", status, message),
            AppError::Server {
                status: None,
                message,
            } => write!(f, "server error: {}", message),
            AppError::Parse(msg) => write!(f, "parse error: {}", msg),
            AppError::Validation(msg) => write!(f, "validation error: {}", msg),
            AppError::Config(msg) => write!(f, "config error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Transport failures only; status handling happens in the API layer.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Parse(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(err.to_string())
    }
}
