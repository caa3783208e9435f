//! Error taxonomy for calls to the remote API
//!
//! Every remote failure ends up as one of four kinds. Callers turn them into a
//! transient notification; nothing is retried.

use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Input rejected, either by a form schema before sending or by the server.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Token or credentials rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The request did not complete.
    #[error("Network error: {0}")]
    Network(String),

    /// Any other non-success response, or a body that could not be decoded.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl ApiError {
    /// HTTP status this error came from, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(401),
            Self::Validation(_) | Self::Network(_) => None,
        }
    }

    /// Text suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Unauthorized(msg) => msg.clone(),
            Self::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            Self::Server { message, .. } => message.clone(),
        }
    }

    /// Maps a non-success HTTP status and the server's message.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(message),
            400 | 422 => Self::Validation(message),
            _ => Self::Server { status, message },
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(describe_validation(&errors))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Server {
                status: err.status().map(|s| s.as_u16()).unwrap_or(200),
                message: format!("Malformed response: {}", err),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// One line per failing field, sorted by field name.
pub fn describe_validation(errors: &ValidationErrors) -> String {
    let mut lines: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{}: {}", field, reasons.join(", "))
        })
        .collect();
    lines.sort();
    lines.join("; ")
}
