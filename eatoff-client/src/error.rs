//! Errors raised by the API client and the preference store.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a remote API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP response was received: connect failure, timeout, reset.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Status {
        /// HTTP status received.
        status: StatusCode,
        /// Server message, or a generic one naming the code.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The endpoint URL could not be built.
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Builds a status error from a response body, preferring the server's
    /// JSON `message` and falling back to `Server error (<code>)`.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = shared::models::ErrorResponse::from_body(body).map_or_else(
            || format!("Server error ({})", status.as_u16()),
            |error| error.message,
        );
        Self::Status { status, message }
    }

    /// True when the failure happened below HTTP.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status,
                message: format!("Server error ({})", status.as_u16()),
            }
        } else {
            Self::Transport(transport_message(&err))
        }
    }
}

/// Innermost error message, which names the actual cause (e.g. connection refused).
fn transport_message(err: &reqwest::Error) -> String {
    let mut source: &dyn std::error::Error = err;
    while let Some(inner) = source.source() {
        source = inner;
    }
    let cause = source.to_string();
    if err.is_timeout() {
        format!("request timed out: {cause}")
    } else {
        cause
    }
}

/// Failure reading or writing the preference file.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The file could not be read or written.
    #[error("failed to access preferences at {path}: {source}")]
    Io {
        /// Preference file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The values could not be encoded as JSON.
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_uses_server_message() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Invalid email or password"}"#,
        );
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_status_error_falls_back_to_code() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.to_string(), "Server error (500)");

        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(err.to_string(), "Server error (502)");
    }

    #[test]
    fn test_transport_flag() {
        assert!(ApiError::Transport("connection refused".into()).is_transport());
        assert!(!ApiError::Decode("eof".into()).is_transport());
    }
}
