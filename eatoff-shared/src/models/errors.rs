//! Error bodies sent by the backend.

use serde::{Deserialize, Serialize};

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// The main error message
    pub message: String,
    /// Optional additional details about the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Creates a new error response with just a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    /// Parses an error body, returning `None` when it is not the expected
    /// JSON shape or carries an empty message.
    #[must_use]
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str::<Self>(body)
            .ok()
            .filter(|error| !error.message.trim().is_empty())
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {}", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ErrorResponse {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_from_backend_body() {
        let error = ErrorResponse::from_body(r#"{"message":"Invalid email or password"}"#).unwrap();
        assert_eq!(error, ErrorResponse::new("Invalid email or password"));
        assert_eq!(error.to_string(), "Invalid email or password");
    }

    #[test]
    fn test_error_response_rejects_other_bodies() {
        assert!(ErrorResponse::from_body("<html>Bad Gateway</html>").is_none());
        assert!(ErrorResponse::from_body(r#"{"message":"  "}"#).is_none());
        assert!(ErrorResponse::from_body("").is_none());
    }

    #[test]
    fn test_error_response_display_with_details() {
        let error = ErrorResponse {
            message: "Login failed".into(),
            details: Some("database unavailable".into()),
        };
        assert_eq!(error.to_string(), "Login failed: database unavailable");
    }
}
