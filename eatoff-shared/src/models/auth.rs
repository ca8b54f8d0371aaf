//! Login payloads.

use serde::{Deserialize, Serialize};

use super::Customer;

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plain password; redacted from `Debug` output.
    pub password: String,
    /// Asks the backend to issue a bearer session token alongside the cookie.
    #[serde(default)]
    pub mobile: bool,
}

impl LoginRequest {
    /// Request that asks for a bearer token.
    #[must_use]
    pub fn mobile(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            mobile: true,
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("mobile", &self.mobile)
            .finish()
    }
}

/// Response of `POST /auth/login`.
///
/// Some backend versions omit `success` and signal the outcome through the
/// presence of `customer`, so an absent flag is not read as failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Explicit outcome flag, when sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    /// Human-readable outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Profile of the signed-in customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,

    /// Bearer token, issued for mobile logins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl LoginResponse {
    /// Whether the payload reports success and carries a profile.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success != Some(false) && self.customer.is_some()
    }

    /// Consume the response, yielding the profile and token on success.
    #[must_use]
    pub fn into_profile(self) -> Option<(Customer, Option<String>)> {
        if self.success == Some(false) {
            return None;
        }
        let token = self.session_token.filter(|token| !token.is_empty());
        self.customer.map(|customer| (customer, token))
    }
}
