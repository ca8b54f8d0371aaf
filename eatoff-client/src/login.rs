//! Credential submission state machine.
//!
//! `Idle -> Submitting -> {Success, Failed}`. Validation happens before any
//! request is issued, and a submit while a request is in flight is ignored.
//! A failed attempt accepts a new submit straight away.

use std::fmt;

use shared::models::{Customer, LoginRequest, LoginResponse};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{error::ApiError, session::SessionStore};

/// Ticket identifying one in-flight request.
pub type Ticket = u64;

/// Email and password as typed; trimmed on construction and never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Trimmed credentials.
    #[must_use]
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.trim().to_string(),
        }
    }

    /// Trimmed email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Check fields in display order; email first.
    ///
    /// # Errors
    /// The first empty field.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.email.is_empty() {
            return Err(FieldError::new(Field::Email, "Email is required"));
        }
        if self.password.is_empty() {
            return Err(FieldError::new(Field::Password, "Password is required"));
        }
        Ok(())
    }

    /// Request body asking the backend for a session token.
    #[must_use]
    pub fn to_request(&self) -> LoginRequest {
        LoginRequest::mobile(&self.email, &self.password)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Input fields of the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Email input.
    Email,
    /// Password input.
    Password,
}

/// Inline error attached to an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FieldError {
    /// Field the error belongs to.
    pub field: Field,
    /// Text shown under the field.
    pub message: &'static str,
}

impl FieldError {
    /// Error for `field`.
    #[must_use]
    pub const fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Why a login attempt did not sign the user in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    /// A field is empty; nothing was sent.
    #[error("{0}")]
    Validation(FieldError),

    /// The server answered and said no.
    #[error("Login failed: {0}")]
    Rejected(String),

    /// No answer reached us.
    #[error("Network error: {0}")]
    Network(String),

    /// Signed in remotely but the session could not be saved.
    #[error("Login failed: could not save session ({0})")]
    Storage(String),
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(message) => Self::Network(message),
            ApiError::InvalidUrl(err) => Self::Network(err.to_string()),
            other @ (ApiError::Status { .. } | ApiError::Decode(_)) => {
                Self::Rejected(other.to_string())
            }
        }
    }
}

/// Where the login form is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    /// Waiting for input.
    Idle,
    /// Login request in flight.
    Submitting {
        /// Ticket of the request.
        ticket: Ticket,
    },
    /// Connection test in flight.
    TestingConnection {
        /// Ticket of the request.
        ticket: Ticket,
    },
    /// Signed in and persisted.
    Success,
    /// Last attempt failed; a new submit is accepted.
    Failed(LoginError),
}

/// Status line under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Text of the line.
    pub message: String,
    /// Rendered as success rather than error.
    pub is_success: bool,
}

impl StatusLine {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_success: true,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_success: false,
        }
    }
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A request is already in flight; nothing happened.
    Ignored,
    /// A field failed validation; nothing was sent.
    Invalid(FieldError),
    /// Issue the login request under `ticket`.
    Started {
        /// Ticket the completion must carry.
        ticket: Ticket,
        /// Credentials to send.
        credentials: Credentials,
    },
}

/// Result of applying a login completion.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// The profile is persisted.
    SignedIn(Customer),
    /// The attempt failed.
    Failed(LoginError),
}

/// Login screen state.
#[derive(Debug)]
pub struct LoginFlow {
    session: SessionStore,
    state: LoginState,
    status: Option<StatusLine>,
    next_ticket: Ticket,
}

impl LoginFlow {
    /// Idle form writing into `session`.
    #[must_use]
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            state: LoginState::Idle,
            status: None,
            next_ticket: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &LoginState {
        &self.state
    }

    /// Status line under the form, if any.
    #[must_use]
    pub const fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    /// Whether a request is in flight; submit and connection test are disabled.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(
            self.state,
            LoginState::Submitting { .. } | LoginState::TestingConnection { .. }
        )
    }

    /// Validate the form and move to `Submitting`.
    pub fn submit(&mut self, email: &str, password: &str) -> Submission {
        if self.is_busy() {
            debug!("login submit ignored while busy");
            return Submission::Ignored;
        }

        let credentials = Credentials::new(email, password);
        if let Err(field_error) = credentials.validate() {
            self.status = Some(StatusLine::failed(field_error.message));
            self.state = LoginState::Failed(LoginError::Validation(field_error));
            return Submission::Invalid(field_error);
        }

        let ticket = self.issue_ticket();
        self.state = LoginState::Submitting { ticket };
        self.status = Some(StatusLine::ok("Logging in..."));
        info!(email = credentials.email(), ticket, "login submitted");
        Submission::Started {
            ticket,
            credentials,
        }
    }

    /// Apply the answer to the login request issued under `ticket`.
    ///
    /// Returns `None` when the ticket is not the one in flight.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<LoginResponse, ApiError>,
    ) -> Option<LoginOutcome> {
        if self.state != (LoginState::Submitting { ticket }) {
            warn!(ticket, "ignoring stale login completion");
            return None;
        }

        let outcome = match result {
            Ok(response) => self.accept(response),
            Err(err) => Err(LoginError::from(err)),
        };

        Some(match outcome {
            Ok(customer) => {
                info!(customer_id = customer.id, "login succeeded");
                self.state = LoginState::Success;
                self.status = Some(StatusLine::ok("Login successful!"));
                LoginOutcome::SignedIn(customer)
            }
            Err(err) => {
                warn!(error = %err, "login failed");
                self.status = Some(StatusLine::failed(err.to_string()));
                self.state = LoginState::Failed(err.clone());
                LoginOutcome::Failed(err)
            }
        })
    }

    fn accept(&self, response: LoginResponse) -> Result<Customer, LoginError> {
        let message = response.message.clone();
        let Some((customer, token)) = response.into_profile() else {
            return Err(LoginError::Rejected(
                message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ));
        };

        self.session
            .persist_with_token(&customer, token.as_deref())
            .map_err(|err| {
                error!(error = %err, "failed to persist session");
                LoginError::Storage(err.to_string())
            })?;
        Ok(customer)
    }

    /// Start a connection test unless a request is in flight.
    pub fn begin_connection_test(&mut self) -> Option<Ticket> {
        if self.is_busy() {
            debug!("connection test ignored while busy");
            return None;
        }
        let ticket = self.issue_ticket();
        self.state = LoginState::TestingConnection { ticket };
        self.status = Some(StatusLine::ok("Testing connection..."));
        Some(ticket)
    }

    /// Apply the answer to the connection test issued under `ticket`.
    pub fn complete_connection_test(
        &mut self,
        ticket: Ticket,
        result: Result<usize, ApiError>,
    ) -> bool {
        if self.state != (LoginState::TestingConnection { ticket }) {
            warn!(ticket, "ignoring stale connection test completion");
            return false;
        }

        self.state = LoginState::Idle;
        self.status = Some(match result {
            Ok(_) => StatusLine::ok("Connected successfully!"),
            Err(err) => StatusLine::failed(format!("Connection failed: {err}")),
        });
        true
    }

    /// Drop any in-flight request and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = LoginState::Idle;
        self.status = None;
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        self.next_ticket
    }
}
