#![cfg_attr(not(test), forbid(unsafe_code))]

//! # `EatOff` client core
//!
//! Session persistence, the navigation gate, the login flow and the
//! restaurant list, bound to the REST backend through [`api::RemoteApi`].
//!
//! [`app::App`] is a synchronous state machine; [`runtime::Runtime`] drives
//! it on tokio, running network calls as tasks and feeding their completions
//! back in order.

/// HTTP client for the backend.
pub mod api;
/// State machine of the client.
pub mod app;
/// Error types.
pub mod error;
/// Login form.
pub mod login;
/// Screens and routing.
pub mod navigation;
/// Key-value persistence.
pub mod preferences;
/// Restaurant list screen.
pub mod restaurants;
/// Async driver for the app.
pub mod runtime;
/// Signed-in state.
pub mod session;

#[cfg(test)]
mod app_test;

pub use api::{EatOffClient, RemoteApi};
pub use app::{App, AppAction, AppEvent};
pub use error::{ApiError, PreferenceError};
pub use login::{Credentials, LoginError, LoginFlow, LoginState};
pub use navigation::{GateDecision, NavigationGate, Navigator, Screen};
pub use preferences::{FilePreferences, MemoryPreferences, PreferenceEdit, PreferenceStore};
pub use restaurants::{Notice, RestaurantList, Selection, SelectionKind};
pub use runtime::{Frontend, Runtime};
pub use session::SessionStore;
