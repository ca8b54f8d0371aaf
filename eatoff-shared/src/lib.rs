#![cfg_attr(not(test), forbid(unsafe_code))]

//! Shared data-transfer objects and configuration for the `EatOff` client.
//!
//! The [`models`] module mirrors the JSON payloads exchanged with the `EatOff`
//! REST backend, and [`config`] resolves client settings from defaults, files
//! and environment variables.

/// Configuration loading.
pub mod config;
/// Backend payloads.
pub mod models;
