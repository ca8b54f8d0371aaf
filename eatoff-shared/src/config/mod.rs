//! # Configuration
//!
//! Client configuration resolved from defaults, an optional file, environment
//! variables, and command-line overrides.

/// Client settings and their sources.
pub mod client;

pub use client::{ClientConfig, ConfigError, ConfigFormat};
