//! Core error type.
//!
//! Downstream crates keep their own error enums and wrap `CoreError` as one
//! variant via `From`.

use thiserror::Error;

/// Errors raised by `evac-core` (currently only configuration validation).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `evac-core`.
pub type CoreResult<T> = Result<T, CoreError>;
