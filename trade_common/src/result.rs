//! Result type alias shared across the workspace.
//!
//! Defaults the error type to `TailError`, so functions can simply return `Result<T>`.
use crate::error::TailError;

/// Workspace-wide `Result` alias with `TailError` as the default error.
pub type Result<T, E = TailError> = std::result::Result<T, E>;
