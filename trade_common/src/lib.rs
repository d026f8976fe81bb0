//!
//! Common types and utilities for tailing a real-time trade stream.
//!
//! This crate aggregates:
//! - `error` — unified error type `TailError` used across the workspace.
//! - `result` — handy `Result<T, TailError>` alias.
//! - `message` — inbound and outbound stream protocol messages.
//! - `endpoint` — stream URL template and token interpolation.
//! - `symbols` — symbol normalization and symbol-file parsing.
//! - `shutdown` — the one-shot shutdown signal shared by session tasks.
#![warn(missing_docs)]
pub mod endpoint;
pub mod error;
pub mod message;
pub mod result;
pub mod shutdown;
pub mod symbols;

pub use error::TailError;
pub use message::{InboundMessage, OutboundMessage};
pub use result::Result;
pub use shutdown::{Shutdown, ShutdownGuard, ShutdownListener};
