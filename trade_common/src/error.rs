//! Error types shared by the trade stream client.
//!
//! `TailError` covers the whole failure taxonomy of a tail session: startup
//! configuration, dialing, inbound decoding, transport reads and writes, and
//! local I/O. Transport errors are carried as strings so this crate does not
//! depend on a particular websocket implementation.
use std::io;

use thiserror::Error;

/// Unified error type for a tail session.
#[derive(Error, Debug)]
pub enum TailError {
    /// Missing or invalid startup configuration (token, endpoint, interval, symbols file).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Dial or websocket handshake failure.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Inbound text payload that is not a well-formed protocol message.
    #[error("Protocol decode error: {0}")]
    ProtocolDecode(String),

    /// Read-side failure of the connection (closed, reset, framing error).
    #[error("Transport read error: {0}")]
    TransportRead(String),

    /// Write-side failure while sending a frame on the connection.
    #[error("Send failed: {0}")]
    Send(String),

    /// I/O error, typically while writing records to standard output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// A spawned task panicked or was cancelled before reporting.
    #[error("Task failed: {0}")]
    Task(String),
}

impl TailError {
    /// Returns `true` for errors detected before any connection attempt.
    pub fn is_configuration(&self) -> bool {
        matches!(self, TailError::Configuration(_))
    }
}
