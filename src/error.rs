//! Error types for atmodem
//!
//! Provides a unified error type for engine and command operations.
//! Per-line interpretation results are not errors; see
//! [`Classification`](crate::protocol::Classification).

use std::time::Duration;

use thiserror::Error;

use crate::protocol::Classification;

/// Result type alias using ModemError
pub type Result<T> = std::result::Result<T, ModemError>;

/// Unified error type for atmodem operations
#[derive(Debug, Error)]
pub enum ModemError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors (rejected before any I/O)
    // -------------------------------------------------------------------------
    #[error("Engine not initialized")]
    NotInitialized,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Command too long: {actual} bytes (max {max})")]
    CommandTooLong { max: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Partial write: {written} of {expected} bytes")]
    PartialWrite { written: usize, expected: usize },

    // -------------------------------------------------------------------------
    // Timeout
    // -------------------------------------------------------------------------
    #[error("Timed out after {0:?} waiting for modem")]
    Timeout(Duration),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Modem returned error: {0}")]
    CommandError(String),

    #[error("Unexpected response ({classification}): {line:?}")]
    Response {
        classification: Classification,
        line: Option<String>,
    },
}

impl ModemError {
    /// Build a protocol error from an interpreted line
    pub fn response(classification: Classification, line: Option<String>) -> Self {
        ModemError::Response {
            classification,
            line,
        }
    }

    /// True if the modem simply did not answer in time
    pub fn is_timeout(&self) -> bool {
        matches!(self, ModemError::Timeout(_))
    }
}
