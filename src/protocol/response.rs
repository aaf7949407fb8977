//! Response definitions
//!
//! Per-line interpretation results and the assembled reply of a command.

use std::fmt;

use crate::error::{ModemError, Result};

use super::codec::split_values;

/// How a single popped line was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Informational line with the expected keyword; payload available
    Values,

    /// Terminal `OK`
    Ok,

    /// Terminal `ERROR`, `+CME ERROR` or `+CMS ERROR`
    Error,

    /// Keyword absent, no line available, or not a terminal line
    Unexpected,

    /// Keyword found but no colon after it
    Malformed,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Classification::Values => "values",
            Classification::Ok => "command ok",
            Classification::Error => "command error",
            Classification::Unexpected => "unexpected response",
            Classification::Malformed => "invalid response format",
        };
        f.write_str(text)
    }
}

/// One popped line together with its interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLine {
    /// The popped line, or `None` if the queue was empty
    line: Option<String>,

    /// Interpretation of the line
    classification: Classification,

    /// Byte offset of the payload inside `line`
    payload_start: usize,
}

impl ResponseLine {
    /// Line whose payload starts at `payload_start`
    pub fn values(line: String, payload_start: usize) -> Self {
        Self {
            line: Some(line),
            classification: Classification::Values,
            payload_start,
        }
    }

    /// Line without a payload
    pub fn classified(line: Option<String>, classification: Classification) -> Self {
        Self {
            line,
            classification,
            payload_start: 0,
        }
    }

    /// The popped line
    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    /// Take ownership of the popped line
    pub fn into_line(self) -> Option<String> {
        self.line
    }

    /// Interpretation of the line
    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Payload after `KEYWORD:` (a view into the popped line)
    pub fn payload(&self) -> Option<&str> {
        match (&self.line, self.classification) {
            (Some(line), Classification::Values) => line.get(self.payload_start..),
            _ => None,
        }
    }

    /// Payload split into comma separated fields
    pub fn fields(&self) -> Vec<&str> {
        self.payload().map(split_values).unwrap_or_default()
    }

    /// True for a terminal `OK`
    pub fn is_ok(&self) -> bool {
        self.classification == Classification::Ok
    }

    /// True for a terminal error
    pub fn is_error(&self) -> bool {
        self.classification == Classification::Error
    }

    /// Payload, or a protocol error describing what arrived instead
    pub fn require_payload(&self) -> Result<&str> {
        match self.classification {
            Classification::Values => self
                .payload()
                .ok_or_else(|| ModemError::response(Classification::Malformed, self.line.clone())),
            Classification::Error => Err(ModemError::CommandError(
                self.line.clone().unwrap_or_default(),
            )),
            other => Err(ModemError::response(other, self.line.clone())),
        }
    }
}

/// Terminal status of a command exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Modem answered `OK` (or sent the requested prompt)
    Ok,

    /// Modem answered with an error line
    Error(String),
}

/// Everything a command produced, assembled by `execute`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Terminal status
    pub status: Status,

    /// Payloads of the informational lines, in arrival order
    pub values: Vec<String>,

    /// Bare data lines (for `ResponseShape::Lines`)
    pub lines: Vec<String>,
}

impl Reply {
    /// Reply with the given status and nothing else
    pub fn new(status: Status) -> Self {
        Self {
            status,
            values: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// True if the command succeeded
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Turn an error status into `ModemError::CommandError`
    pub fn into_result(self) -> Result<Self> {
        match self.status {
            Status::Ok => Ok(self),
            Status::Error(line) => Err(ModemError::CommandError(line)),
        }
    }

    /// First informational payload
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// First informational payload, or a protocol error if none arrived
    pub fn require_value(&self) -> Result<&str> {
        self.first_value()
            .ok_or_else(|| ModemError::response(Classification::Unexpected, None))
    }
}
