//! Configuration for atmodem
//!
//! Centralized engine configuration with sensible defaults.

use std::time::Duration;

use crate::error::{ModemError, Result};

/// Unsolicited markers recognized out of the box
pub const DEFAULT_URC_MARKERS: &[&str] = &[
    "+CGEV:",
    "SMS",
    "+CMTI:",
    "+CMQTTCONNLOST:",
    "+CMQTTRXSTART:",
    "+CMQTTRXTOPIC:",
    "+CMQTTRXPAYLOAD:",
    "+CMQTTRXEND:",
    "RDY",
    "+CPIN: NOT INSERTED",
    "*ATREADY:",
];

/// Main configuration for an engine instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Command Configuration
    // -------------------------------------------------------------------------
    /// Timeout used when a caller passes a zero timeout (milliseconds)
    pub default_timeout_ms: u64,

    /// Encoded command length (including CR LF) must stay below this
    pub max_command_len: usize,

    /// Max raw payload written after a `>` prompt
    pub max_payload_len: usize,

    // -------------------------------------------------------------------------
    // Reader Configuration
    // -------------------------------------------------------------------------
    /// Transport receive poll timeout (milliseconds)
    pub poll_timeout_ms: u64,

    /// Sleep after a poll that returned nothing (milliseconds)
    pub idle_backoff_ms: u64,

    /// Bytes requested from the transport per poll
    pub read_chunk_len: usize,

    /// Line buffer capacity; longer lines are truncated
    pub max_response_len: usize,

    // -------------------------------------------------------------------------
    // Queue Configuration
    // -------------------------------------------------------------------------
    /// Response queue slots
    pub queue_capacity: usize,

    /// Out-of-band channel capacity for unsolicited lines
    pub unsolicited_capacity: usize,

    /// Substrings that mark a line as unsolicited
    pub urc_markers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timeout_ms: 9000,
            max_command_len: 256,
            max_payload_len: 10 * 1024,
            poll_timeout_ms: 50,
            idle_backoff_ms: 10,
            read_chunk_len: 1024,
            max_response_len: 1024,
            queue_capacity: 5,
            unsolicited_capacity: 32,
            urc_markers: DEFAULT_URC_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that every size and period is usable
    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, u64); 7] = [
            ("default_timeout_ms", self.default_timeout_ms),
            ("max_command_len", self.max_command_len as u64),
            ("max_payload_len", self.max_payload_len as u64),
            ("poll_timeout_ms", self.poll_timeout_ms),
            ("read_chunk_len", self.read_chunk_len as u64),
            ("max_response_len", self.max_response_len as u64),
            ("queue_capacity", self.queue_capacity as u64),
        ];

        for (name, value) in checks {
            if value == 0 {
                return Err(ModemError::Config(format!("{} must be non-zero", name)));
            }
        }

        if self.unsolicited_capacity == 0 {
            return Err(ModemError::Config(
                "unsolicited_capacity must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Timeout applied when a caller asks for the default
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Transport poll timeout
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// Reader backoff after an empty poll
    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }

    /// Resolve a caller timeout, mapping zero to the configured default
    pub fn resolve_timeout(&self, timeout: Duration) -> Duration {
        if timeout.is_zero() {
            self.default_timeout()
        } else {
            timeout
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the default command timeout (in milliseconds)
    pub fn default_timeout_ms(mut self, ms: u64) -> Self {
        self.config.default_timeout_ms = ms;
        self
    }

    /// Set the maximum encoded command length
    pub fn max_command_len(mut self, len: usize) -> Self {
        self.config.max_command_len = len;
        self
    }

    /// Set the maximum payload length accepted after a prompt
    pub fn max_payload_len(mut self, len: usize) -> Self {
        self.config.max_payload_len = len;
        self
    }

    /// Set the transport poll timeout (in milliseconds)
    pub fn poll_timeout_ms(mut self, ms: u64) -> Self {
        self.config.poll_timeout_ms = ms;
        self
    }

    /// Set the reader backoff after an empty poll (in milliseconds)
    pub fn idle_backoff_ms(mut self, ms: u64) -> Self {
        self.config.idle_backoff_ms = ms;
        self
    }

    /// Set how many bytes the reader requests per poll
    pub fn read_chunk_len(mut self, len: usize) -> Self {
        self.config.read_chunk_len = len;
        self
    }

    /// Set the line buffer capacity
    pub fn max_response_len(mut self, len: usize) -> Self {
        self.config.max_response_len = len;
        self
    }

    /// Set the number of response queue slots
    pub fn queue_capacity(mut self, slots: usize) -> Self {
        self.config.queue_capacity = slots;
        self
    }

    /// Set the unsolicited channel capacity
    pub fn unsolicited_capacity(mut self, slots: usize) -> Self {
        self.config.unsolicited_capacity = slots;
        self
    }

    /// Replace the unsolicited marker list
    pub fn urc_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.urc_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Add one unsolicited marker to the current list
    pub fn urc_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.urc_markers.push(marker.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
