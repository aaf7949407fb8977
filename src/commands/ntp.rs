//! Network time commands (`AT+CNTP`)
//!
//! `AT+CNTP` answers `OK` at once and reports the outcome later in a
//! separate `+CNTP: <code>` line, so `sync_time` uses a deferred shape.

use std::time::Duration;

use crate::engine::Engine;
use crate::error::Result;
use crate::protocol::ResponseShape;

use super::{field, first_fields, parse_int, run};

/// Outcome code of a time synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NtpResult {
    Succeeded,
    UnknownError,
    WrongParameter,
    WrongDateTime,
    NetworkError,
    TimezoneError,
    TimeoutError,
    Other(i32),
}

impl NtpResult {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => NtpResult::Succeeded,
            1 => NtpResult::UnknownError,
            2 => NtpResult::WrongParameter,
            3 => NtpResult::WrongDateTime,
            4 => NtpResult::NetworkError,
            5 => NtpResult::TimezoneError,
            6 => NtpResult::TimeoutError,
            other => NtpResult::Other(other),
        }
    }

    pub fn is_success(self) -> bool {
        self == NtpResult::Succeeded
    }
}

/// Current NTP settings, from `AT+CNTP?`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NtpConfig {
    pub host: String,

    /// Time zone in quarters of an hour
    pub timezone_quarters: i32,
}

/// Configure the NTP server (`AT+CNTP="<host>",<tz>`)
///
/// The modem counts time zones in 15 minute steps.
pub fn set_ntp_server(engine: &Engine, host: &str, timezone_hours: i32) -> Result<()> {
    let command = format!("AT+CNTP=\"{}\",{}", host, timezone_hours * 4);
    run(engine, &command, ResponseShape::Terminal, Duration::ZERO).map(|_| ())
}

/// Read the NTP settings (`AT+CNTP?`)
pub fn ntp_config(engine: &Engine) -> Result<NtpConfig> {
    let reply = run(engine, "AT+CNTP?", ResponseShape::values("+CNTP"), Duration::ZERO)?;
    let payload = reply.require_value()?;
    let fields = first_fields(&reply)?;

    Ok(NtpConfig {
        host: field(&fields, 0, payload)?.to_string(),
        timezone_quarters: parse_int(field(&fields, 1, payload)?, payload)?,
    })
}

/// Synchronize the modem clock and wait for the outcome
///
/// `timeout` covers both the `OK` and the later `+CNTP:` line.
pub fn sync_time(engine: &Engine, timeout: Duration) -> Result<NtpResult> {
    let reply = run(engine, "AT+CNTP", ResponseShape::deferred("+CNTP"), timeout)?;
    let payload = reply.require_value()?;
    let fields = first_fields(&reply)?;
    let result = NtpResult::from_code(parse_int(field(&fields, 0, payload)?, payload)?);

    if !result.is_success() {
        tracing::warn!("Time synchronization failed: {:?}", result);
    }

    Ok(result)
}
