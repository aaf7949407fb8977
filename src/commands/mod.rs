//! Command Catalog
//!
//! Typed helpers for common modem commands. Each helper is a thin caller of
//! [`Engine::execute`] with a fixed [`ResponseShape`]; parsing the payload
//! is the only work done here.
//!
//! ## Layout
//! ```text
//! commands
//! ├── (basic)   AT, ATE0/1, *ATREADY
//! ├── status    AT+CSQ, AT+CFUN
//! ├── network   AT+CREG, AT+CGREG
//! ├── sim       AT+CPIN
//! ├── packet    AT+CGDCONT, AT+CGACT
//! └── ntp       AT+CNTP
//! ```

pub mod network;
pub mod ntp;
pub mod packet;
pub mod sim;
pub mod status;

use std::time::Duration;

use crate::engine::Engine;
use crate::error::{ModemError, Result};
use crate::protocol::{split_values, Classification, Reply, ResponseShape};

/// Timeout for the `AT` liveness probe
const PROBE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Timeout for the boot-time `*ATREADY` line
const READY_TIMEOUT: Duration = Duration::from_millis(10_000);

// =============================================================================
// Basic Commands
// =============================================================================

/// Check that the modem answers `AT` with `OK`
pub fn probe(engine: &Engine) -> Result<()> {
    run(engine, "AT", ResponseShape::Terminal, PROBE_TIMEOUT).map(|_| ())
}

/// Turn command echo on or off (`ATE1` / `ATE0`)
pub fn set_echo(engine: &Engine, enable: bool) -> Result<()> {
    let command = format!("ATE{}", u8::from(enable));
    run(engine, &command, ResponseShape::Terminal, Duration::ZERO).map(|_| ())
}

/// Wait for the modem to announce `*ATREADY: 1` after power-up
pub fn wait_ready(engine: &Engine) -> Result<()> {
    let line = engine.wait_unsolicited("*ATREADY", READY_TIMEOUT).map_err(|e| {
        tracing::error!("Modem not ready: {}", e);
        e
    })?;

    let payload = payload_after_colon(&line)?;
    let code = parse_int(payload, &line)?;
    if code != 1 {
        tracing::error!("Modem reported not ready: {}", line);
        return Err(ModemError::CommandError(line));
    }

    Ok(())
}

/// Send any command and keep every line up to its terminal line
///
/// Works for commands answering with bare lines (`AT+CGMI`, `AT+CGSN`) as
/// well as `+KEYWORD:` lines. An error status is returned in the reply,
/// not as an error.
pub fn raw(engine: &Engine, command: &str, timeout: Duration) -> Result<Reply> {
    engine.execute(command, ResponseShape::Lines, timeout)
}

// =============================================================================
// Helpers
// =============================================================================

/// Execute a command and turn an error status into `CommandError`
pub(crate) fn run(
    engine: &Engine,
    command: &str,
    shape: ResponseShape,
    timeout: Duration,
) -> Result<Reply> {
    engine
        .execute(command, shape, timeout)
        .and_then(Reply::into_result)
        .map_err(|e| {
            tracing::error!("{} failed: {}", command, e);
            e
        })
}

/// The first payload of a values reply, split into fields
pub(crate) fn first_fields(reply: &Reply) -> Result<Vec<&str>> {
    reply.require_value().map(split_values)
}

/// Parse one integer field, reporting the whole line on failure
pub(crate) fn parse_int(field: &str, line: &str) -> Result<i32> {
    field
        .trim()
        .parse()
        .map_err(|_| ModemError::response(Classification::Malformed, Some(line.to_string())))
}

/// Field `index` of `fields`, or a malformed-response error
pub(crate) fn field<'a>(fields: &[&'a str], index: usize, line: &str) -> Result<&'a str> {
    fields
        .get(index)
        .copied()
        .ok_or_else(|| ModemError::response(Classification::Malformed, Some(line.to_string())))
}

fn payload_after_colon(line: &str) -> Result<&str> {
    line.split_once(':')
        .map(|(_, rest)| rest.trim())
        .ok_or_else(|| ModemError::response(Classification::Malformed, Some(line.to_string())))
}
