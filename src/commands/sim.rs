//! SIM card commands (`AT+CPIN?`)

use std::time::Duration;

use crate::engine::Engine;
use crate::error::Result;
use crate::protocol::ResponseShape;

use super::run;

/// What the SIM is waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinStatus {
    Ready,
    SimPin,
    SimPuk,
    PhoneSimPin,
    SimPin2,
    SimPuk2,
    PhoneNetPin,
    /// Any code this crate does not know
    Other(String),
}

impl PinStatus {
    /// Parse the `<code>` text of a `+CPIN:` line
    pub fn parse(code: &str) -> Self {
        match code.trim() {
            "READY" => PinStatus::Ready,
            "SIM PIN" => PinStatus::SimPin,
            "SIM PUK" => PinStatus::SimPuk,
            "PH-SIM PIN" => PinStatus::PhoneSimPin,
            "SIM PIN2" => PinStatus::SimPin2,
            "SIM PUK2" => PinStatus::SimPuk2,
            "PH-NET PIN" => PinStatus::PhoneNetPin,
            other => PinStatus::Other(other.to_string()),
        }
    }

    pub fn is_ready(&self) -> bool {
        *self == PinStatus::Ready
    }
}

/// Query the SIM PIN state (`AT+CPIN?`)
pub fn pin_status(engine: &Engine) -> Result<PinStatus> {
    let reply = run(engine, "AT+CPIN?", ResponseShape::values("+CPIN"), Duration::ZERO)?;
    let status = PinStatus::parse(reply.require_value()?);

    if let PinStatus::Other(code) = &status {
        tracing::warn!("Unrecognized SIM PIN code: {}", code);
    }

    Ok(status)
}
