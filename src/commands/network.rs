//! Network registration commands (`AT+CREG?`, `AT+CGREG?`)

use std::fmt;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::Result;
use crate::protocol::ResponseShape;

use super::{field, first_fields, parse_int, run};

/// `<stat>` of a registration query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    NotRegistered,
    Registered,
    Searching,
    Denied,
    Unknown,
    Roaming,
    SmsOnly,
    SmsOnlyRoaming,
    Emergency,
}

impl RegistrationStatus {
    /// Parse a numeric `<stat>`; unrecognized values map to `Unknown`
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => RegistrationStatus::NotRegistered,
            1 => RegistrationStatus::Registered,
            2 => RegistrationStatus::Searching,
            3 => RegistrationStatus::Denied,
            5 => RegistrationStatus::Roaming,
            6 => RegistrationStatus::SmsOnly,
            7 => RegistrationStatus::SmsOnlyRoaming,
            11 => RegistrationStatus::Emergency,
            _ => RegistrationStatus::Unknown,
        }
    }

    /// True when registered on the home network or roaming
    pub fn is_registered(self) -> bool {
        matches!(
            self,
            RegistrationStatus::Registered
                | RegistrationStatus::Roaming
                | RegistrationStatus::SmsOnly
                | RegistrationStatus::SmsOnlyRoaming
        )
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RegistrationStatus::NotRegistered => "not registered, not searching",
            RegistrationStatus::Registered => "registered, home network",
            RegistrationStatus::Searching => "not registered, searching",
            RegistrationStatus::Denied => "registration denied",
            RegistrationStatus::Unknown => "unknown",
            RegistrationStatus::Roaming => "registered, roaming",
            RegistrationStatus::SmsOnly => "registered for SMS only, home network",
            RegistrationStatus::SmsOnlyRoaming => "registered for SMS only, roaming",
            RegistrationStatus::Emergency => "attached for emergency bearer services only",
        };
        f.write_str(text)
    }
}

/// Circuit-switched registration (`AT+CREG?`)
pub fn registration(engine: &Engine) -> Result<RegistrationStatus> {
    query(engine, "AT+CREG?", "+CREG")
}

/// Packet-switched registration (`AT+CGREG?`)
pub fn gprs_registration(engine: &Engine) -> Result<RegistrationStatus> {
    query(engine, "AT+CGREG?", "+CGREG")
}

/// Both queries answer `<n>,<stat>[,...]`; only `<stat>` is kept
fn query(engine: &Engine, command: &str, keyword: &str) -> Result<RegistrationStatus> {
    let reply = run(engine, command, ResponseShape::values(keyword), Duration::ZERO)?;
    let payload = reply.require_value()?;
    let fields = first_fields(&reply)?;
    let stat = parse_int(field(&fields, 1, payload)?, payload)?;

    Ok(RegistrationStatus::from_code(stat))
}
