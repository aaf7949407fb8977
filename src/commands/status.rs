//! Status control commands: signal quality and phone functionality

use std::time::Duration;

use crate::engine::Engine;
use crate::error::{ModemError, Result};
use crate::protocol::{Classification, ResponseShape};

use super::{field, first_fields, parse_int, run};

/// Result of `AT+CSQ`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalQuality {
    /// Received signal strength index (0..=31, 99 = unknown)
    pub rssi: i32,

    /// Bit error rate index (0..=7, 99 = unknown)
    pub ber: i32,
}

impl SignalQuality {
    /// Signal strength in dBm, `None` when unknown
    pub fn dbm(&self) -> Option<i32> {
        rssi_to_dbm(self.rssi)
    }

    /// Human readable bit error rate
    pub fn ber_description(&self) -> &'static str {
        ber_description(self.ber)
    }
}

/// Query signal quality (`AT+CSQ`)
pub fn signal_quality(engine: &Engine) -> Result<SignalQuality> {
    let reply = run(engine, "AT+CSQ", ResponseShape::values("+CSQ"), Duration::ZERO)?;
    let payload = reply.require_value()?;
    let fields = first_fields(&reply)?;

    Ok(SignalQuality {
        rssi: parse_int(field(&fields, 0, payload)?, payload)?,
        ber: parse_int(field(&fields, 1, payload)?, payload)?,
    })
}

/// Convert an `AT+CSQ` rssi index to dBm
///
/// 0 is -113 dBm or less, 31 is -51 dBm or more, 99 is unknown.
pub fn rssi_to_dbm(rssi: i32) -> Option<i32> {
    match rssi {
        99 => None,
        i32::MIN..=0 => Some(-113),
        1 => Some(-111),
        2..=30 => Some(-113 + 2 * rssi),
        _ => Some(-51),
    }
}

/// Describe an `AT+CSQ` bit error rate index
pub fn ber_description(ber: i32) -> &'static str {
    match ber {
        0 => "<0.01%",
        1 => "0.01%-0.1%",
        2 => "0.1%-0.5%",
        3 => "0.5%-1.0%",
        4 => "1.0%-2.0%",
        5 => "2.0%-4.0%",
        6 => "4.0%-8.0%",
        7 => ">=8.0%",
        99 => "not known or not detectable",
        _ => "invalid value",
    }
}

// =============================================================================
// Phone Functionality
// =============================================================================

/// `AT+CFUN` functionality level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Functionality {
    Minimum,
    Full,
    DisablePhone,
    FactoryTest,
    Reset,
    Offline,
}

impl Functionality {
    /// Numeric `<fun>` value
    pub fn code(self) -> u8 {
        match self {
            Functionality::Minimum => 0,
            Functionality::Full => 1,
            Functionality::DisablePhone => 4,
            Functionality::FactoryTest => 5,
            Functionality::Reset => 6,
            Functionality::Offline => 7,
        }
    }

    /// Parse a numeric `<fun>` value
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Functionality::Minimum),
            1 => Some(Functionality::Full),
            4 => Some(Functionality::DisablePhone),
            5 => Some(Functionality::FactoryTest),
            6 => Some(Functionality::Reset),
            7 => Some(Functionality::Offline),
            _ => None,
        }
    }
}

/// Query the functionality level (`AT+CFUN?`)
pub fn phone_functionality(engine: &Engine) -> Result<Functionality> {
    let reply = run(engine, "AT+CFUN?", ResponseShape::values("+CFUN"), Duration::ZERO)?;
    let payload = reply.require_value()?;
    let fields = first_fields(&reply)?;
    let code = parse_int(field(&fields, 0, payload)?, payload)?;

    Functionality::from_code(code)
        .ok_or_else(|| ModemError::response(Classification::Malformed, Some(payload.to_string())))
}

/// Set the functionality level (`AT+CFUN=<fun>,1`)
///
/// `<rst>` is always 1: the modem resets before applying the level.
pub fn set_phone_functionality(engine: &Engine, fun: Functionality) -> Result<()> {
    let command = format!("AT+CFUN={},1", fun.code());
    run(engine, &command, ResponseShape::Terminal, Duration::ZERO).map(|_| ())
}
