//! Packet domain commands
//!
//! PDP context definition (`AT+CGDCONT`), activation (`AT+CGACT`) and
//! packet service attach (`AT+CGATT`).

use std::fmt;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::{ModemError, Result};
use crate::protocol::{split_values, Classification, ResponseShape};

use super::{field, first_fields, parse_int, run};

/// Address family of a PDP context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdpType {
    Ip,
    Ipv6,
    Ipv4v6,
}

impl PdpType {
    pub fn as_str(self) -> &'static str {
        match self {
            PdpType::Ip => "IP",
            PdpType::Ipv6 => "IPV6",
            PdpType::Ipv4v6 => "IPV4V6",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "IP" => Some(PdpType::Ip),
            "IPV6" => Some(PdpType::Ipv6),
            "IPV4V6" => Some(PdpType::Ipv4v6),
            _ => None,
        }
    }
}

impl fmt::Display for PdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One PDP context definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdpContext {
    /// Context identifier (1..=24 on most modems)
    pub cid: u8,

    pub pdp_type: PdpType,

    /// Access point name; empty lets the network choose
    pub apn: String,
}

impl PdpContext {
    pub fn new(cid: u8, pdp_type: PdpType, apn: impl Into<String>) -> Self {
        Self {
            cid,
            pdp_type,
            apn: apn.into(),
        }
    }

    /// Command defining this context: `AT+CGDCONT=<cid>,"<type>","<apn>"`
    ///
    /// An APN containing `"` cannot be quoted and is rejected.
    pub fn to_command(&self) -> Result<String> {
        if self.apn.contains('"') {
            return Err(ModemError::InvalidArgument(format!(
                "APN contains a quote: {}",
                self.apn
            )));
        }
        Ok(format!(
            "AT+CGDCONT={},\"{}\",\"{}\"",
            self.cid, self.pdp_type, self.apn
        ))
    }

    /// Parse the payload of a `+CGDCONT:` line
    ///
    /// Accepts `<cid>,"<type>","<apn>"` followed by any number of extra
    /// fields (address, compression flags), which are ignored.
    pub fn parse(payload: &str) -> Result<Self> {
        let malformed = || ModemError::response(Classification::Malformed, Some(payload.to_string()));
        let fields = split_values(payload);

        let cid = field(&fields, 0, payload)?
            .trim()
            .parse::<u8>()
            .map_err(|_| malformed())?;
        let pdp_type = PdpType::parse(field(&fields, 1, payload)?).ok_or_else(malformed)?;
        let apn = fields.get(2).copied().unwrap_or_default().to_string();

        Ok(Self { cid, pdp_type, apn })
    }
}

/// Activation state of one context, from `AT+CGACT?`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdpState {
    pub cid: u8,
    pub active: bool,
}

// =============================================================================
// Commands
// =============================================================================

/// Define (or redefine) a PDP context
pub fn define_pdp_context(engine: &Engine, context: &PdpContext) -> Result<()> {
    let command = context.to_command()?;
    run(engine, &command, ResponseShape::Terminal, Duration::ZERO).map(|_| ())
}

/// List every defined PDP context (`AT+CGDCONT?`)
pub fn pdp_contexts(engine: &Engine) -> Result<Vec<PdpContext>> {
    let reply = run(engine, "AT+CGDCONT?", ResponseShape::values("+CGDCONT"), Duration::ZERO)?;
    reply.values.iter().map(|v| PdpContext::parse(v)).collect()
}

/// Activate or deactivate a context (`AT+CGACT=<state>,<cid>`)
pub fn set_pdp_active(engine: &Engine, cid: u8, active: bool) -> Result<()> {
    let command = format!("AT+CGACT={},{}", u8::from(active), cid);
    run(engine, &command, ResponseShape::Terminal, Duration::ZERO).map(|_| ())
}

/// Activation state of every context (`AT+CGACT?`)
pub fn pdp_states(engine: &Engine) -> Result<Vec<PdpState>> {
    let reply = run(engine, "AT+CGACT?", ResponseShape::values("+CGACT"), Duration::ZERO)?;

    reply
        .values
        .iter()
        .map(|payload| -> Result<PdpState> {
            let fields = split_values(payload);
            let cid = parse_int(field(&fields, 0, payload)?, payload)?;
            let state = parse_int(field(&fields, 1, payload)?, payload)?;
            let cid = u8::try_from(cid).map_err(|_| {
                ModemError::response(Classification::Malformed, Some(payload.clone()))
            })?;
            Ok(PdpState {
                cid,
                active: state == 1,
            })
        })
        .collect()
}

/// True if attached to the packet domain service (`AT+CGATT?`)
pub fn packet_attached(engine: &Engine) -> Result<bool> {
    let reply = run(engine, "AT+CGATT?", ResponseShape::values("+CGATT"), Duration::ZERO)?;
    let payload = reply.require_value()?;
    let fields = first_fields(&reply)?;

    Ok(parse_int(field(&fields, 0, payload)?, payload)? == 1)
}

/// Attach to or detach from the packet domain service (`AT+CGATT=<state>`)
pub fn set_packet_attach(engine: &Engine, attach: bool) -> Result<()> {
    let command = format!("AT+CGATT={}", u8::from(attach));
    run(engine, &command, ResponseShape::Terminal, Duration::ZERO).map(|_| ())
}
