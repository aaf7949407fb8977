//! # atmodem
//!
//! An AT-command engine for cellular modems with:
//! - Line framing of the raw serial byte stream (including `>` prompts)
//! - Inclusion-first routing of unsolicited lines away from responses
//! - A bounded, overwrite-oldest response queue
//! - Synchronous, one-at-a-time command exchange with timeouts
//! - A catalog of typed helpers for common commands
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Callers / commands::* helpers                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ execute / send_and_wait (command lock)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Engine (dispatcher)                          │
//! │      write ──► transport        wait ◄── completion signal   │
//! └──────────┬──────────────────────────────────▲───────────────┘
//!            │                                  │
//!            ▼                                  │
//!   ┌─────────────┐                     ┌───────┴─────┐
//!   │  Transport  │                     │  Response   │
//!   │ (UART/TCP)  │                     │   Queue     │
//!   └──────┬──────┘                     └───────▲─────┘
//!          │ bytes (reader thread)              │ response lines
//!          ▼                                    │
//!   ┌─────────────┐     lines          ┌────────┴────┐
//!   │ LineFramer  ├───────────────────►│ Classifier  ├──► unsolicited
//!   └─────────────┘                    └─────────────┘     channel
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use atmodem::{commands, Config, Engine, TcpTransport};
//!
//! let transport = TcpTransport::connect("127.0.0.1:4000", Duration::from_secs(1))?;
//! let engine = Engine::start(Config::default(), transport)?;
//!
//! let quality = commands::status::signal_quality(&engine)?;
//! println!("rssi {} ({:?} dBm)", quality.rssi, quality.dbm());
//! # Ok::<(), atmodem::ModemError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod framer;
pub mod queue;
pub mod protocol;
pub mod transport;
pub mod engine;
pub mod commands;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ModemError, Result};
pub use config::Config;
pub use engine::{Engine, Transaction};
pub use protocol::{Classification, Reply, ResponseLine, ResponseShape, Status};
pub use transport::{MockTransport, TcpTransport, Transport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of atmodem
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
