//! Framer Module
//!
//! Turns the raw serial byte stream into discrete response lines.
//!
//! ## Responsibilities
//! - Accumulate bytes into a bounded line buffer
//! - Emit a line on every linefeed, with trailing CR/LF trimmed
//! - Suppress blank (or whitespace-only) separator lines
//! - Emit a prompt frame as soon as the modem sends `>`
//!
//! ## Framing Rules
//! ```text
//!   "+CSQ: 20,99\r\n"   ->  Line("+CSQ: 20,99")
//!   "\r\n"              ->  (nothing)
//!   "\r\n> "            ->  Prompt("")        then " " stays buffered
//! ```
//!
//! Overlong lines are truncated to the buffer capacity; framing resumes on
//! the next linefeed.
//!
//! ## Whitespace-only Lines
//! Only CR and LF are trimmed, yet a line made of nothing but spaces or
//! tabs is dropped as well, not emitted as `" "`. This deliberately goes
//! beyond dropping lines that are empty after the CR/LF trim: the space a
//! modem sends after a `> ` prompt would otherwise reach the response queue
//! as a line of its own and desynchronize the next read. A caller that
//! needs a whitespace-only line cannot get it from this framer.

mod line;

pub use line::{Frame, LineFramer, PROMPT_MARKER};
