//! Transport Module
//!
//! Raw byte I/O between the engine and the modem.
//!
//! ## Contract
//! - `write` returns the number of bytes accepted; the engine treats a short
//!   count as a failure
//! - `read` waits at most `poll_timeout`; `Ok(0)` means nothing arrived
//! - `flush_input` discards unread input
//!
//! All methods take `&self`: the reader thread polls while callers write.
//!
//! ## Implementations
//! - [`TcpTransport`]: modem exposed through a serial-to-TCP bridge
//! - [`MockTransport`]: scripted in-memory modem for tests

mod mock;
mod tcp;

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

pub use mock::MockTransport;
pub use tcp::TcpTransport;

/// Byte stream to and from the modem
pub trait Transport: Send + Sync {
    /// Write bytes, returning how many were accepted
    fn write(&self, bytes: &[u8]) -> Result<usize>;

    /// Read into `buf`, waiting at most `poll_timeout`
    fn read(&self, buf: &mut [u8], poll_timeout: Duration) -> Result<usize>;

    /// Discard any unread input
    fn flush_input(&self) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn write(&self, bytes: &[u8]) -> Result<usize> {
        (**self).write(bytes)
    }

    fn read(&self, buf: &mut [u8], poll_timeout: Duration) -> Result<usize> {
        (**self).read(buf, poll_timeout)
    }

    fn flush_input(&self) -> Result<()> {
        (**self).flush_input()
    }
}
