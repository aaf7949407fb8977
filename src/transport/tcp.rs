//! TCP transport
//!
//! Talks to a modem whose UART is exposed over TCP (ser2net and friends).

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{ModemError, Result};

use super::Transport;

/// Modem connection over a TCP serial bridge
pub struct TcpTransport {
    /// Socket shared by the reader thread and writers
    stream: TcpStream,

    /// Read timeout currently set on the socket
    read_timeout: Mutex<Option<Duration>>,

    /// Peer address for logging
    peer_addr: String,
}

impl TcpTransport {
    /// Connect to a bridge and configure the socket
    pub fn connect(addr: impl ToSocketAddrs, write_timeout: Duration) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        let transport = Self::from_stream(stream)?;

        if !write_timeout.is_zero() {
            transport.stream.set_write_timeout(Some(write_timeout))?;
        }

        Ok(transport)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Commands are tiny; don't let Nagle hold them back
        stream.set_nodelay(true)?;

        tracing::debug!("Connected to modem bridge at {}", peer_addr);

        Ok(Self {
            stream,
            read_timeout: Mutex::new(None),
            peer_addr,
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    fn set_poll_timeout(&self, poll_timeout: Duration) -> Result<()> {
        // A zero read timeout is rejected by the OS
        let wanted = Some(poll_timeout.max(Duration::from_millis(1)));

        let mut current = self.read_timeout.lock();
        if *current != wanted {
            self.stream.set_read_timeout(wanted)?;
            *current = wanted;
        }
        Ok(())
    }
}

impl Transport for TcpTransport {
    fn write(&self, bytes: &[u8]) -> Result<usize> {
        let mut stream = &self.stream;
        let written = stream.write(bytes)?;
        stream.flush()?;
        Ok(written)
    }

    fn read(&self, buf: &mut [u8], poll_timeout: Duration) -> Result<usize> {
        self.set_poll_timeout(poll_timeout)?;

        let mut stream = &self.stream;
        match stream.read(buf) {
            Ok(0) => Err(ModemError::Transport(format!(
                "connection to {} closed",
                self.peer_addr
            ))),
            Ok(n) => Ok(n),
            // Windows reports TimedOut instead of WouldBlock
            Err(ref e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                Ok(0)
            }
            Err(ref e) if e.kind() == ErrorKind::Interrupted => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn flush_input(&self) -> Result<()> {
        self.stream.set_nonblocking(true)?;

        let mut scratch = [0u8; 256];
        let mut discarded = 0usize;
        let mut stream = &self.stream;
        let outcome = loop {
            match stream.read(&mut scratch) {
                Ok(0) => break Ok(()),
                Ok(n) => discarded += n,
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => break Ok(()),
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => break Err(ModemError::from(e)),
            }
        };

        self.stream.set_nonblocking(false)?;
        tracing::trace!("Discarded {} bytes of input from {}", discarded, self.peer_addr);
        outcome
    }
}
