//! Mock transport
//!
//! In-memory stand-in for a modem. Writes are recorded and matched against
//! scripted rules; matching rules queue reply bytes for the reader.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::error::{ModemError, Result};

use super::Transport;

/// A scripted reply to one command
#[derive(Debug, Clone)]
struct Rule {
    /// Command text without terminator
    command: String,

    /// Bytes the modem sends back
    reply: Vec<u8>,

    /// Delay before the reply appears
    delay: Option<Duration>,

    /// Remove the rule after its first match
    once: bool,
}

struct MockInner {
    /// Modem -> host byte chunks
    incoming_tx: Sender<Vec<u8>>,
    incoming_rx: Receiver<Vec<u8>>,

    /// Remainder of a chunk larger than the caller's buffer
    pending: Mutex<VecDeque<u8>>,

    /// Everything written by the host
    written: Mutex<Vec<Vec<u8>>>,

    rules: Mutex<Vec<Rule>>,

    fail_writes: AtomicBool,
    short_writes: AtomicBool,
}

/// Scripted in-memory modem
///
/// Cloning yields another handle to the same mock, so a test can keep one
/// handle while the engine owns another.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a silent mock
    pub fn new() -> Self {
        let (incoming_tx, incoming_rx) = channel::unbounded();
        Self {
            inner: Arc::new(MockInner {
                incoming_tx,
                incoming_rx,
                pending: Mutex::new(VecDeque::new()),
                written: Mutex::new(Vec::new()),
                rules: Mutex::new(Vec::new()),
                fail_writes: AtomicBool::new(false),
                short_writes: AtomicBool::new(false),
            }),
        }
    }

    /// Reply with `reply` every time `command` is written
    pub fn respond(&self, command: &str, reply: impl AsRef<[u8]>) -> &Self {
        self.add_rule(command, reply.as_ref(), None, false)
    }

    /// Reply with `reply` the next time `command` is written
    pub fn respond_once(&self, command: &str, reply: impl AsRef<[u8]>) -> &Self {
        self.add_rule(command, reply.as_ref(), None, true)
    }

    /// Reply with `reply` after `delay` every time `command` is written
    pub fn respond_delayed(&self, command: &str, reply: impl AsRef<[u8]>, delay: Duration) -> &Self {
        self.add_rule(command, reply.as_ref(), Some(delay), false)
    }

    /// Make bytes available to the reader right away
    pub fn inject(&self, bytes: impl AsRef<[u8]>) {
        // The receiver lives in `inner`, so the send cannot fail
        let _ = self.inner.incoming_tx.send(bytes.as_ref().to_vec());
    }

    /// Make bytes available to the reader after `delay`
    pub fn inject_after(&self, delay: Duration, bytes: impl AsRef<[u8]>) {
        let tx = self.inner.incoming_tx.clone();
        let bytes = bytes.as_ref().to_vec();
        thread::spawn(move || {
            thread::sleep(delay);
            let _ = tx.send(bytes);
        });
    }

    /// Everything written so far, one entry per write
    pub fn written(&self) -> Vec<String> {
        self.inner
            .written
            .lock()
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Make every following write fail
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every following write accept one byte less than offered
    pub fn short_writes(&self, short: bool) {
        self.inner.short_writes.store(short, Ordering::SeqCst);
    }

    fn add_rule(&self, command: &str, reply: &[u8], delay: Option<Duration>, once: bool) -> &Self {
        self.inner.rules.lock().push(Rule {
            command: command.trim_end_matches(['\r', '\n']).to_string(),
            reply: reply.to_vec(),
            delay,
            once,
        });
        self
    }

    fn answer(&self, written: &[u8]) {
        let text = String::from_utf8_lossy(written);
        let command = text.trim_end_matches(['\r', '\n']);

        let rule = {
            let mut rules = self.inner.rules.lock();
            let index = rules.iter().position(|r| r.command == command);
            match index {
                Some(i) if rules[i].once => Some(rules.remove(i)),
                Some(i) => Some(rules[i].clone()),
                None => None,
            }
        };

        match rule {
            Some(Rule {
                reply,
                delay: Some(delay),
                ..
            }) => self.inject_after(delay, reply),
            Some(Rule { reply, .. }) => self.inject(reply),
            None => tracing::trace!("Mock modem has no reply for {:?}", command),
        }
    }
}

impl Transport for MockTransport {
    fn write(&self, bytes: &[u8]) -> Result<usize> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(ModemError::Transport("mock write failure".to_string()));
        }

        self.inner.written.lock().push(bytes.to_vec());

        if self.inner.short_writes.load(Ordering::SeqCst) {
            return Ok(bytes.len().saturating_sub(1));
        }

        self.answer(bytes);
        Ok(bytes.len())
    }

    fn read(&self, buf: &mut [u8], poll_timeout: Duration) -> Result<usize> {
        let mut pending = self.inner.pending.lock();

        if pending.is_empty() {
            match self.inner.incoming_rx.recv_timeout(poll_timeout) {
                Ok(chunk) => pending.extend(chunk),
                Err(RecvTimeoutError::Timeout) => return Ok(0),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(ModemError::Transport("mock closed".to_string()))
                }
            }
        }

        let n = buf.len().min(pending.len());
        for (slot, byte) in buf.iter_mut().zip(pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn flush_input(&self) -> Result<()> {
        self.inner.pending.lock().clear();
        while self.inner.incoming_rx.try_recv().is_ok() {}
        Ok(())
    }
}
