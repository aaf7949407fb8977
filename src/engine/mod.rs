//! Engine Module
//!
//! The command engine that bridges the asynchronous reader to synchronous
//! callers.
//!
//! ## Responsibilities
//! - Own the transport, response queue, completion signal and reader thread
//! - Serialize commands: one exchange in flight at a time
//! - Write commands and block until a response line is queued or time runs out
//! - Interpret queued lines for callers (`read_values`, `read_ok`, ...)
//!
//! ## Flow
//! ```text
//! caller ── send_and_wait ──► reset queue ─► drain signal ─► write ─► block
//!                                                                      ▲
//! reader ── transport.read ─► LineFramer ─► Classifier ─► queue.push ─┘ signal
//! ```

mod reader;
mod transaction;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{ModemError, Result};
use crate::protocol::{
    classify_ok, classify_values, encode_command, Classification, Expectation, Reply,
    ResponseLine, ResponseShape,
};
use crate::queue::ResponseQueue;
use crate::transport::Transport;

pub use transaction::Transaction;

/// State shared between callers and the reader thread
pub(crate) struct Shared {
    config: Config,

    transport: Arc<dyn Transport>,

    /// Response lines waiting for callers (written by the reader only)
    queue: ResponseQueue,

    classifier: crate::protocol::Classifier,

    /// What the outstanding command answers with
    expectation: Mutex<Option<Expectation>>,

    /// Completion signal: bounded(1), used as a binary semaphore
    signal_tx: Sender<()>,
    signal_rx: Receiver<()>,

    /// Out-of-band unsolicited lines
    urc_tx: Sender<String>,
    urc_rx: Receiver<String>,

    /// Reader run flag; cleared by `stop`
    running: AtomicBool,
}

impl Shared {
    fn ensure_running(&self) -> Result<()> {
        if self.running.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(ModemError::NotInitialized)
        }
    }

    /// Issue a command and block until a response line is queued
    ///
    /// Order matters: queue bookkeeping is reset and stale signals drained
    /// before the write, so a late line from a previous timed-out command
    /// cannot wake this one.
    fn send_and_wait(&self, command: &str, timeout: Duration, expectation: Expectation) -> Result<()> {
        self.ensure_running()?;
        let bytes = encode_command(command, self.config.max_command_len)?;
        let timeout = self.config.resolve_timeout(timeout);

        // Step 1: Forget leftovers from the previous exchange
        self.queue.reset();

        // Step 2: Tell the reader what belongs to this command
        *self.expectation.lock() = Some(expectation);

        // Step 3: Drop any signal posted after the last caller gave up
        self.drain_signal();

        // Step 4: Write and wait
        self.write_all(&bytes)?;
        tracing::debug!("--> {}", command.trim_end());

        self.wait_signal(timeout)
    }

    /// Write payload bytes after a prompt and block for the next line
    fn send_payload(&self, payload: &[u8], timeout: Duration) -> Result<()> {
        self.ensure_running()?;

        if payload.is_empty() {
            return Err(ModemError::InvalidArgument("empty payload".to_string()));
        }
        if payload.len() > self.config.max_payload_len {
            return Err(ModemError::CommandTooLong {
                max: self.config.max_payload_len,
                actual: payload.len(),
            });
        }

        let timeout = self.config.resolve_timeout(timeout);

        self.queue.reset();
        self.drain_signal();
        self.write_all(payload)?;
        tracing::debug!("--> <{} payload bytes>", payload.len());

        self.wait_signal(timeout)
    }

    /// Block again for a line that arrives later, without writing anything
    fn wait_for_more(&self, timeout: Duration) -> Result<()> {
        self.ensure_running()?;

        // Lines queued under an already consumed signal count as "more"
        if !self.queue.is_empty() {
            return Ok(());
        }

        self.wait_signal(self.config.resolve_timeout(timeout))
    }

    fn write_all(&self, bytes: &[u8]) -> Result<()> {
        let written = self.transport.write(bytes)?;
        if written != bytes.len() {
            tracing::error!("Partial write: {} of {} bytes", written, bytes.len());
            return Err(ModemError::PartialWrite {
                written,
                expected: bytes.len(),
            });
        }
        Ok(())
    }

    fn drain_signal(&self) {
        while self.signal_rx.try_recv().is_ok() {}
    }

    fn wait_signal(&self, timeout: Duration) -> Result<()> {
        match self.signal_rx.recv_timeout(timeout) {
            Ok(()) => Ok(()),
            Err(RecvTimeoutError::Timeout) => {
                tracing::debug!("No response within {:?}", timeout);
                Err(ModemError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ModemError::NotInitialized),
        }
    }

    /// Pop the next line, waiting on the signal until `deadline`
    fn next_line(&self, deadline: Instant) -> Option<String> {
        loop {
            if let Some(line) = self.queue.try_pop() {
                return Some(line);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }

            if let Err(RecvTimeoutError::Disconnected) = self.signal_rx.recv_timeout(remaining) {
                return None;
            }
        }
    }

    // =========================================================================
    // Interpreter
    // =========================================================================

    fn read_values(&self, keyword: &str) -> ResponseLine {
        let line = match self.queue.try_pop() {
            Some(line) => line,
            None => return ResponseLine::classified(None, Classification::Unexpected),
        };

        match classify_values(&line, keyword) {
            Ok(payload) => {
                let start = line.len() - payload.len();
                ResponseLine::values(line, start)
            }
            Err(classification) => {
                tracing::debug!("Expected {} but got {} ({})", keyword, line, classification);
                ResponseLine::classified(Some(line), classification)
            }
        }
    }

    fn read_ok(&self) -> Classification {
        match self.queue.try_pop() {
            Some(line) => {
                let classification = classify_ok(&line);
                if classification != Classification::Ok {
                    tracing::debug!("Expected OK but got {} ({})", line, classification);
                }
                classification
            }
            None => Classification::Unexpected,
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.queue
            .peek()
            .map_or(false, |line| line.starts_with(keyword))
    }

    fn execute(&self, command: &str, shape: &ResponseShape, timeout: Duration) -> Result<Reply> {
        let timeout = self.config.resolve_timeout(timeout);
        let deadline = Instant::now() + timeout;

        self.send_and_wait(command, timeout, Expectation::for_shape(command, shape))?;
        transaction::collect(self, shape, deadline, timeout)
    }
}

/// Handle to one modem's command engine
///
/// ## Concurrency Model
/// - One reader thread per engine, running until `stop` or drop
/// - Commands are serialized by `command_lock`; `send_and_wait`, `execute`
///   and `send_payload` hold it for their duration, a [`Transaction`] holds
///   it for a whole exchange
/// - Queue reads (`read_values`, `read_ok`, ...) take no command lock; use
///   the transaction's own methods while holding one
pub struct Engine {
    shared: Arc<Shared>,

    /// Serializes command exchanges
    command_lock: Mutex<()>,

    reader: Mutex<Option<JoinHandle<()>>>,
}

impl Engine {
    /// Start an engine on the given transport
    ///
    /// Spawns the reader thread; the engine is ready when this returns.
    pub fn start<T: Transport + 'static>(config: Config, transport: T) -> Result<Self> {
        config.validate()?;

        let (signal_tx, signal_rx) = channel::bounded(1);
        let (urc_tx, urc_rx) = channel::bounded(config.unsolicited_capacity);

        let shared = Arc::new(Shared {
            queue: ResponseQueue::new(config.queue_capacity, config.max_response_len),
            classifier: crate::protocol::Classifier::new(config.urc_markers.clone()),
            transport: Arc::new(transport),
            expectation: Mutex::new(None),
            signal_tx,
            signal_rx,
            urc_tx,
            urc_rx,
            running: AtomicBool::new(true),
            config,
        });

        let handle = reader::spawn(Arc::clone(&shared))?;
        tracing::info!(
            "Engine started (queue {} slots, default timeout {} ms)",
            shared.config.queue_capacity,
            shared.config.default_timeout_ms
        );

        Ok(Self {
            shared,
            command_lock: Mutex::new(()),
            reader: Mutex::new(Some(handle)),
        })
    }

    /// Begin an exchange holding the command lock until dropped
    pub fn transaction(&self) -> Transaction<'_> {
        Transaction::new(&self.shared, self.command_lock.lock())
    }

    // =========================================================================
    // Dispatcher
    // =========================================================================

    /// Write a command and block until a response line is queued
    ///
    /// A zero `timeout` uses the configured default.
    pub fn send_and_wait(&self, command: &str, timeout: Duration) -> Result<()> {
        self.transaction().send_and_wait(command, timeout)
    }

    /// Write a command whose result line arrives after its `OK`
    ///
    /// Lines starting with `keyword` keep reaching the queue after the
    /// terminal line, until the first one arrives; collect it with
    /// `wait_for_more`.
    pub fn send_deferred(&self, command: &str, keyword: &str, timeout: Duration) -> Result<()> {
        self.transaction().send_deferred(command, keyword, timeout)
    }

    /// Block for a line that arrives after the initial response
    pub fn wait_for_more(&self, timeout: Duration) -> Result<()> {
        self.shared.wait_for_more(timeout)
    }

    /// Write raw payload after a `>` prompt and block for the next line
    pub fn send_payload(&self, payload: &[u8], timeout: Duration) -> Result<()> {
        self.transaction().send_payload(payload, timeout)
    }

    /// Run a whole command exchange according to `shape`
    pub fn execute(&self, command: &str, shape: ResponseShape, timeout: Duration) -> Result<Reply> {
        self.transaction().execute(command, shape, timeout)
    }

    // =========================================================================
    // Interpreter
    // =========================================================================

    /// Pop one line and interpret it as values for `keyword`
    pub fn read_values(&self, keyword: &str) -> ResponseLine {
        self.shared.read_values(keyword)
    }

    /// Pop one line and interpret it as a terminal token
    pub fn read_ok(&self) -> Classification {
        self.shared.read_ok()
    }

    /// Pop the next raw line without interpreting it
    pub fn read_line(&self) -> Option<String> {
        self.shared.queue.try_pop()
    }

    /// Discard the next line; returns `false` if there was none
    pub fn ignore_line(&self) -> bool {
        self.shared.queue.skip()
    }

    /// True if the next line starts with `keyword` (nothing is consumed)
    pub fn peek_keyword(&self, keyword: &str) -> bool {
        self.shared.peek_keyword(keyword)
    }

    // =========================================================================
    // Unsolicited Lines
    // =========================================================================

    /// Receiver for unsolicited lines
    ///
    /// Every clone competes for the same lines.
    pub fn unsolicited(&self) -> Receiver<String> {
        self.shared.urc_rx.clone()
    }

    /// Wait for an unsolicited line starting with `keyword`
    ///
    /// Other unsolicited lines received meanwhile are discarded.
    pub fn wait_unsolicited(&self, keyword: &str, timeout: Duration) -> Result<String> {
        self.shared.ensure_running()?;
        let timeout = self.shared.config.resolve_timeout(timeout);
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.shared.urc_rx.recv_timeout(remaining) {
                Ok(line) if line.starts_with(keyword) => return Ok(line),
                Ok(line) => tracing::debug!("Skipping unsolicited line: {}", line),
                Err(RecvTimeoutError::Timeout) => return Err(ModemError::Timeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => return Err(ModemError::NotInitialized),
            }
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Discard unread transport input
    pub fn flush_input(&self) -> Result<()> {
        self.shared.ensure_running()?;
        self.shared.transport.flush_input()
    }

    /// Stop the reader thread
    ///
    /// Afterwards every command returns `NotInitialized`. Idempotent.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::Release);

        if let Some(handle) = self.reader.lock().take() {
            if handle.join().is_err() {
                tracing::error!("Reader thread panicked");
            }
            tracing::info!("Engine stopped");
        }
    }

    /// True until `stop` is called
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of unread response lines
    pub fn queued_lines(&self) -> usize {
        self.shared.queue.len()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.shared.config
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}
