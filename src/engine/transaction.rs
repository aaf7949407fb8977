//! Command transactions
//!
//! A [`Transaction`] holds the engine's command lock for a whole exchange:
//! the command write, any prompt and payload stages, and every read that
//! interprets the response. `collect` implements the generic
//! parse-by-shape sequence behind `execute`.

use std::time::{Duration, Instant};

use parking_lot::MutexGuard;

use crate::error::{ModemError, Result};
use crate::protocol::{
    classify_ok, classify_values, is_error_line, is_prompt, Classification, Expectation,
    Reply, ResponseLine, ResponseShape, Status,
};

use super::Shared;

/// Exclusive access to the engine for one command exchange
///
/// Calling `Engine` command methods on the same thread while a transaction
/// is alive deadlocks; use the transaction's own methods instead.
pub struct Transaction<'a> {
    shared: &'a Shared,
    _guard: MutexGuard<'a, ()>,
}

impl<'a> Transaction<'a> {
    pub(super) fn new(shared: &'a Shared, guard: MutexGuard<'a, ()>) -> Self {
        Self {
            shared,
            _guard: guard,
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Write a command and block until a response line is queued
    pub fn send_and_wait(&self, command: &str, timeout: Duration) -> Result<()> {
        self.shared
            .send_and_wait(command, timeout, Expectation::for_command(command))
    }

    /// Like `send_and_wait`, also accepting lines that start with `keyword`
    pub fn send_expecting(&self, command: &str, keyword: &str, timeout: Duration) -> Result<()> {
        let expectation = Expectation::for_command(command).with_keyword(keyword);
        self.shared.send_and_wait(command, timeout, expectation)
    }

    /// Like `send_and_wait`, keeping the exchange open after `OK` until a
    /// `keyword` line arrives
    pub fn send_deferred(&self, command: &str, keyword: &str, timeout: Duration) -> Result<()> {
        let expectation = Expectation::for_command(command).with_deferred(keyword);
        self.shared.send_and_wait(command, timeout, expectation)
    }

    /// Write raw payload bytes (no terminator) and block for the next line
    pub fn send_payload(&self, payload: &[u8], timeout: Duration) -> Result<()> {
        self.shared.send_payload(payload, timeout)
    }

    /// Block for a line that arrives after the initial response
    pub fn wait_for_more(&self, timeout: Duration) -> Result<()> {
        self.shared.wait_for_more(timeout)
    }

    /// Send `command` and parse its response according to `shape`
    pub fn execute(&self, command: &str, shape: ResponseShape, timeout: Duration) -> Result<Reply> {
        self.shared.execute(command, &shape, timeout)
    }

    /// Send payload after a prompt and parse the response according to `shape`
    pub fn execute_payload(
        &self,
        payload: &[u8],
        shape: ResponseShape,
        timeout: Duration,
    ) -> Result<Reply> {
        let timeout = self.shared.config.resolve_timeout(timeout);
        let deadline = Instant::now() + timeout;

        self.shared.send_payload(payload, timeout)?;
        collect(self.shared, &shape, deadline, timeout)
    }

    // =========================================================================
    // Interpretation
    // =========================================================================

    /// Pop one line and interpret it as values for `keyword`
    pub fn read_values(&self, keyword: &str) -> ResponseLine {
        self.shared.read_values(keyword)
    }

    /// Pop one line and interpret it as a terminal token
    pub fn read_ok(&self) -> Classification {
        self.shared.read_ok()
    }

    /// Pop the next raw line
    pub fn read_line(&self) -> Option<String> {
        self.shared.queue.try_pop()
    }

    /// Discard the next line
    pub fn ignore_line(&self) -> bool {
        self.shared.queue.skip()
    }

    /// True if the next line starts with `keyword`
    pub fn peek_keyword(&self, keyword: &str) -> bool {
        self.shared.peek_keyword(keyword)
    }
}

// =============================================================================
// Shape-driven Parsing
// =============================================================================

/// Pop and interpret lines until `shape` is satisfied or `deadline` passes
pub(super) fn collect(
    shared: &Shared,
    shape: &ResponseShape,
    deadline: Instant,
    timeout: Duration,
) -> Result<Reply> {
    let next = || shared.next_line(deadline).ok_or(ModemError::Timeout(timeout));

    match shape {
        ResponseShape::Prompt => loop {
            let line = next()?;
            if is_prompt(&line) {
                return Ok(Reply::new(Status::Ok));
            }
            if is_error_line(&line) {
                return Ok(Reply::new(Status::Error(line)));
            }
            tracing::debug!("Skipping line while waiting for prompt: {}", line);
        },

        ResponseShape::Terminal => {
            let line = next()?;
            terminal(line)
        }

        ResponseShape::Values(keyword) => {
            let mut values = Vec::new();
            loop {
                let line = next()?;
                match classify_values(&line, keyword) {
                    Ok(payload) => values.push(payload.to_string()),
                    Err(Classification::Ok) => {
                        let mut reply = Reply::new(Status::Ok);
                        reply.values = values;
                        return Ok(reply);
                    }
                    Err(Classification::Error) => return Ok(Reply::new(Status::Error(line))),
                    Err(other) => return Err(ModemError::response(other, Some(line))),
                }
            }
        }

        ResponseShape::Lines => {
            let mut lines = Vec::new();
            loop {
                let line = next()?;
                match classify_ok(&line) {
                    Classification::Ok => {
                        let mut reply = Reply::new(Status::Ok);
                        reply.lines = lines;
                        return Ok(reply);
                    }
                    Classification::Error => return Ok(Reply::new(Status::Error(line))),
                    _ => lines.push(line),
                }
            }
        }

        ResponseShape::Deferred(keyword) => {
            let mut reply = terminal(next()?)?;
            if !reply.is_ok() {
                return Ok(reply);
            }

            // The result line arrives after OK, possibly much later
            let line = next()?;
            match classify_values(&line, keyword) {
                Ok(payload) => {
                    reply.values.push(payload.to_string());
                    Ok(reply)
                }
                Err(Classification::Error) => Ok(Reply::new(Status::Error(line))),
                Err(other) => Err(ModemError::response(other, Some(line))),
            }
        }
    }
}

fn terminal(line: String) -> Result<Reply> {
    match classify_ok(&line) {
        Classification::Ok => Ok(Reply::new(Status::Ok)),
        Classification::Error => Ok(Reply::new(Status::Error(line))),
        other => Err(ModemError::response(other, Some(line))),
    }
}
