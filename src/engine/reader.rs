//! Reader loop
//!
//! Background thread that polls the transport, frames lines and routes them.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::TrySendError;

use crate::error::{ModemError, Result};
use crate::framer::{Frame, LineFramer};
use crate::protocol::Route;

use super::Shared;

/// Spawn the reader thread for an engine
pub(crate) fn spawn(shared: Arc<Shared>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("atmodem-reader".to_string())
        .spawn(move || run(&shared))
        .map_err(|e| ModemError::Transport(format!("failed to spawn reader thread: {}", e)))
}

/// Poll until the engine stops
///
/// The framer and read buffer are owned by this thread alone.
fn run(shared: &Shared) {
    let config = &shared.config;
    let mut framer = LineFramer::new(config.max_response_len);
    let mut chunk = vec![0u8; config.read_chunk_len];
    let mut failing = false;

    tracing::debug!("Reader started");

    while shared.running.load(Ordering::Acquire) {
        match shared.transport.read(&mut chunk, config.poll_timeout()) {
            Ok(0) => thread::sleep(config.idle_backoff()),
            Ok(n) => {
                failing = false;
                tracing::trace!("Received {} bytes: {:02X?}", n, &chunk[..n]);
                framer.feed(&chunk[..n], |frame| route_frame(shared, frame));
            }
            Err(e) => {
                if failing {
                    tracing::debug!("Transport read still failing: {}", e);
                } else {
                    tracing::warn!("Transport read failed: {}", e);
                    failing = true;
                }
                thread::sleep(config.poll_timeout());
            }
        }
    }

    tracing::debug!("Reader stopped");
}

/// Route one frame to the queue or the unsolicited channel
fn route_frame(shared: &Shared, frame: Frame) {
    let prompt = frame.is_prompt();
    let line = frame.into_queued();

    let route = {
        let mut expectation = shared.expectation.lock();
        let route = shared.classifier.route(&line, prompt, expectation.as_ref());

        // A finished exchange leaves nothing outstanding
        if route == Route::Response {
            if let Some(current) = expectation.take() {
                *expectation = current.advance(&line);
                if expectation.is_none() {
                    tracing::trace!("Exchange complete");
                }
            }
        }
        route
    };

    match route {
        Route::Response => {
            if shared.queue.push(&line) {
                tracing::warn!("Response queue full, oldest line overwritten");
            }
            tracing::debug!("<-- {}", line);

            // Binary signal: a pending post already covers this line
            let _ = shared.signal_tx.try_send(());
        }
        Route::Unsolicited => {
            tracing::debug!("Unsolicited: {}", line);
            if let Err(TrySendError::Full(line)) = shared.urc_tx.try_send(line) {
                tracing::warn!("Unsolicited channel full, dropped: {}", line);
            }
        }
        Route::Echo => tracing::trace!("Echo dropped: {}", line),
    }
}
