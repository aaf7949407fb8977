//! Response classifier
//!
//! Decides whether a framed line belongs to the outstanding command or is an
//! unsolicited notification that must stay out of the response queue.

use super::codec::{is_terminal, looks_informational};
use super::Expectation;

/// Where a framed line goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Into the response queue, with a completion signal
    Response,

    /// To the out-of-band channel
    Unsolicited,

    /// The modem echoing the command; dropped
    Echo,
}

/// Inclusion-first line router
///
/// ## Order of checks
/// 1. prompt or terminal token: response
/// 2. informational line for the outstanding command: response
/// 3. echo of the outstanding command: dropped
/// 4. known unsolicited marker: unsolicited
/// 5. informational line for some other keyword: unsolicited
/// 6. no command outstanding, or only a deferred result still due: unsolicited
/// 7. bare data line during a command: response
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    markers: Vec<String>,
}

impl Classifier {
    /// Create a classifier with the given unsolicited markers
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    /// Route one line given the outstanding command, if any
    pub fn route(&self, line: &str, prompt: bool, expected: Option<&Expectation>) -> Route {
        if prompt || is_terminal(line) {
            return Route::Response;
        }

        if let Some(expectation) = expected {
            if expectation.matches(line) {
                return Route::Response;
            }
            if expectation.is_echo(line) {
                return Route::Echo;
            }
        }

        if self.is_marked(line) || looks_informational(line) {
            return Route::Unsolicited;
        }

        match expected {
            Some(expectation) if !expectation.awaiting_result() => Route::Response,
            _ => Route::Unsolicited,
        }
    }

    /// True if the line contains a configured unsolicited marker
    pub fn is_marked(&self, line: &str) -> bool {
        self.markers.iter().any(|m| line.contains(m.as_str()))
    }

    /// Configured markers
    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}
