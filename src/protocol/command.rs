//! Command definitions
//!
//! Command text encoding, the keyword a command answers with, and the
//! response shape descriptor used by `execute`.

use crate::error::{ModemError, Result};

use super::codec::{is_error_line, is_ok_line, is_prompt, is_terminal};

/// Line terminator appended to every command
pub const TERMINATOR: &str = "\r\n";

/// Encode a command for transmission
///
/// Trailing CR/LF in `command` are normalized to a single CR LF. The encoded
/// length must stay below `max_len`, mirroring a fixed C-string buffer.
pub fn encode_command(command: &str, max_len: usize) -> Result<Vec<u8>> {
    let text = command.trim_end_matches(['\r', '\n']);

    if text.is_empty() {
        return Err(ModemError::InvalidArgument("empty command".to_string()));
    }
    if text.contains(['\r', '\n']) {
        return Err(ModemError::InvalidArgument(format!(
            "command contains a line break: {:?}",
            text
        )));
    }

    let encoded_len = text.len() + TERMINATOR.len();
    if encoded_len >= max_len {
        return Err(ModemError::CommandTooLong {
            max: max_len,
            actual: encoded_len,
        });
    }

    let mut bytes = Vec::with_capacity(encoded_len);
    bytes.extend_from_slice(text.as_bytes());
    bytes.extend_from_slice(TERMINATOR.as_bytes());
    Ok(bytes)
}

/// Keyword an extended command answers with
///
/// `AT+CSQ` -> `+CSQ`, `AT+CGDCONT=1,"IP"` -> `+CGDCONT`, `AT*FOO?` -> `*FOO`.
/// Basic commands such as `ATE0` or `AT` have none.
pub fn command_keyword(command: &str) -> Option<String> {
    let text = command.trim();
    let rest = match text.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("AT") => &text[2..],
        _ => return None,
    };
    if !rest.starts_with(['+', '*']) {
        return None;
    }

    let end = rest
        .find(|c: char| c == '=' || c == '?' || c == ';' || c.is_whitespace())
        .unwrap_or(rest.len());

    if end < 2 {
        return None;
    }

    Some(rest[..end].to_ascii_uppercase())
}

/// What the reader should treat as belonging to the outstanding command
///
/// An expectation lives from the command write until the exchange ends:
/// the terminal line for most commands, or the late result line for a
/// deferred one. Once it is gone every non-terminal line is unsolicited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    /// Command text without terminator (used to spot echo)
    command: String,

    /// Keywords whose informational lines are responses
    keywords: Vec<String>,

    /// Keyword of a result line that follows the terminal `OK`
    deferred: Option<String>,

    stage: Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Waiting for informational lines and the terminal line
    Response,

    /// `OK` seen, waiting for the deferred result line
    Result,
}

impl Expectation {
    /// Expectation derived from the command text
    pub fn for_command(command: &str) -> Self {
        let command = command.trim_end_matches(['\r', '\n']).to_string();
        let keywords = command_keyword(&command).into_iter().collect();
        Self {
            command,
            keywords,
            deferred: None,
            stage: Stage::Response,
        }
    }

    /// Expectation for `command` parsed as `shape`
    pub fn for_shape(command: &str, shape: &ResponseShape) -> Self {
        let expectation = Self::for_command(command);
        match shape {
            ResponseShape::Values(keyword) => expectation.with_keyword(keyword.as_str()),
            ResponseShape::Deferred(keyword) => expectation.with_deferred(keyword.as_str()),
            _ => expectation,
        }
    }

    /// Also accept lines starting with `keyword`
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        if !keyword.is_empty() && !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        self
    }

    /// Keep the exchange open after `OK` until a `keyword` line arrives
    pub fn with_deferred(self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        let mut expectation = self.with_keyword(keyword.clone());
        if !keyword.is_empty() {
            expectation.deferred = Some(keyword);
        }
        expectation
    }

    /// True if `line` is an informational line for this command
    pub fn matches(&self, line: &str) -> bool {
        self.keywords.iter().any(|k| line.starts_with(k.as_str()))
    }

    /// True if `line` is the modem echoing the command back
    pub fn is_echo(&self, line: &str) -> bool {
        self.stage == Stage::Response && !self.command.is_empty() && line.trim() == self.command
    }

    /// Expectation left after `line` was queued as a response
    ///
    /// `None` once the exchange is over.
    pub fn advance(self, line: &str) -> Option<Self> {
        if is_prompt(line) {
            return Some(self);
        }

        match self.stage {
            Stage::Response if is_terminal(line) => match self.deferred {
                Some(keyword) if is_ok_line(line) => Some(Self {
                    command: self.command,
                    keywords: vec![keyword],
                    deferred: None,
                    stage: Stage::Result,
                }),
                _ => None,
            },
            Stage::Result if self.matches(line) || is_error_line(line) => None,
            _ => Some(self),
        }
    }

    /// True while a deferred result line is still due
    pub fn awaiting_result(&self) -> bool {
        self.stage == Stage::Result
    }

    /// Command text
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Accepted keywords
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Shape of a command's response sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    /// Exactly one OK/ERROR line
    Terminal,

    /// Zero or more `+KEYWORD:` lines, then OK/ERROR
    Values(String),

    /// Zero or more lines, bare (e.g. IMEI) or `+KEYWORD:`, then OK/ERROR
    ///
    /// Lines are kept whole.
    Lines,

    /// OK/ERROR first, then one `+KEYWORD:` line arriving later
    Deferred(String),

    /// A `>` prompt asking for payload
    Prompt,
}

impl ResponseShape {
    /// Shape expecting informational lines for `keyword`
    pub fn values(keyword: impl Into<String>) -> Self {
        ResponseShape::Values(keyword.into())
    }

    /// Shape expecting a late result line for `keyword`
    pub fn deferred(keyword: impl Into<String>) -> Self {
        ResponseShape::Deferred(keyword.into())
    }

    /// Keyword the shape is waiting for, if any
    pub fn keyword(&self) -> Option<&str> {
        match self {
            ResponseShape::Values(k) | ResponseShape::Deferred(k) => Some(k),
            _ => None,
        }
    }
}
