//! Protocol Module
//!
//! Text conventions of the AT command protocol.
//!
//! ## Command Format
//! ```text
//! AT+CSQ\r\n
//! AT+CGDCONT=1,"IP","internet"\r\n
//! ```
//! ASCII command text terminated by CR LF, bounded by a fixed maximum length.
//!
//! ## Response Format
//! ```text
//! +CSQ: 20,99        informational line  (+KEYWORD: v1,v2,...)
//! OK                 terminal line
//! ERROR              terminal line (also +CME ERROR: n / +CMS ERROR: n)
//! >                  prompt for follow-up payload
//! +CGEV: ME DETACH   unsolicited line, never part of a command exchange
//! ```

mod classifier;
mod codec;
mod command;
mod response;

pub use classifier::{Classifier, Route};
pub use codec::{
    classify_ok, classify_values, is_error_line, is_ok_line, is_prompt, is_terminal,
    looks_informational, split_values,
};
pub use command::{command_keyword, encode_command, Expectation, ResponseShape, TERMINATOR};
pub use response::{Classification, Reply, ResponseLine, Status};
