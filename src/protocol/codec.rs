//! Response interpretation
//!
//! Pure functions classifying a single response line. Terminal tokens are
//! matched exactly, informational lines by keyword prefix.

use super::Classification;
use crate::framer::PROMPT_MARKER;

/// Extended error prefixes that terminate a command like `ERROR`
const EXTENDED_ERRORS: [&str; 2] = ["+CME ERROR", "+CMS ERROR"];

/// True if the line is exactly `OK`
pub fn is_ok_line(line: &str) -> bool {
    line.trim() == "OK"
}

/// True for `ERROR` and the extended `+CME ERROR` / `+CMS ERROR` forms
pub fn is_error_line(line: &str) -> bool {
    let line = line.trim();
    line == "ERROR" || EXTENDED_ERRORS.iter().any(|p| line.starts_with(p))
}

/// True for any line that ends a command
pub fn is_terminal(line: &str) -> bool {
    is_ok_line(line) || is_error_line(line)
}

/// True for a queued prompt
pub fn is_prompt(line: &str) -> bool {
    line.as_bytes().last() == Some(&PROMPT_MARKER)
}

/// True for `+NAME: ...` and `*NAME: ...` shaped lines
pub fn looks_informational(line: &str) -> bool {
    line.starts_with(['+', '*']) && line.contains(':')
}

/// Interpret a line that should carry values for `keyword`
///
/// Returns the payload after the colon (and any following spaces/tabs) as a
/// view into `line`.
pub fn classify_values<'a>(line: &'a str, keyword: &str) -> Result<&'a str, Classification> {
    if is_error_line(line) {
        return Err(Classification::Error);
    }
    if is_ok_line(line) {
        return Err(Classification::Ok);
    }
    if !line.starts_with(keyword) {
        return Err(Classification::Unexpected);
    }

    let colon = match line[keyword.len()..].find(':') {
        Some(offset) => keyword.len() + offset,
        None => return Err(Classification::Malformed),
    };

    Ok(line[colon..].trim_start_matches([':', ' ', '\t']))
}

/// Interpret a line that should be a terminal token
pub fn classify_ok(line: &str) -> Classification {
    if is_ok_line(line) {
        Classification::Ok
    } else if is_error_line(line) {
        Classification::Error
    } else {
        Classification::Unexpected
    }
}

/// Split a payload on commas outside double quotes
///
/// Fields are trimmed and surrounding quotes removed:
/// `1,"IP","a,b"` -> `["1", "IP", "a,b"]`.
pub fn split_values(payload: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in payload.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(unquote(&payload[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }

    if !payload.trim().is_empty() || !fields.is_empty() {
        fields.push(unquote(&payload[start..]));
    }

    fields
}

fn unquote(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}
