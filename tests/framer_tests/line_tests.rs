//! Tests for LineFramer
//!
//! These tests verify:
//! - CR/LF trimming and blank line suppression
//! - Prompt frames on `>`
//! - Identical output however the stream is chunked
//! - Truncation of overlong lines

use atmodem::framer::{Frame, LineFramer};

// =============================================================================
// Helper Functions
// =============================================================================

fn lines(frames: Vec<Frame>) -> Vec<String> {
    frames
        .into_iter()
        .map(|f| match f {
            Frame::Line(line) => line,
            Frame::Prompt(partial) => format!("{}>", partial),
        })
        .collect()
}

fn decode_in_chunks(data: &[u8], chunk_len: usize) -> Vec<Frame> {
    let mut framer = LineFramer::new(1024);
    let mut frames = Vec::new();
    for chunk in data.chunks(chunk_len) {
        frames.extend(framer.decode(chunk));
    }
    frames
}

// =============================================================================
// Line Splitting Tests
// =============================================================================

#[test]
fn test_single_line() {
    let mut framer = LineFramer::new(1024);
    let frames = framer.decode(b"+CSQ: 20,99\r\n");

    assert_eq!(frames, vec![Frame::Line("+CSQ: 20,99".to_string())]);
    assert_eq!(framer.buffered_len(), 0);
}

#[test]
fn test_blank_separator_lines_suppressed() {
    let mut framer = LineFramer::new(1024);
    let frames = framer.decode(b"\r\n+CSQ: 20,99\r\n\r\nOK\r\n");

    assert_eq!(lines(frames), vec!["+CSQ: 20,99", "OK"]);
}

#[test]
fn test_only_blank_lines() {
    let mut framer = LineFramer::new(1024);
    assert!(framer.decode(b"\r\n\r\n\n\r\r\n").is_empty());
    assert_eq!(framer.buffered_len(), 0);
}

#[test]
fn test_whitespace_only_line_suppressed() {
    let mut framer = LineFramer::new(1024);
    assert!(framer.decode(b"  \t\r\n").is_empty());
}

#[test]
fn test_bare_linefeed_terminates() {
    let mut framer = LineFramer::new(1024);
    assert_eq!(lines(framer.decode(b"OK\n")), vec!["OK"]);
}

#[test]
fn test_partial_line_stays_buffered() {
    let mut framer = LineFramer::new(1024);

    assert!(framer.decode(b"+CREG: 0,").is_empty());
    assert_eq!(framer.buffered_len(), 9);

    assert_eq!(lines(framer.decode(b"1\r\n")), vec!["+CREG: 0,1"]);
}

#[test]
fn test_feed_sink_receives_every_frame() {
    let mut framer = LineFramer::new(1024);
    let mut seen = Vec::new();

    framer.feed(b"A\r\nB\r\nC\r\n", |frame| seen.push(frame));

    assert_eq!(lines(seen), vec!["A", "B", "C"]);
}

// =============================================================================
// Prompt Tests
// =============================================================================

#[test]
fn test_prompt_emitted_immediately() {
    let mut framer = LineFramer::new(1024);
    let frames = framer.decode(b"\r\n>");

    assert_eq!(frames, vec![Frame::Prompt(String::new())]);
    assert!(frames[0].is_prompt());
}

#[test]
fn test_prompt_carries_partial_text() {
    let mut framer = LineFramer::new(1024);
    let frames = framer.decode(b"AT+CMGS=\"123\"\r>");

    assert_eq!(frames, vec![Frame::Prompt("AT+CMGS=\"123\"\r".to_string())]);
}

#[test]
fn test_prompt_queued_form() {
    assert_eq!(Frame::Prompt(String::new()).into_queued(), ">");
    assert_eq!(Frame::Line("OK".to_string()).into_queued(), "OK");
}

#[test]
fn test_text_after_prompt_starts_new_line() {
    let mut framer = LineFramer::new(1024);
    let frames = framer.decode(b"> \r\nOK\r\n");

    assert_eq!(lines(frames), vec![">", "OK"]);
}

// =============================================================================
// Chunking Tests
// =============================================================================

#[test]
fn test_chunking_does_not_change_output() {
    let stream: &[u8] =
        b"\r\n+CGDCONT: 1,\"IP\",\"internet\"\r\n+CGDCONT: 2,\"IPV6\",\"ims\"\r\n\r\nOK\r\n>\r\n+CGEV: ME DETACH\r\n";

    let whole = decode_in_chunks(stream, stream.len());
    for chunk_len in [1, 2, 3, 5, 7, 16] {
        assert_eq!(decode_in_chunks(stream, chunk_len), whole, "chunk size {}", chunk_len);
    }
    assert_eq!(whole.len(), 5);
}

#[test]
fn test_crlf_split_across_chunks() {
    let mut framer = LineFramer::new(1024);

    assert!(framer.decode(b"OK\r").is_empty());
    assert_eq!(lines(framer.decode(b"\n")), vec!["OK"]);
}

// =============================================================================
// Truncation Tests
// =============================================================================

#[test]
fn test_overlong_line_truncated() {
    let mut framer = LineFramer::new(8);
    let frames = framer.decode(b"0123456789ABCDEF\r\n");

    assert_eq!(lines(frames), vec!["01234567"]);
    assert_eq!(framer.capacity(), 8);
}

#[test]
fn test_framing_resumes_after_truncation() {
    let mut framer = LineFramer::new(4);
    let frames = framer.decode(b"ABCDEFGH\r\nOK\r\n");

    assert_eq!(lines(frames), vec!["ABCD", "OK"]);
}

#[test]
fn test_reset_discards_partial_line() {
    let mut framer = LineFramer::new(1024);
    framer.decode(b"garbage");
    framer.reset();

    assert_eq!(framer.buffered_len(), 0);
    assert_eq!(lines(framer.decode(b"OK\r\n")), vec!["OK"]);
}
