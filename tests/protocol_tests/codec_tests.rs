//! Codec Tests
//!
//! Tests for command encoding, keyword extraction and line interpretation.

use atmodem::protocol::{
    classify_ok, classify_values, command_keyword, encode_command, is_error_line, is_ok_line,
    is_prompt, is_terminal, looks_informational, split_values, Classification, Reply,
    ResponseLine, ResponseShape, Status,
};
use atmodem::ModemError;

// =============================================================================
// Command Encoding Tests
// =============================================================================

#[test]
fn test_encode_appends_crlf() {
    let bytes = encode_command("AT+CSQ", 256).unwrap();
    assert_eq!(bytes, b"AT+CSQ\r\n");
}

#[test]
fn test_encode_normalizes_existing_terminator() {
    assert_eq!(encode_command("AT+CSQ\r\n", 256).unwrap(), b"AT+CSQ\r\n");
    assert_eq!(encode_command("AT+CSQ\n", 256).unwrap(), b"AT+CSQ\r\n");
}

#[test]
fn test_encode_rejects_empty_command() {
    assert!(matches!(
        encode_command("", 256),
        Err(ModemError::InvalidArgument(_))
    ));
    assert!(matches!(
        encode_command("\r\n", 256),
        Err(ModemError::InvalidArgument(_))
    ));
}

#[test]
fn test_encode_rejects_interior_line_break() {
    assert!(matches!(
        encode_command("AT\r\nAT+CSQ", 256),
        Err(ModemError::InvalidArgument(_))
    ));
}

#[test]
fn test_encode_length_limit() {
    // 8 bytes encoded: must be strictly below the limit
    assert!(encode_command("AT+CSQ", 9).is_ok());
    assert!(matches!(
        encode_command("AT+CSQ", 8),
        Err(ModemError::CommandTooLong { max: 8, actual: 8 })
    ));

    let long = format!("AT+CNTP=\"{}\",0", "x".repeat(300));
    assert!(matches!(
        encode_command(&long, 256),
        Err(ModemError::CommandTooLong { max: 256, .. })
    ));
}

// =============================================================================
// Keyword Tests
// =============================================================================

#[test]
fn test_command_keyword_extended_commands() {
    assert_eq!(command_keyword("AT+CSQ").as_deref(), Some("+CSQ"));
    assert_eq!(command_keyword("AT+CREG?").as_deref(), Some("+CREG"));
    assert_eq!(
        command_keyword("AT+CGDCONT=1,\"IP\",\"internet\"").as_deref(),
        Some("+CGDCONT")
    );
    assert_eq!(command_keyword("at+cpin?").as_deref(), Some("+CPIN"));
    assert_eq!(command_keyword("AT*ATREADY?").as_deref(), Some("*ATREADY"));
}

#[test]
fn test_command_keyword_basic_commands() {
    assert_eq!(command_keyword("AT"), None);
    assert_eq!(command_keyword("ATE0"), None);
    assert_eq!(command_keyword("AT+"), None);
    assert_eq!(command_keyword("hello"), None);
    assert_eq!(command_keyword("é"), None);
}

#[test]
fn test_response_shape_keyword() {
    assert_eq!(ResponseShape::values("+CSQ").keyword(), Some("+CSQ"));
    assert_eq!(ResponseShape::deferred("+CNTP").keyword(), Some("+CNTP"));
    assert_eq!(ResponseShape::Terminal.keyword(), None);
    assert_eq!(ResponseShape::Prompt.keyword(), None);
}

// =============================================================================
// Terminal Line Tests
// =============================================================================

#[test]
fn test_ok_matching_is_exact() {
    assert!(is_ok_line("OK"));
    assert!(is_ok_line(" OK "));
    assert!(!is_ok_line("+COPS: 0,0,\"BROOKLYN\""));
    assert!(!is_ok_line("TOKEN"));
}

#[test]
fn test_error_forms() {
    assert!(is_error_line("ERROR"));
    assert!(is_error_line("+CME ERROR: 10"));
    assert!(is_error_line("+CMS ERROR: 500"));
    assert!(!is_error_line("+CMQTTCONNECT: 0,ERROR"));
    assert!(is_terminal("OK"));
    assert!(!is_terminal("+CSQ: 20,99"));
}

#[test]
fn test_prompt_and_informational_detection() {
    assert!(is_prompt(">"));
    assert!(!is_prompt("OK"));
    assert!(looks_informational("+CGEV: ME DETACH"));
    assert!(looks_informational("*ATREADY: 1"));
    assert!(!looks_informational("RDY"));
    assert!(!looks_informational("+NOCOLON"));
}

// =============================================================================
// Values Classification Tests
// =============================================================================

#[test]
fn test_classify_values_payload() {
    assert_eq!(classify_values("+CSQ: 20,99", "+CSQ"), Ok("20,99"));
    assert_eq!(classify_values("+CSQ:\t 5,0", "+CSQ"), Ok("5,0"));
    assert_eq!(classify_values("+CSQ:", "+CSQ"), Ok(""));
}

#[test]
fn test_classify_values_terminals_take_precedence() {
    assert_eq!(classify_values("ERROR", "+CSQ"), Err(Classification::Error));
    assert_eq!(classify_values("+CME ERROR: 10", "+CPIN"), Err(Classification::Error));
    assert_eq!(classify_values("OK", "+CSQ"), Err(Classification::Ok));
}

#[test]
fn test_classify_values_wrong_keyword() {
    assert_eq!(
        classify_values("+CFUN: 1", "+CSQ"),
        Err(Classification::Unexpected)
    );
}

#[test]
fn test_classify_values_missing_colon() {
    assert_eq!(
        classify_values("+CSQ 20,99", "+CSQ"),
        Err(Classification::Malformed)
    );
}

#[test]
fn test_classify_ok() {
    assert_eq!(classify_ok("OK"), Classification::Ok);
    assert_eq!(classify_ok("ERROR"), Classification::Error);
    assert_eq!(classify_ok("+CSQ: 20,99"), Classification::Unexpected);
}

// =============================================================================
// Value Splitting Tests
// =============================================================================

#[test]
fn test_split_values_plain() {
    assert_eq!(split_values("20,99"), vec!["20", "99"]);
    assert_eq!(split_values(" 1 , 2 "), vec!["1", "2"]);
}

#[test]
fn test_split_values_quoted_commas() {
    assert_eq!(
        split_values("1,\"IP\",\"a,b\",\"0.0.0.0\""),
        vec!["1", "IP", "a,b", "0.0.0.0"]
    );
}

#[test]
fn test_split_values_empty_fields() {
    assert!(split_values("").is_empty());
    assert_eq!(split_values("1,,3"), vec!["1", "", "3"]);
    assert_eq!(split_values("1,"), vec!["1", ""]);
}

// =============================================================================
// Response Type Tests
// =============================================================================

#[test]
fn test_response_line_payload_view() {
    let line = "+CSQ: 20,99".to_string();
    let start = line.len() - "20,99".len();
    let resp = ResponseLine::values(line, start);

    assert_eq!(resp.classification(), Classification::Values);
    assert_eq!(resp.payload(), Some("20,99"));
    assert_eq!(resp.fields(), vec!["20", "99"]);
    assert_eq!(resp.require_payload().unwrap(), "20,99");
}

#[test]
fn test_response_line_without_payload() {
    let resp = ResponseLine::classified(Some("ERROR".to_string()), Classification::Error);

    assert!(resp.is_error());
    assert_eq!(resp.payload(), None);
    assert!(resp.fields().is_empty());
    assert!(matches!(resp.require_payload(), Err(ModemError::CommandError(_))));

    let empty = ResponseLine::classified(None, Classification::Unexpected);
    assert!(matches!(
        empty.require_payload(),
        Err(ModemError::Response {
            classification: Classification::Unexpected,
            line: None
        })
    ));
}

#[test]
fn test_reply_into_result() {
    let ok = Reply::new(Status::Ok);
    assert!(ok.is_ok());
    assert!(ok.into_result().is_ok());

    let err = Reply::new(Status::Error("+CME ERROR: 10".to_string()));
    assert!(matches!(
        err.into_result(),
        Err(ModemError::CommandError(line)) if line == "+CME ERROR: 10"
    ));
}

#[test]
fn test_classification_display() {
    assert_eq!(Classification::Malformed.to_string(), "invalid response format");
    assert_eq!(Classification::Ok.to_string(), "command ok");
}
