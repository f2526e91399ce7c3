/*!
 * Tests for error types and conversions
 */

use bisub::errors::{AppError, FormatError};
use bisub::{parse, LineSource};

#[test]
fn test_formatError_invalidSequenceNumber_shouldDisplayLineAndValue() {
    let error = FormatError::InvalidSequenceNumber { line: 5, value: "abc".to_string() };
    let display = format!("{}", error);
    assert!(display.contains("line 5"));
    assert!(display.contains("'abc'"));
}

#[test]
fn test_formatError_invalidTimeRange_shouldDisplayReason() {
    let error = FormatError::InvalidTimeRange {
        line: 2,
        value: "00:00:01,000 00:00:02,000".to_string(),
        reason: "missing '-->' separator".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("line 2"));
    assert!(display.contains("missing '-->' separator"));
}

#[test]
fn test_formatError_unexpectedEndOfInput_shouldNameMissingPart() {
    let error = FormatError::UnexpectedEndOfInput { line: 7, missing: "time range" };
    assert!(format!("{}", error).contains("missing its time range"));
}

#[test]
fn test_formatError_kinds_shouldClassifyTruncation() {
    let truncated = FormatError::UnexpectedEndOfInput { line: 1, missing: "text" };
    let malformed = FormatError::InvalidTimestamp("1:2:3".to_string());

    assert!(truncated.is_truncation());
    assert!(!truncated.is_malformed_field());
    assert!(malformed.is_malformed_field());
    assert!(!malformed.is_truncation());
}

#[test]
fn test_formatError_fromParser_shouldBeMalformedField() {
    let error = parse("x\n00:00:01,000 --> 00:00:02,000\nHi\n", LineSource::Single).unwrap_err();
    assert!(error.is_malformed_field());
    assert!(matches!(error, FormatError::InvalidSequenceNumber { line: 1, .. }));
}

#[test]
fn test_appError_fromFormatError_shouldWrapAndKeepSource() {
    let format_error = FormatError::InvalidTimestamp("bad".to_string());
    let app_error: AppError = format_error.clone().into();

    assert!(matches!(&app_error, AppError::Format(e) if *e == format_error));
    assert!(format!("{}", app_error).contains("Subtitle format error"));
    let source = std::error::Error::source(&app_error).map(|s| s.to_string());
    assert_eq!(source, Some(format_error.to_string()));
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.srt");
    let app_error: AppError = io_error.into();

    assert!(matches!(app_error, AppError::File(_)));
    assert!(format!("{}", app_error).contains("missing.srt"));
}

#[test]
fn test_appError_fromAnyhow_shouldBeUnknownError() {
    let app_error: AppError = anyhow::anyhow!("something odd").into();

    assert!(matches!(app_error, AppError::Unknown(_)));
    assert_eq!(format!("{}", app_error), "Unknown error: something odd");
}
