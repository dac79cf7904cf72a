// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use sql_query_renderer::error::{
    AppError, RenderError, config_error, file_read_error, params_parse_error, render_error,
    verify_error
};

#[test]
fn test_file_read_error() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error = file_read_error("/path/to/queries.jsonl", io_error);
    let _msg = error.to_string();
}

#[test]
fn test_params_parse_error() {
    let error = params_parse_error("expected value at line 1");
    let _msg = error.to_string();
}

#[test]
fn test_verify_error_with_position() {
    let error = verify_error("Expected: ), found: EOF at Line: 1, Column: 24");
    let _msg = error.to_string();
}

#[test]
fn test_render_error_messages() {
    let unresolved = RenderError::UnresolvedPlaceholder {
        token:  "?#0".into(),
        offset: 7
    };
    assert_eq!(
        unresolved.to_string(),
        "no value bound for placeholder '?#0' at offset 7"
    );

    let unsupported = RenderError::UnsupportedListElement {
        key:    "ids".into(),
        index:  2,
        reason: "nested list"
    };
    assert!(unsupported.to_string().contains("index 2"));

    let malformed = RenderError::MalformedPlaceholderSyntax { offset: 3 };
    assert!(malformed.to_string().contains("offset 3"));

    let unterminated = RenderError::UnterminatedLiteral { offset: 26 };
    assert_eq!(
        unterminated.to_string(),
        "unterminated quoted literal starting at offset 26"
    );
}

#[test]
fn test_render_error_into_app_error() {
    let err = RenderError::MalformedPlaceholderSyntax { offset: 0 };
    let app: AppError = err.clone().into();
    let direct = render_error(err);
    assert!(!app.to_string().is_empty());
    assert!(!direct.to_string().is_empty());
}

#[test]
fn test_error_display() {
    let config_err = config_error("Missing [orm] section");
    let params_err = params_parse_error("bad");

    assert!(!config_err.to_string().is_empty());
    assert!(!params_err.to_string().is_empty());
}
