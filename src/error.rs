use compact_str::CompactString;
pub use masterror::{AppError, AppResult};

/// Failure while rendering a parameterized statement.
///
/// Every variant is fatal for the render attempt that produced it. Callers
/// that log queries are expected to drop the log line, never the query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// A located placeholder has no bound value
    #[error("no value bound for placeholder '{token}' at offset {offset}")]
    UnresolvedPlaceholder {
        token:  CompactString,
        offset: usize
    },
    /// A list parameter holds an element that cannot be expanded
    #[error("list parameter '{key}' has an unsupported element at index {index}: {reason}")]
    UnsupportedListElement {
        key:    CompactString,
        index:  usize,
        reason: &'static str
    },
    /// A `:` outside any literal is not followed by an identifier
    #[error("named placeholder without identifier at offset {offset}")]
    MalformedPlaceholderSyntax { offset: usize },
    /// A quoted literal or identifier is still open at end of input
    #[error("unterminated quoted literal starting at offset {offset}")]
    UnterminatedLiteral { offset: usize }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        render_error(err)
    }
}

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create parameter parse error
pub fn params_parse_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(format!("Invalid parameters: {}", message.into()))
}

/// Create render error
pub fn render_error(err: RenderError) -> AppError {
    AppError::bad_request(format!("Render error: {}", err))
}

/// Create verification error with optional position info
pub fn verify_error(message: impl Into<String>) -> AppError {
    let msg = message.into();
    AppError::bad_request(format_sql_error("Rendered SQL does not parse", &msg))
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Format SQL error with position highlighting
fn format_sql_error(prefix: &str, message: &str) -> String {
    // sqlparser format: "... at Line: X, Column Y"
    if let Some(pos) = extract_position(message) {
        format!(
            "{} at line {}, column {}:\n  {}",
            prefix, pos.line, pos.column, message
        )
    } else {
        format!("{}:\n  {}", prefix, message)
    }
}

struct SqlPosition {
    line:   usize,
    column: usize
}

fn extract_position(message: &str) -> Option<SqlPosition> {
    let line_marker = "Line: ";
    let col_marker = ", Column ";

    let line_start = message.find(line_marker)?;
    let line_num_start = line_start + line_marker.len();
    let col_start = message[line_num_start..].find(col_marker)?;
    let line_str = &message[line_num_start..line_num_start + col_start];
    let col_num_start = line_num_start + col_start + col_marker.len();

    let col_end = message[col_num_start..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(message.len() - col_num_start);
    let col_str = &message[col_num_start..col_num_start + col_end];

    match (line_str.parse(), col_str.parse()) {
        (Ok(line), Ok(column)) => Some(SqlPosition { line, column }),
        _ => None
    }
}
