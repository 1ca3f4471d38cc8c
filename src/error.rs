//! Error types for the ClickHouse HTTP client.
//!
//! The taxonomy has two levels: [`TransportError`] is the raw failure
//! (HTTP status, request I/O, response stream, cell conversion) and
//! [`DatabaseError`] wraps exactly one such cause. Query-facing APIs only
//! ever return [`DatabaseError`]; callers that need the underlying detail
//! can reach it through `source()` or the public `cause` field.

use thiserror::Error;

/// Convenient result alias for query-facing APIs.
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Low-level protocol, transport, or decode failure.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The server answered with a non-200 status. The response body is
    /// carried verbatim as the diagnostic message.
    #[error("server returned HTTP {code}: {body}")]
    Http {
        /// HTTP status code of the response.
        code: u16,
        /// Raw response body text.
        body: String,
    },

    /// The HTTP request could not be built, sent, or timed out.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Reading the response stream failed after the headers were accepted.
    #[error("response stream error: {0}")]
    Io(#[from] std::io::Error),

    /// A cell could not be converted to its declared column type.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// The transport was used after `close()`.
    #[error("transport is closed")]
    Closed,

    /// Transport construction was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Failure to convert one decoded text field into its declared type.
///
/// Raised when the caller pulls the row containing the offending cell,
/// never at query-issue time.
#[derive(Error, Debug)]
pub struct ConvertError {
    /// Name of the column being decoded, when known.
    pub column: Option<String>,
    /// Declared type that was being applied.
    pub type_name: String,
    /// The raw field text that failed to parse.
    pub value: String,
    /// Parser diagnostic.
    pub message: String,
}

impl ConvertError {
    pub(crate) fn new(type_name: &str, value: &str, message: impl ToString) -> Self {
        Self {
            column: None,
            type_name: type_name.to_string(),
            value: value.to_string(),
            message: message.to_string(),
        }
    }

    /// Attach the column name the failing cell belongs to.
    pub(crate) fn in_column(mut self, column: &str) -> Self {
        self.column = Some(column.to_string());
        self
    }
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(column) = &self.column {
            write!(f, "column {:?}: ", column)?;
        }
        write!(
            f,
            "cannot parse {:?} as {}: {}",
            self.value, self.type_name, self.message
        )
    }
}

/// Database-level failure wrapping one underlying cause.
///
/// This is the only error type the query APIs let escape: callers detect
/// "the query failed" without inspecting the inner cause. The display
/// representation always includes the cause's description.
#[derive(Error, Debug)]
#[error("query failed: {cause}")]
pub struct DatabaseError {
    /// The wrapped transport-level failure.
    #[source]
    pub cause: TransportError,
}

impl From<TransportError> for DatabaseError {
    fn from(cause: TransportError) -> Self {
        Self { cause }
    }
}

impl From<ConvertError> for DatabaseError {
    fn from(cause: ConvertError) -> Self {
        Self {
            cause: TransportError::Convert(cause),
        }
    }
}

impl From<std::io::Error> for DatabaseError {
    fn from(cause: std::io::Error) -> Self {
        Self {
            cause: TransportError::Io(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_http_error_display() {
        let err = TransportError::Http {
            code: 400,
            body: "syntax error near SELECT".to_string(),
        };
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("syntax error near SELECT"));
    }

    #[test]
    fn test_database_error_includes_cause() {
        let err = DatabaseError::from(TransportError::Http {
            code: 500,
            body: "Memory limit exceeded".to_string(),
        });
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("Memory limit exceeded"));
    }

    #[test]
    fn test_database_error_source_chain() {
        let err = DatabaseError::from(TransportError::Closed);
        let source = err.source().expect("cause must be exposed");
        assert_eq!(source.to_string(), "transport is closed");
    }

    #[test]
    fn test_convert_error_display() {
        let err = ConvertError::new("Int64", "abc", "invalid digit").in_column("x");
        let text = err.to_string();
        assert!(text.contains("\"x\""));
        assert!(text.contains("Int64"));
        assert!(text.contains("abc"));
    }

    #[test]
    fn test_convert_error_wraps_transparently() {
        let err = TransportError::from(ConvertError::new("Date", "not-a-date", "bad input"));
        assert!(err.to_string().contains("not-a-date"));
    }
}
