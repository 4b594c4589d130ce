use std::fmt;

use crate::core::types::DocId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected document submission: empty token list, non-alphanumeric content.
    Validation,
    /// Malformed query expression; the query is not executed.
    QueryFormat,
    /// Underlying store read/write failure, wrapped with the failing operation.
    Store,
    Io,
    Config,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }

    pub fn validation(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Validation, context.into())
    }

    pub fn query_format(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::QueryFormat, context.into())
    }

    /// Store failure naming the operation and the document id it ran against.
    pub fn store(operation: &str, id: DocId, cause: impl fmt::Display) -> Self {
        Error::new(
            ErrorKind::Store,
            format!("{} failed for document {}: {}", operation, id, cause),
        )
    }

    /// Store failure for operations not tied to a single document.
    pub fn store_op(operation: &str, cause: impl fmt::Display) -> Self {
        Error::new(ErrorKind::Store, format!("{} failed: {}", operation, cause))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error {
            kind: ErrorKind::Store,
            context: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Config,
            context: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
