//! Error types for the `sse` crate.
//!
//! Only client construction returns errors. Failures while running a stream are
//! reported as [`ConnectionOutcome`](crate::ConnectionOutcome) values instead.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for the `sse` crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in the `sse` crate.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Config(ConfigErrorKind),
    Transport,
}

/// Invalid client configuration.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    OutcomeCapacity,
    StoppedCapacity,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Config(kind) => write!(f, "SSE client config error: {:?}", kind),
            ErrorKind::Transport => write!(f, "SSE client transport error"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Transport,
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config(kind),
    }
}
