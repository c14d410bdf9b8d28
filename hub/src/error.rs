//! Error types for the `hub` crate.
//!
//! Follows the same shape as the other crates in the workspace: a root `Error` struct holding an
//! error kind and an optional source for error chaining.

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The hub's command loop is no longer running.
    HubUnavailable,
    /// Reading from or writing to a subscriber's socket failed.
    Transport,
    /// A write to a subscriber's socket did not complete within the write deadline.
    WriteTimeout,
    Serialization,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Hub error: {:?}: {}", self.error_kind, source),
            None => write!(f, "Hub error: {:?}", self.error_kind),
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

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Serialization,
        }
    }
}

pub(crate) fn hub_unavailable() -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::HubUnavailable,
    }
}

pub(crate) fn transport_error<E>(err: E) -> Error
where
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    Error {
        source: Some(err.into()),
        error_kind: ErrorKind::Transport,
    }
}

pub(crate) fn write_timeout() -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::WriteTimeout,
    }
}
