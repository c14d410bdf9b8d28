//! Error types for the `auth` crate.
//!
//! Follows the same pattern as the other crates in the workspace with a root Error struct and
//! error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for the auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Token(TokenErrorKind),
    Introspection(IntrospectionErrorKind),
}

/// Problems with the credential presented by a caller.
#[derive(Debug, PartialEq)]
pub enum TokenErrorKind {
    Missing,
    Malformed,
    InvalidClaims,
}

/// Errors from talking to the token introspection endpoint.
#[derive(Debug, PartialEq)]
pub enum IntrospectionErrorKind {
    Network,
    InvalidResponse,
    Config,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match &self.error_kind {
            ErrorKind::Token(kind) => format!("Token error: {:?}", kind),
            ErrorKind::Introspection(kind) => format!("Introspection error: {:?}", kind),
        };
        match &self.source {
            Some(source) => write!(f, "{kind}: {source}"),
            None => write!(f, "{kind}"),
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
        let kind = if err.is_builder() {
            IntrospectionErrorKind::Config
        } else if err.is_decode() {
            IntrospectionErrorKind::InvalidResponse
        } else {
            IntrospectionErrorKind::Network
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Introspection(kind),
        }
    }
}

/// Helper function to create token errors.
pub fn token_error(kind: TokenErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Token(kind),
    }
}

/// Helper function to create introspection errors.
pub fn introspection_error(kind: IntrospectionErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Introspection(kind),
    }
}
