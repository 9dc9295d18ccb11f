//! Error types for the `intake-auth` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for intake-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in intake-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The signing secret is missing or empty. A deployment fault, never the client's.
    Configuration,
    /// The token was rejected.
    Token(TokenErrorKind),
}

/// Reasons a token is rejected or can not be minted.
#[derive(Debug, PartialEq)]
pub enum TokenErrorKind {
    /// Wrong segment count, undecodable base64url or JSON, or a missing `orgId`.
    Malformed,
    /// The payload handed to `mint` would never verify.
    InvalidPayload,
    /// Signature length or content does not match.
    InvalidSignature,
    /// Deadline reached, or an expiring token without a deadline.
    Expired,
    /// Present on the revocation list.
    Revoked,
}

impl Error {
    pub fn is_configuration(&self) -> bool {
        self.error_kind == ErrorKind::Configuration
    }

    pub fn is_expired(&self) -> bool {
        self.error_kind == ErrorKind::Token(TokenErrorKind::Expired)
    }

    /// True for every error that should be answered with a generic 401.
    pub fn is_rejection(&self) -> bool {
        matches!(self.error_kind, ErrorKind::Token(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Configuration => write!(f, "Intake token configuration error")?,
            ErrorKind::Token(kind) => write!(f, "Intake token error: {:?}", kind)?,
        }
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Helper function to create configuration errors.
pub fn configuration_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Configuration,
    }
}

/// Helper function to create token errors.
pub fn token_error(kind: TokenErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Token(kind),
    }
}

/// Helper function to create token errors that wrap an underlying decode failure.
pub fn token_error_from<E>(kind: TokenErrorKind, err: E) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Token(kind),
    }
}
