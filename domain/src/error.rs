//! Error types for the `domain` layer.
use intake_auth::{Error as IntakeAuthError, ErrorKind as IntakeAuthErrorKind, TokenErrorKind};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field holds the original error. `web` depends on
/// `domain` but never directly on `intake-auth` error types; it only looks at
/// `error_kind` to pick an HTTP status.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    IntakeLink(IntakeLinkErrorKind),
    Config,
}

/// Problems with intake records handed to or returned by an `IntakeStore`.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    Invalid,
    /// The store could not complete the operation
    Other(String),
}

/// Reasons an intake link was refused. All of them look the same to the client.
#[derive(Debug, PartialEq)]
pub enum IntakeLinkErrorKind {
    Malformed,
    InvalidSignature,
    Expired,
    Revoked,
}

impl Error {
    pub(crate) fn invalid(message: &str) -> Self {
        Error {
            source: Some(message.to_string().into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Invalid,
            )),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `intake-auth` layer to the `domain` layer.
impl From<IntakeAuthError> for Error {
    fn from(err: IntakeAuthError) -> Self {
        let internal_error_kind = match &err.error_kind {
            IntakeAuthErrorKind::Configuration => InternalErrorKind::Config,
            IntakeAuthErrorKind::Token(token_error_kind) => match token_error_kind {
                TokenErrorKind::Malformed => {
                    InternalErrorKind::IntakeLink(IntakeLinkErrorKind::Malformed)
                }
                TokenErrorKind::InvalidSignature => {
                    InternalErrorKind::IntakeLink(IntakeLinkErrorKind::InvalidSignature)
                }
                TokenErrorKind::Expired => {
                    InternalErrorKind::IntakeLink(IntakeLinkErrorKind::Expired)
                }
                TokenErrorKind::Revoked => {
                    InternalErrorKind::IntakeLink(IntakeLinkErrorKind::Revoked)
                }
                // Only produced while minting, from arguments we were handed
                TokenErrorKind::InvalidPayload => InternalErrorKind::Entity(EntityErrorKind::Invalid),
            },
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(internal_error_kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_auth::error::{configuration_error, token_error};

    #[test]
    fn test_configuration_error_translates_to_config() {
        let err: Error = configuration_error("INTAKE_FORM_SECRET is not set").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_token_errors_translate_to_intake_link_errors() {
        let cases = [
            (TokenErrorKind::Malformed, IntakeLinkErrorKind::Malformed),
            (
                TokenErrorKind::InvalidSignature,
                IntakeLinkErrorKind::InvalidSignature,
            ),
            (TokenErrorKind::Expired, IntakeLinkErrorKind::Expired),
            (TokenErrorKind::Revoked, IntakeLinkErrorKind::Revoked),
        ];

        for (token_kind, expected) in cases {
            let err: Error = token_error(token_kind, "rejected").into();
            assert_eq!(
                err.error_kind,
                DomainErrorKind::Internal(InternalErrorKind::IntakeLink(expected))
            );
        }
    }

    #[test]
    fn test_invalid_payload_translates_to_invalid_entity() {
        let err: Error = token_error(TokenErrorKind::InvalidPayload, "empty orgId").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid))
        );
    }
}
