use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, InternalErrorKind,
};

extern crate log;

/// Body of every rejected intake link. Clients can not tell the reasons apart.
pub(crate) const INTAKE_LINK_REJECTED: &str = "invalid or expired intake link";

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::Invalid => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE ENTITY").into_response()
                    }
                    EntityErrorKind::Other(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                    }
                },
                InternalErrorKind::IntakeLink(_) => {
                    (StatusCode::UNAUTHORIZED, INTAKE_LINK_REJECTED).into_response()
                }
                InternalErrorKind::Config => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::error::IntakeLinkErrorKind;

    fn status_of(error_kind: DomainErrorKind) -> StatusCode {
        Error(DomainError {
            source: None,
            error_kind,
        })
        .into_response()
        .status()
    }

    #[test]
    fn test_intake_link_rejections_are_unauthorized() {
        for kind in [
            IntakeLinkErrorKind::Malformed,
            IntakeLinkErrorKind::InvalidSignature,
            IntakeLinkErrorKind::Expired,
            IntakeLinkErrorKind::Revoked,
        ] {
            assert_eq!(
                status_of(DomainErrorKind::Internal(InternalErrorKind::IntakeLink(kind))),
                StatusCode::UNAUTHORIZED
            );
        }
    }

    #[test]
    fn test_config_error_is_internal_server_error() {
        assert_eq!(
            status_of(DomainErrorKind::Internal(InternalErrorKind::Config)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_entity_is_unprocessable() {
        assert_eq!(
            status_of(DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Invalid
            ))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
