use axum::{
    extract::{FromRef, FromRequestParts, Path},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use domain::intake_link;
use domain::TokenPayload;
use log::*;

use crate::error::INTAKE_LINK_REJECTED;
use crate::{AppState, Error};

/// The verified payload of the intake token in the request path.
///
/// Authority comes from the token alone; whether it arrived under `/intake/` or
/// `/intake/tablet/` makes no difference.
pub struct IntakeAuthorization(pub TokenPayload);

impl<S> FromRequestParts<S> for IntakeAuthorization
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let Path(token) = match Path::<String>::from_request_parts(parts, &state).await {
            Ok(path) => path,
            Err(e) => {
                debug!("Intake request without a usable token: {e}");
                return Err((StatusCode::UNAUTHORIZED, INTAKE_LINK_REJECTED).into_response());
            }
        };

        let service_state = &state.service_state;
        intake_link::authorize(
            &service_state.token_codec,
            service_state.revocations.as_ref(),
            &token,
        )
        .map(IntakeAuthorization)
        .map_err(|e| Error::from(e).into_response())
    }
}
