use crate::controller::ApiResponse;
use crate::extractors::intake_authorization::IntakeAuthorization;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use domain::intake as IntakeApi;
use domain::intake::{NewPatientIntake, PatientIntake};
use log::*;

const ALLOWED_METHODS: &str = "OPTIONS, POST";

/// OPTIONS check that an intake link is still usable
#[utoipa::path(
    options,
    path = "/intake/{token}",
    params(
        ("token" = String, Path, description = "Intake token from the shared link")
    ),
    responses(
        (status = 204, description = "The intake link is valid"),
        (status = 401, description = "The intake link is invalid, revoked or expired"),
        (status = 429, description = "Too many requests from this client"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn probe(IntakeAuthorization(payload): IntakeAuthorization) -> impl IntoResponse {
    debug!(
        "OPTIONS intake link probe for organization: {}",
        payload.org_id
    );

    (StatusCode::NO_CONTENT, [(header::ALLOW, ALLOWED_METHODS)])
}

/// OPTIONS check that a tablet intake link is still usable
#[utoipa::path(
    options,
    path = "/intake/tablet/{token}",
    params(
        ("token" = String, Path, description = "Intake token from the tablet link")
    ),
    responses(
        (status = 204, description = "The intake link is valid"),
        (status = 401, description = "The intake link is invalid or revoked"),
        (status = 429, description = "Too many requests from this client"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn probe_tablet(authorization: IntakeAuthorization) -> impl IntoResponse {
    probe(authorization).await
}

/// POST submit a patient intake through an intake link
#[utoipa::path(
    post,
    path = "/intake/{token}",
    params(
        ("token" = String, Path, description = "Intake token from the shared link")
    ),
    request_body = NewPatientIntake,
    responses(
        (status = 201, description = "Successfully stored the patient intake", body = PatientIntake),
        (status = 401, description = "The intake link is invalid, revoked or expired"),
        (status = 422, description = "The intake form failed validation"),
        (status = 429, description = "Too many requests from this client"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn submit(
    State(app_state): State<AppState>,
    IntakeAuthorization(payload): IntakeAuthorization,
    Json(intake): Json<NewPatientIntake>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST patient intake for organization: {}", payload.org_id);

    let intake = IntakeApi::submit(app_state.intake_store_ref(), &payload, intake).await?;

    debug!("New patient intake: {:?}", intake.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), intake)),
    ))
}

/// POST submit a patient intake through a tablet intake link
#[utoipa::path(
    post,
    path = "/intake/tablet/{token}",
    params(
        ("token" = String, Path, description = "Intake token from the tablet link")
    ),
    request_body = NewPatientIntake,
    responses(
        (status = 201, description = "Successfully stored the patient intake", body = PatientIntake),
        (status = 401, description = "The intake link is invalid or revoked"),
        (status = 422, description = "The intake form failed validation"),
        (status = 429, description = "Too many requests from this client"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn submit_tablet(
    state: State<AppState>,
    authorization: IntakeAuthorization,
    intake: Json<NewPatientIntake>,
) -> Result<impl IntoResponse, Error> {
    submit(state, authorization, intake).await
}
