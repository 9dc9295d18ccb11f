use crate::{
    controller::{health_check_controller, intake_controller},
    middleware::rate_limit,
    AppState,
};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, options},
    Router,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Patient Intake API"
        ),
        paths(
            health_check_controller::health_check,
            intake_controller::probe,
            intake_controller::probe_tablet,
            intake_controller::submit,
            intake_controller::submit_tablet,
        ),
        components(
            schemas(
                domain::intake::IntakeSource,
                domain::intake::NewPatientIntake,
                domain::intake::PatientIntake,
            )
        ),
        tags(
            (name = "intake_platform", description = "Public patient intake through signed intake links")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(intake_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// Public routes: the intake token in the path is the only credential
fn intake_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/intake/{token}",
            options(intake_controller::probe).post(intake_controller::submit),
        )
        .route(
            "/intake/tablet/{token}",
            options(intake_controller::probe_tablet).post(intake_controller::submit_tablet),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            rate_limit::limit_intake_requests,
        ))
        .with_state(app_state)
}
