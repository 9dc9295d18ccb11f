use axum::http::{header, HeaderValue, Method};
use domain::intake_store::IntakeStore;
use log::*;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use self::error::{Error, Result};

mod controller;
mod error;
mod extractors;
mod middleware;
pub mod router;

// Web-level state: the service infrastructure plus the intake storage seam.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub intake_store: Arc<dyn IntakeStore>,
}

impl AppState {
    pub fn new(service_state: service::AppState, intake_store: Arc<dyn IntakeStore>) -> Self {
        Self {
            service_state,
            intake_store,
        }
    }

    pub fn intake_store_ref(&self) -> &dyn IntakeStore {
        self.intake_store.as_ref()
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let config = &app_state.service_state.config;
    let interface = config.interface.as_deref().unwrap_or("127.0.0.1");
    let server_url = format!("{interface}:{}", config.port);
    let cors = cors_layer(&config.allowed_origins);

    info!("Server starting... listening for connections on http://{server_url}");

    let listener = TcpListener::bind(&server_url).await?;
    let app = router::define_routes(app_state).layer(cors);

    // ConnectInfo gives the rate limiter a peer address when no proxy header is present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();

    debug!("Allowed CORS origins: {origins:?}");

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
