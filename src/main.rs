use domain::intake_store::InMemoryIntakeStore;
use log::*;
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    info!(
        "Starting up intake platform [{}]...",
        config.runtime_env()
    );

    let service_state = service::AppState::new(config);

    let sweeper = service::rate_limit::spawn_sweeper(
        Arc::clone(&service_state.rate_limiter),
        service_state.config.rate_limit_sweep_interval(),
    );

    // Intakes live in process memory; a persistent store plugs in behind IntakeStore
    let intake_store = Arc::new(InMemoryIntakeStore::new());
    let app_state = web::AppState::new(service_state, intake_store);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server failed: {e}");
        sweeper.abort();
        std::process::exit(1);
    }
}
