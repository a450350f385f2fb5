use dotenvy::dotenv;

use expensehub::{config::Config, create_router, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let addr = format!("0.0.0.0:{}", config.port);
    log::info!("Using expense backend at {}", config.api_base);
    if config.static_api_token.is_some() {
        log::info!("Backend calls use the configured static bearer token");
    }

    let app = create_router(AppState::new(config));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    log::info!("ExpenseHub listening on http://{}", addr);
    if let Err(e) = axum::serve(listener, app).await {
        log::error!("Server error: {}", e);
    }
}
