pub mod backend;
pub mod config;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod ocr;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use backend::ApiClient;
use config::Config;
use middleware::SessionStore;
use models::{Authenticator, MockDirectory};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: ApiClient,
    pub authenticator: Arc<dyn Authenticator>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            backend: ApiClient::new(config.api_base.clone()),
            config: Arc::new(config),
            authenticator: Arc::new(MockDirectory),
            sessions: SessionStore::default(),
        }
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        // Public routes
        .route("/", get(handlers::home))
        .route("/login", get(handlers::auth::login_page))
        .route("/login", post(handlers::auth::login))
        .route("/signup", get(handlers::auth::signup_page))
        .route("/signup", post(handlers::auth::signup))
        .route("/signup/strength", post(handlers::auth::check_password_strength))
        .route("/logout", post(handlers::auth::logout))

        // Employee
        .route("/employee", get(handlers::employee::dashboard))
        .route("/employee/expenses", post(handlers::employee::submit_expense))
        .route("/employee/receipt/scan", post(handlers::employee::scan))

        // Manager
        .route("/manager", get(handlers::manager::dashboard))
        .route("/manager/expenses/:id/:action", post(handlers::manager::act))

        // Admin
        .route("/admin", get(handlers::admin::view))
        .route("/admin", post(handlers::admin::submit))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))

        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB receipts
        )
        .with_state(state)
}
