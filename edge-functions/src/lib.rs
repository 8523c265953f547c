pub mod config;
pub mod connect;
pub mod handlers;
pub mod health;
pub mod logger;
pub mod registry;
pub mod response;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/ws", get(handlers::connect_upgrade_handler))
        .route("/ws/connect", post(handlers::connect_event_handler))
        .fallback(handlers::not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
