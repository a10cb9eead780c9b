use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod validation;

use clock::Clock;
use config::Config;
use services::CheckinService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub checkins: CheckinService,
    pub clock: Arc<dyn Clock>,
}

pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/api", get(handlers::health::api_index));

    let checkin_routes = get(handlers::checkins::list_checkins)
        .post(handlers::checkins::create_checkin);

    let protected_routes = Router::new()
        .route("/api/checkins", checkin_routes.clone())
        .route("/checkins", checkin_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(handlers::health::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
