//! HTTP routes

pub mod codes;
pub mod payment;

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};

use crate::cache::CacheStats;
use crate::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/manual_payment", get(payment::manual_payment_page))
        .route("/api/manual_payment/request", post(payment::request_payment))
        .route("/api/manual_payment/confirm", post(payment::confirm))
        .route("/api/students", get(codes::student_lookup))
        .route("/api/codes", post(codes::create_code))
        .route("/api/codes/:name", put(codes::update_code))
        .route("/api/cache/stats", get(cache_stats))
        .with_state(state)
}

/// Cache monitoring endpoint
async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}
