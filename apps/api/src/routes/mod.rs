pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::analysis::handlers::handle_analyze;
use crate::extraction::handlers::handle_extract;
use crate::state::AppState;
use crate::tenders::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // AI assistant
        .route("/api/v1/analyze", post(handle_analyze))
        .route("/api/v1/extract", post(handle_extract))
        // Tender records
        .route(
            "/api/v1/tenders",
            get(handlers::handle_list)
                .post(handlers::handle_create)
                .delete(handlers::handle_clear),
        )
        .route("/api/v1/tenders/import", post(handlers::handle_import))
        .route(
            "/api/v1/tenders/:id",
            put(handlers::handle_replace).delete(handlers::handle_delete),
        )
        .with_state(state)
}
