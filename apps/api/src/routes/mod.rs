pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::jobs::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/jobs", get(handlers::handle_list_jobs))
        .route("/jobs/:id/save", post(handlers::handle_save))
        .route("/jobs/:id/unsave", post(handlers::handle_unsave))
        .route("/jobs/:id/applied", post(handlers::handle_mark_applied))
        .route("/jobs/:id/undo-applied", post(handlers::handle_undo_applied))
        .route("/saved", get(handlers::handle_list_saved))
        .route("/applied", get(handlers::handle_list_applied))
        .with_state(state)
}
