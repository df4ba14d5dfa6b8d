use axum::{Router, routing::get};
use std::sync::Arc;

use crate::api::handlers::{AppState, get_form, get_prediction, get_table};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/predict/:player_a/:player_b", get(get_prediction))
        .route("/api/form/:player", get(get_form))
        .route("/api/table", get(get_table))
        .with_state(state)
}
