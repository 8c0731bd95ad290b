pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::profile::handlers as profile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile API
        .route(
            "/api/profile/:user_id",
            get(profile::handle_get_profile).post(profile::handle_upsert_profile),
        )
        // Generation API
        .route(
            "/api/generate-text-variations",
            post(generation::handle_generate_text_variations),
        )
        .route("/api/generate-image", post(generation::handle_generate_image))
        .with_state(state)
}
