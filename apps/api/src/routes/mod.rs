pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers as matching;
use crate::state::AppState;
use crate::wizard::handlers as wizard;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Question bank
        .route("/api/v1/professions", get(wizard::handle_list_professions))
        .route(
            "/api/v1/questions/:profession",
            get(wizard::handle_get_questions),
        )
        // Voice matching
        .route("/api/v1/voice/match", post(matching::handle_voice_match))
        // Wizard session
        .route("/api/v1/wizard/start", post(wizard::handle_start))
        .route("/api/v1/wizard/transition", post(wizard::handle_transition))
        .route("/api/v1/wizard/voice", post(wizard::handle_voice_answer))
        .route("/api/v1/wizard/download", post(wizard::handle_download))
        .with_state(state)
}
