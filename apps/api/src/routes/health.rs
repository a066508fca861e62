use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and loaded question sets.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "voicewizard-api",
        "question_sets": state.questions.professions().len(),
        "fallback_profession": state.config.fallback_profession,
    }))
}
