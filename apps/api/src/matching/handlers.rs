//! Axum route handlers for the Voice Matching API.

use axum::Json;
use serde::Deserialize;

use crate::matching::matcher::{match_best, MatchResult};

#[derive(Debug, Deserialize)]
pub struct VoiceMatchRequest {
    /// Finalized recognizer output, never a partial transcript.
    pub transcript: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// POST /api/v1/voice/match
///
/// Stateless lookup for shells that keep their own answer state.
/// `no_match` is returned with 200 so the caller can prompt the user to repeat.
pub async fn handle_voice_match(Json(request): Json<VoiceMatchRequest>) -> Json<MatchResult> {
    Json(match_best(&request.transcript, &request.options))
}
