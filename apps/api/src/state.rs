use std::sync::Arc;

use crate::config::Config;
use crate::wizard::QuestionBank;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Loaded once at startup; read-only afterwards.
    pub questions: Arc<QuestionBank>,
}
