use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::wizard::questions::QuestionBankError;
use crate::wizard::session::WizardError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// A voice transcript that matches no option is not an error and never
/// reaches this type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Question bank error: {0}")]
    QuestionBank(#[from] QuestionBankError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Wizard(e @ WizardError::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, "INVALID_TRANSITION", e.to_string())
            }
            AppError::Wizard(e @ WizardError::InvalidSession(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_SESSION", e.to_string())
            }
            AppError::Wizard(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "WIZARD_ERROR",
                e.to_string(),
            ),
            AppError::QuestionBank(e @ QuestionBankError::UnknownProfession(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string())
            }
            AppError::QuestionBank(e) => {
                tracing::error!("Question bank error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "QUESTION_BANK_ERROR",
                    "Question sets are unavailable".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
