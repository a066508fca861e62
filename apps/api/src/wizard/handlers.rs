//! Axum route handlers for the Wizard API.
//!
//! The server keeps no sessions: each request carries the session value the
//! client received last, and the response carries the next one.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::MatchResult;
use crate::state::AppState;
use crate::wizard::questions::{ProfessionSummary, Question};
use crate::wizard::session::{Progress, Template, WizardEvent, WizardSession};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub profession: String,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub session: WizardSession,
    pub event: WizardEvent,
}

#[derive(Debug, Deserialize)]
pub struct VoiceAnswerRequest {
    pub session: WizardSession,
    pub transcript: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub session: WizardSession,
}

/// The session plus the views both front-ends render from it.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session: WizardSession,
    pub progress: Option<Progress>,
    pub spoken_prompt: Option<String>,
    pub selected_template: Option<Template>,
    pub download_filename: Option<String>,
}

impl From<WizardSession> for SessionView {
    fn from(session: WizardSession) -> Self {
        Self {
            progress: session.progress(),
            spoken_prompt: session.spoken_prompt(),
            selected_template: session.selected_template().cloned(),
            download_filename: session.download_filename(),
            session,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoiceAnswerResponse {
    #[serde(flatten)]
    pub view: SessionView,
    #[serde(rename = "match")]
    pub match_result: MatchResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/professions
pub async fn handle_list_professions(
    State(state): State<AppState>,
) -> Json<Vec<ProfessionSummary>> {
    Json(state.questions.professions())
}

/// GET /api/v1/questions/:profession
///
/// Unknown professions receive the fallback set.
pub async fn handle_get_questions(
    State(state): State<AppState>,
    Path(profession): Path<String>,
) -> Result<Json<Vec<Question>>, AppError> {
    let questions = state.questions.questions_for(&profession)?;
    Ok(Json(questions.to_vec()))
}

/// POST /api/v1/wizard/start
///
/// Opens a session for the chosen profession, positioned on its first question.
pub async fn handle_start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<SessionView>, AppError> {
    let event = select_profession(&state, request.profession)?;
    let session = WizardSession::new().apply(event)?;
    Ok(Json(session.into()))
}

/// POST /api/v1/wizard/transition
pub async fn handle_transition(
    State(state): State<AppState>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<SessionView>, AppError> {
    let TransitionRequest { session, event } = request;

    // reset must recover even a session whose profession is no longer known
    let session = if matches!(event, WizardEvent::Reset) {
        session
    } else {
        with_bank_questions(&state, session)?
    };
    let event = match event {
        WizardEvent::SelectProfession { profession, .. } => select_profession(&state, profession)?,
        event => event,
    };

    let session = session.apply(event)?;
    Ok(Json(session.into()))
}

/// POST /api/v1/wizard/voice
///
/// Matches the transcript against the current question's options. A
/// `no_match` result returns 200 with the session unchanged.
pub async fn handle_voice_answer(
    State(state): State<AppState>,
    Json(request): Json<VoiceAnswerRequest>,
) -> Result<Json<VoiceAnswerResponse>, AppError> {
    let session = with_bank_questions(&state, request.session)?;
    let (session, match_result) = session.answer_by_voice(&request.transcript)?;
    Ok(Json(VoiceAnswerResponse {
        view: session.into(),
        match_result,
    }))
}

/// POST /api/v1/wizard/download
///
/// Serves the selected template as an HTML attachment.
pub async fn handle_download(
    Json(request): Json<DownloadRequest>,
) -> Result<Response, AppError> {
    let (filename, template) = request.session.download()?;
    let html = template.html.clone();

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        html,
    )
        .into_response())
}

/// Swaps the client's copy of the questions for the bank's set, so options
/// and question kinds cannot be edited client-side.
fn with_bank_questions(
    state: &AppState,
    mut session: WizardSession,
) -> Result<WizardSession, AppError> {
    if let Some(profession) = &session.profession {
        session.questions = state.questions.questions_for(profession)?.to_vec();
    }
    Ok(session)
}

fn select_profession(state: &AppState, profession: String) -> Result<WizardEvent, AppError> {
    let profession = profession.trim().to_string();
    if profession.is_empty() {
        return Err(AppError::Validation("profession cannot be empty".to_string()));
    }

    let questions = state.questions.questions_for(&profession)?.to_vec();
    Ok(WizardEvent::SelectProfession {
        profession,
        questions,
    })
}
