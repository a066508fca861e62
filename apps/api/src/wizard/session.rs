//! The wizard session as an explicit value.
//!
//! Every transition consumes a `WizardSession` and returns the next one, so
//! the HTTP layer can hand the session to the client and accept it back on the
//! next request without the server keeping anything.
//!
//! ```text
//! ProfessionSelect → Questioning(i) → ResumeGenerating → TemplateSelect → Download
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::matching::{match_best, MatchResult};
use crate::wizard::questions::{Question, QuestionKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    ProfessionSelect,
    Questioning { index: usize },
    ResumeGenerating,
    TemplateSelect,
    Download,
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::ProfessionSelect => "profession_select",
            Stage::Questioning { .. } => "questioning",
            Stage::ResumeGenerating => "resume_generating",
            Stage::TemplateSelect => "template_select",
            Stage::Download => "download",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Multiple(Vec<String>),
}

impl Answer {
    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Single(option) => option.is_empty(),
            Answer::Multiple(options) => options.is_empty(),
        }
    }
}

/// A finished resume rendering offered by the external generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub name: String,
    pub description: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    SelectProfession {
        profession: String,
        /// Filled from the question bank by the HTTP layer.
        #[serde(default)]
        questions: Vec<Question>,
    },
    SelectOption {
        option: String,
    },
    Next,
    Previous,
    TemplatesReady {
        templates: Vec<Template>,
        /// Structured resume the generator rendered the templates from.
        #[serde(default)]
        resume_data: Option<Value>,
    },
    /// The generator call failed; the user goes back to the last question.
    GenerationFailed,
    SelectTemplate {
        index: usize,
    },
    BackToQuestions,
    Reset,
}

impl WizardEvent {
    fn name(&self) -> &'static str {
        match self {
            WizardEvent::SelectProfession { .. } => "select_profession",
            WizardEvent::SelectOption { .. } => "select_option",
            WizardEvent::Next => "next",
            WizardEvent::Previous => "previous",
            WizardEvent::TemplatesReady { .. } => "templates_ready",
            WizardEvent::GenerationFailed => "generation_failed",
            WizardEvent::SelectTemplate { .. } => "select_template",
            WizardEvent::BackToQuestions => "back_to_questions",
            WizardEvent::Reset => "reset",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WizardError {
    #[error("Cannot apply '{event}' while in stage '{stage}'")]
    InvalidTransition {
        event: &'static str,
        stage: &'static str,
    },

    #[error("Question '{0}' has not been answered")]
    UnansweredQuestion(String),

    #[error("'{option}' is not an option of question '{question_id}'")]
    UnknownOption { question_id: String, option: String },

    #[error("Profession '{0}' has no questions")]
    NoQuestions(String),

    #[error("The resume generator returned no templates")]
    NoTemplates,

    #[error("Template index {index} is out of range ({len} templates)")]
    TemplateOutOfRange { index: usize, len: usize },

    #[error("Inconsistent session: {0}")]
    InvalidSession(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WizardSession {
    pub session_id: Uuid,
    pub profession: Option<String>,
    pub questions: Vec<Question>,
    pub stage: Stage,
    /// Question index the user last viewed; restored by `BackToQuestions`.
    pub current_index: usize,
    pub answers: BTreeMap<String, Answer>,
    pub templates: Vec<Template>,
    #[serde(default)]
    pub resume_data: Option<Value>,
    pub selected_template: Option<usize>,
    pub started_at: DateTime<Utc>,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            profession: None,
            questions: Vec::new(),
            stage: Stage::ProfessionSelect,
            current_index: 0,
            answers: BTreeMap::new(),
            templates: Vec::new(),
            resume_data: None,
            selected_template: None,
            started_at: Utc::now(),
        }
    }

    /// Applies one event, returning the next session or why it was rejected.
    pub fn apply(self, event: WizardEvent) -> Result<Self, WizardError> {
        let event_name = event.name();
        let from = self.stage;

        if !matches!(event, WizardEvent::Reset) {
            self.check_consistent()?;
        }

        let next = match (self.stage, event) {
            (_, WizardEvent::Reset) => Ok(Self::new()),

            (
                Stage::ProfessionSelect,
                WizardEvent::SelectProfession {
                    profession,
                    questions,
                },
            ) => {
                if questions.is_empty() {
                    Err(WizardError::NoQuestions(profession))
                } else {
                    Ok(Self {
                        profession: Some(profession),
                        questions,
                        stage: Stage::Questioning { index: 0 },
                        current_index: 0,
                        answers: BTreeMap::new(),
                        ..self
                    })
                }
            }

            (Stage::Questioning { index }, WizardEvent::SelectOption { option }) => {
                self.select_option(index, option)
            }

            (Stage::Questioning { index }, WizardEvent::Next) => self.next_question(index),

            (Stage::Questioning { index }, WizardEvent::Previous) => {
                Ok(self.show_question(index.saturating_sub(1)))
            }

            (
                Stage::ResumeGenerating,
                WizardEvent::TemplatesReady {
                    templates,
                    resume_data,
                },
            ) => {
                if templates.is_empty() {
                    Err(WizardError::NoTemplates)
                } else {
                    Ok(Self {
                        templates,
                        resume_data,
                        selected_template: None,
                        stage: Stage::TemplateSelect,
                        ..self
                    })
                }
            }

            (Stage::ResumeGenerating, WizardEvent::GenerationFailed) => {
                let index = self.current_index;
                Ok(self.show_question(index))
            }

            (Stage::TemplateSelect | Stage::Download, WizardEvent::SelectTemplate { index }) => {
                if index >= self.templates.len() {
                    Err(WizardError::TemplateOutOfRange {
                        index,
                        len: self.templates.len(),
                    })
                } else {
                    Ok(Self {
                        selected_template: Some(index),
                        stage: Stage::Download,
                        ..self
                    })
                }
            }

            (Stage::TemplateSelect | Stage::Download, WizardEvent::BackToQuestions) => {
                let index = self.current_index;
                Ok(self.show_question(index))
            }

            (stage, _) => Err(WizardError::InvalidTransition {
                event: event_name,
                stage: stage.name(),
            }),
        };

        match &next {
            Ok(session) if session.stage != from => info!(
                "Wizard {}: {} → {} via {event_name}",
                session.session_id,
                from.name(),
                session.stage.name()
            ),
            Ok(_) => {}
            Err(e) => warn!("Wizard transition rejected: {e}"),
        }

        next
    }

    /// Matches a finalized transcript against the current question's options
    /// and, on a hit, selects that option exactly as a click would.
    ///
    /// `NoMatch` returns the session unchanged.
    pub fn answer_by_voice(self, transcript: &str) -> Result<(Self, MatchResult), WizardError> {
        let Stage::Questioning { index } = self.stage else {
            return Err(WizardError::InvalidTransition {
                event: "voice_answer",
                stage: self.stage.name(),
            });
        };
        self.check_consistent()?;

        let result = match_best(transcript, &self.questions[index].options);
        match result.option() {
            Some(option) => {
                let option = option.to_string();
                let session = self.select_option(index, option)?;
                Ok((session, result))
            }
            None => Ok((self, result)),
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.stage {
            Stage::Questioning { index } => self.questions.get(index),
            _ => None,
        }
    }

    pub fn progress(&self) -> Option<Progress> {
        let Stage::Questioning { index } = self.stage else {
            return None;
        };
        let total = self.questions.len();
        Some(Progress {
            current: index + 1,
            total,
            percent: (index + 1) as f64 / total as f64 * 100.0,
        })
    }

    pub fn spoken_prompt(&self) -> Option<String> {
        self.current_question().map(Question::spoken_prompt)
    }

    pub fn selected_template(&self) -> Option<&Template> {
        self.selected_template.and_then(|i| self.templates.get(i))
    }

    /// `resume_<profession>.html`, once a template has been chosen.
    pub fn download_filename(&self) -> Option<String> {
        self.selected_template()?;
        self.profession
            .as_ref()
            .map(|profession| format!("resume_{profession}.html"))
    }

    /// The chosen template and the filename it is saved under. Only available
    /// in the download stage.
    pub fn download(&self) -> Result<(String, &Template), WizardError> {
        if self.stage != Stage::Download {
            return Err(WizardError::InvalidTransition {
                event: "download",
                stage: self.stage.name(),
            });
        }
        self.check_consistent()?;

        let (Some(filename), Some(template)) = (self.download_filename(), self.selected_template())
        else {
            return Err(WizardError::InvalidSession(
                "download stage without a profession or template".to_string(),
            ));
        };
        if filename.chars().any(|c| c == '"' || c == '\\' || c.is_control()) {
            return Err(WizardError::InvalidSession(format!(
                "profession cannot be used in a filename: {filename}"
            )));
        }
        Ok((filename, template))
    }

    /// Sessions round-trip through clients, so indexes are checked before use.
    fn check_consistent(&self) -> Result<(), WizardError> {
        let len = self.questions.len();
        if let Stage::Questioning { index } = self.stage {
            if index >= len {
                return Err(WizardError::InvalidSession(format!(
                    "question index {index} with {len} questions"
                )));
            }
        }
        if self.stage != Stage::ProfessionSelect && (len == 0 || self.current_index >= len) {
            return Err(WizardError::InvalidSession(format!(
                "stage '{}' with {len} questions",
                self.stage.name()
            )));
        }
        if let Some(i) = self.selected_template {
            if i >= self.templates.len() {
                return Err(WizardError::InvalidSession(format!(
                    "selected template {i} with {} templates",
                    self.templates.len()
                )));
            }
        }
        Ok(())
    }

    fn show_question(self, index: usize) -> Self {
        Self {
            stage: Stage::Questioning { index },
            current_index: index,
            ..self
        }
    }

    fn select_option(mut self, index: usize, option: String) -> Result<Self, WizardError> {
        let question = &self.questions[index];
        if !question.has_option(&option) {
            return Err(WizardError::UnknownOption {
                question_id: question.id.clone(),
                option,
            });
        }
        let (id, kind) = (question.id.clone(), question.kind);

        let answer = match (kind, self.answers.remove(&id)) {
            (QuestionKind::Multiple, Some(Answer::Multiple(mut selected))) => {
                match selected.iter().position(|o| *o == option) {
                    Some(pos) => {
                        selected.remove(pos);
                    }
                    None => selected.push(option),
                }
                Answer::Multiple(selected)
            }
            (QuestionKind::Multiple, _) => Answer::Multiple(vec![option]),
            (QuestionKind::Single, _) => Answer::Single(option),
        };

        self.answers.insert(id, answer);
        Ok(self)
    }

    fn next_question(self, index: usize) -> Result<Self, WizardError> {
        let id = &self.questions[index].id;
        if self.answers.get(id).map_or(true, Answer::is_empty) {
            return Err(WizardError::UnansweredQuestion(id.clone()));
        }

        if index + 1 < self.questions.len() {
            Ok(self.show_question(index + 1))
        } else {
            Ok(Self {
                stage: Stage::ResumeGenerating,
                ..self
            })
        }
    }
}
