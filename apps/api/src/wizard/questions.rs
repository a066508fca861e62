//! Per-profession question sets, loaded once at startup from a directory of
//! JSON files (`driver.json`, `housekeeper.json`, ...). The file stem is the
//! profession key. Unknown professions fall back to a configured default set.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Exactly one option is kept; selecting another replaces it.
    #[default]
    Single,
    /// Options toggle in and out of the answer set.
    Multiple,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: String,
    pub question: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    pub options: Vec<String>,
}

impl Question {
    /// Text handed to the speech synthesizer: the question followed by its options.
    pub fn spoken_prompt(&self) -> String {
        format!("{}. Options: {}", self.question, self.options.join(", "))
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfessionSummary {
    pub key: String,
    pub display_name: String,
    pub question_count: usize,
}

#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("Failed to read question directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed question file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid question set '{profession}': {reason}")]
    Invalid { profession: String, reason: String },

    #[error("No questions for profession '{0}' and no fallback set loaded")]
    UnknownProfession(String),
}

/// Read-only question sets keyed by profession.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    sets: BTreeMap<String, Vec<Question>>,
    fallback: String,
}

impl QuestionBank {
    /// Builds a bank from in-memory sets, validating each one.
    pub fn new(
        sets: BTreeMap<String, Vec<Question>>,
        fallback: impl Into<String>,
    ) -> Result<Self, QuestionBankError> {
        for (profession, questions) in &sets {
            validate_set(profession, questions)?;
        }

        let fallback = fallback.into();
        if !sets.contains_key(&fallback) {
            warn!("Fallback question set '{fallback}' is not loaded; unknown professions will 404");
        }

        Ok(Self { sets, fallback })
    }

    /// Loads every `*.json` file in `dir`. Other files are ignored.
    pub fn load_dir(dir: &Path, fallback: &str) -> Result<Self, QuestionBankError> {
        let io_err = |source| QuestionBankError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut sets = BTreeMap::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(profession) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let raw = std::fs::read_to_string(&path).map_err(|source| QuestionBankError::Io {
                path: path.clone(),
                source,
            })?;
            let questions: Vec<Question> =
                serde_json::from_str(&raw).map_err(|source| QuestionBankError::Parse {
                    path: path.clone(),
                    source,
                })?;

            sets.insert(profession.to_string(), questions);
        }

        let bank = Self::new(sets, fallback)?;
        info!(
            "Loaded {} question sets from {}",
            bank.sets.len(),
            dir.display()
        );
        Ok(bank)
    }

    /// Questions for `profession`, or the fallback set when it is unknown.
    pub fn questions_for(&self, profession: &str) -> Result<&[Question], QuestionBankError> {
        if let Some(questions) = self.sets.get(profession) {
            return Ok(questions);
        }

        match self.sets.get(&self.fallback) {
            Some(questions) => {
                info!(
                    "No question set for '{profession}', using '{}'",
                    self.fallback
                );
                Ok(questions)
            }
            None => Err(QuestionBankError::UnknownProfession(
                profession.to_string(),
            )),
        }
    }

    /// Known professions in key order.
    pub fn professions(&self) -> Vec<ProfessionSummary> {
        self.sets
            .iter()
            .map(|(key, questions)| ProfessionSummary {
                key: key.clone(),
                display_name: display_name(key),
                question_count: questions.len(),
            })
            .collect()
    }
}

/// `construction_worker` → `Construction Worker`
pub fn display_name(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn validate_set(profession: &str, questions: &[Question]) -> Result<(), QuestionBankError> {
    let invalid = |reason: String| QuestionBankError::Invalid {
        profession: profession.to_string(),
        reason,
    };

    if questions.is_empty() {
        return Err(invalid("question set is empty".to_string()));
    }

    let mut seen = HashSet::new();
    for (i, q) in questions.iter().enumerate() {
        if q.id.trim().is_empty() {
            return Err(invalid(format!("question {i} has an empty id")));
        }
        if q.options.is_empty() {
            return Err(invalid(format!("question '{}' has no options", q.id)));
        }
        if !seen.insert(q.id.as_str()) {
            return Err(invalid(format!("duplicate question id '{}'", q.id)));
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    pub(crate) fn question(id: &str, kind: QuestionKind, options: &[&str]) -> Question {
        Question {
            id: id.to_string(),
            question: format!("Question {id}?"),
            kind,
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    pub(crate) fn sample_bank() -> QuestionBank {
        let mut sets = BTreeMap::new();
        sets.insert(
            "general".to_string(),
            vec![question("experience", QuestionKind::Single, &["0-2 years", "3-5 years"])],
        );
        sets.insert(
            "driver".to_string(),
            vec![
                question("license", QuestionKind::Single, &["Light Vehicle", "Heavy Vehicle"]),
                question("routes", QuestionKind::Multiple, &["City", "Highway", "Hills"]),
            ],
        );
        QuestionBank::new(sets, "general").unwrap()
    }

    #[test]
    fn test_known_profession_returns_its_set() {
        let bank = sample_bank();
        let questions = bank.questions_for("driver").unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "license");
    }

    #[test]
    fn test_unknown_profession_falls_back_to_general() {
        let bank = sample_bank();
        let questions = bank.questions_for("astronaut").unwrap();
        assert_eq!(questions[0].id, "experience");
    }

    #[test]
    fn test_unknown_profession_without_fallback_errors() {
        let mut sets = BTreeMap::new();
        sets.insert(
            "driver".to_string(),
            vec![question("license", QuestionKind::Single, &["Yes"])],
        );
        let bank = QuestionBank::new(sets, "general").unwrap();
        assert!(matches!(
            bank.questions_for("astronaut"),
            Err(QuestionBankError::UnknownProfession(p)) if p == "astronaut"
        ));
    }

    #[test]
    fn test_rejects_question_without_options() {
        let mut sets = BTreeMap::new();
        sets.insert(
            "driver".to_string(),
            vec![question("license", QuestionKind::Single, &[])],
        );
        let err = QuestionBank::new(sets, "general").unwrap_err();
        assert!(err.to_string().contains("no options"), "{err}");
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut sets = BTreeMap::new();
        sets.insert(
            "driver".to_string(),
            vec![
                question("license", QuestionKind::Single, &["Yes"]),
                question("license", QuestionKind::Single, &["No"]),
            ],
        );
        assert!(matches!(
            QuestionBank::new(sets, "general"),
            Err(QuestionBankError::Invalid { .. })
        ));
    }

    #[test]
    fn test_load_dir_reads_json_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("security_guard.json"),
            r#"[{"id":"shift","question":"Which shift?","type":"multiple","options":["Day","Night"]}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("general.json"),
            r#"[{"id":"age","question":"Age group?","options":["18-25","26-40"]}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("README.txt"), "not a question set").unwrap();

        let bank = QuestionBank::load_dir(dir.path(), "general").unwrap();
        let professions = bank.professions();
        assert_eq!(professions.len(), 2);
        assert_eq!(professions[0].key, "general");
        assert_eq!(professions[1].display_name, "Security Guard");

        let shift = &bank.questions_for("security_guard").unwrap()[0];
        assert_eq!(shift.kind, QuestionKind::Multiple);
        // `type` defaults to single
        assert_eq!(
            bank.questions_for("general").unwrap()[0].kind,
            QuestionKind::Single
        );
    }

    #[test]
    fn test_load_dir_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("driver.json"), "{ not json").unwrap();
        assert!(matches!(
            QuestionBank::load_dir(dir.path(), "general"),
            Err(QuestionBankError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_dir_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            QuestionBank::load_dir(&missing, "general"),
            Err(QuestionBankError::Io { .. })
        ));
    }

    #[test]
    fn test_shipped_question_sets_are_valid() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../questions");
        let bank = QuestionBank::load_dir(&dir, "general").unwrap();
        let keys: Vec<_> = bank.professions().into_iter().map(|p| p.key).collect();
        assert_eq!(
            keys,
            [
                "construction_worker",
                "driver",
                "general",
                "housekeeper",
                "security_guard"
            ]
        );
    }

    #[test]
    fn test_spoken_prompt_lists_options() {
        let q = question("routes", QuestionKind::Multiple, &["City", "Highway"]);
        assert_eq!(q.spoken_prompt(), "Question routes?. Options: City, Highway");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("construction_worker"), "Construction Worker");
        assert_eq!(display_name("driver"), "Driver");
    }
}
