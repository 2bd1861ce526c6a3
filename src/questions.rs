//! Question bank loading. The bank is the read-only question source: it is
//! loaded once at startup and never mutated afterwards.

use std::{collections::BTreeSet, fs, path::Path, sync::Arc};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// A single selectable choice of a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Short label the player picks (usually "A".."F").
    pub label: String,
    /// Display text for the choice.
    pub text: String,
}

/// One immutable quiz question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Stable identifier within the bank.
    pub id: String,
    /// The question text.
    pub prompt: String,
    /// Ordered choices presented to the player.
    pub choices: Vec<Choice>,
    /// Labels of the correct choices. Empty only for malformed data, in
    /// which case any non-empty selection grades as correct (see
    /// [`crate::state::answer::is_correct`]).
    pub answers: BTreeSet<String>,
}

impl Question {
    /// Whether `label` names one of this question's choices.
    pub fn has_choice(&self, label: &str) -> bool {
        self.choices.iter().any(|choice| choice.label == label)
    }

    /// Maximum number of labels a player may have selected at once.
    ///
    /// Multi-answer questions are capped at the number of correct labels,
    /// not the number of choices; malformed questions behave single-answer.
    pub fn selection_capacity(&self) -> usize {
        self.answers.len().max(1)
    }

    /// Whether more than one label must be selected to answer correctly.
    pub fn is_multi(&self) -> bool {
        self.answers.len() > 1
    }
}

/// Failures while loading the question bank.
#[derive(Debug, Error)]
pub enum QuestionBankError {
    /// The bank file could not be read.
    #[error("failed to read question bank `{path}`")]
    Read {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The bank file is not valid JSON of the expected shape.
    #[error("failed to parse question bank `{path}`")]
    Parse {
        /// Path that was attempted.
        path: String,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
    /// The bank parsed but contains no usable questions.
    #[error("question bank `{path}` contains no questions")]
    Empty {
        /// Path that was attempted.
        path: String,
    },
}

/// The loaded, immutable question source.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Arc<Question>>,
}

impl QuestionBank {
    /// Load and validate a bank from a JSON file.
    ///
    /// The on-disk shape matches the original dataset: objects with `q`,
    /// `choices` as `[label, text]` pairs, and `answers` as a label list.
    pub fn load(path: &Path) -> Result<Self, QuestionBankError> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| QuestionBankError::Read {
            path: display.clone(),
            source,
        })?;
        let raw: Vec<RawQuestion> =
            serde_json::from_str(&contents).map_err(|source| QuestionBankError::Parse {
                path: display.clone(),
                source,
            })?;

        let questions = raw
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Arc::new(raw.into_question(index)))
            .collect::<Vec<_>>();

        if questions.is_empty() {
            return Err(QuestionBankError::Empty { path: display });
        }

        Ok(Self { questions })
    }

    /// Build a bank directly from questions (used by tests).
    pub fn from_questions(questions: Vec<Question>) -> Self {
        Self {
            questions: questions.into_iter().map(Arc::new).collect(),
        }
    }

    /// All questions in bank order.
    pub fn questions(&self) -> &[Arc<Question>] {
        &self.questions
    }

    /// Number of questions in the bank.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the bank holds no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of one question in the bank file.
struct RawQuestion {
    #[serde(default)]
    id: Option<String>,
    q: String,
    choices: Vec<(String, String)>,
    #[serde(default)]
    answers: Vec<String>,
}

impl RawQuestion {
    fn into_question(self, index: usize) -> Question {
        let id = self.id.unwrap_or_else(|| format!("q{index}"));
        let choices: Vec<Choice> = self
            .choices
            .into_iter()
            .map(|(label, text)| Choice { label, text })
            .collect();

        // Answers referencing labels that do not exist break the
        // `answers ⊆ choices` invariant; keep them out of the set.
        let mut answers = BTreeSet::new();
        for label in self.answers {
            if choices.iter().any(|choice| choice.label == label) {
                answers.insert(label);
            } else {
                warn!(question = %id, label = %label, "dropping answer label with no matching choice");
            }
        }

        if answers.is_empty() {
            // Data-contract assumption: such a question grades any non-empty
            // selection as correct rather than being reinterpreted.
            warn!(question = %id, "question has no correct labels");
        }

        Question {
            id,
            prompt: self.q,
            choices,
            answers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_question_drops_unknown_answer_labels() {
        let raw = RawQuestion {
            id: None,
            q: "prompt".into(),
            choices: vec![("A".into(), "one".into()), ("B".into(), "two".into())],
            answers: vec!["A".into(), "Z".into()],
        };
        let question = raw.into_question(3);
        assert_eq!(question.id, "q3");
        assert_eq!(
            question.answers,
            BTreeSet::from(["A".to_string()]),
            "unknown label must not survive"
        );
    }

    #[test]
    fn selection_capacity_floors_at_one() {
        let raw = RawQuestion {
            id: Some("weird".into()),
            q: "prompt".into(),
            choices: vec![("A".into(), "one".into())],
            answers: vec![],
        };
        let question = raw.into_question(0);
        assert!(question.answers.is_empty());
        assert_eq!(question.selection_capacity(), 1);
        assert!(!question.is_multi());
    }
}
