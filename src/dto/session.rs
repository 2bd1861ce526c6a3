use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::validate_user_name,
    questions::Question,
    state::{
        run::{Mode, Phase, Run, RunSummary},
        session::PlayerSession,
    },
};

/// Payload used to start a brand-new play session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    /// Player name the best record is tracked under.
    pub name: String,
    /// Rule variant for the run.
    pub mode: Mode,
}

impl Validate for StartSessionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_user_name(&self.name) {
            errors.add("name", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload used to draw a fresh round into an existing session.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct NewRoundRequest {
    /// Optional mode switch; the current mode is kept when omitted.
    #[serde(default)]
    pub mode: Option<Mode>,
}

/// Payload toggling one choice label.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectRequest {
    /// Label of the choice to toggle.
    pub label: String,
}

/// Payload rebinding the session to another player name.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeUserRequest {
    /// New player name.
    pub name: String,
}

impl Validate for ChangeUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_user_name(&self.name) {
            errors.add("name", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Public projection of one choice.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChoiceView {
    /// Label the player selects.
    pub label: String,
    /// Display text.
    pub text: String,
}

/// Public projection of the active question.
///
/// Never carries the correct labels; those appear in [`RevealView`] once
/// the session is reviewing.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionView {
    /// Question identifier within the bank.
    pub id: String,
    /// Question text.
    pub prompt: String,
    /// Ordered choices.
    pub choices: Vec<ChoiceView>,
    /// Whether several labels must be selected.
    pub multi: bool,
    /// Maximum selectable labels for this question.
    pub capacity: usize,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            prompt: question.prompt.clone(),
            choices: question
                .choices
                .iter()
                .map(|choice| ChoiceView {
                    label: choice.label.clone(),
                    text: choice.text.clone(),
                })
                .collect(),
            multi: question.is_multi(),
            capacity: question.selection_capacity(),
        }
    }
}

/// Grading outcome shown while reviewing.
#[derive(Debug, Serialize, ToSchema)]
pub struct RevealView {
    /// The correct labels for the reviewed question.
    pub correct_labels: Vec<String>,
}

/// Aggregate result of a run.
#[derive(Debug, Serialize, ToSchema)]
pub struct RunSummaryDto {
    /// Final score.
    pub score: u32,
    /// Questions graded.
    pub seen: u32,
    /// Questions answered correctly.
    pub correct: u32,
    /// Accuracy as a rounded percentage.
    pub accuracy_percent: u32,
    /// Longest streak within the run.
    pub best_streak: u32,
}

impl From<RunSummary> for RunSummaryDto {
    fn from(summary: RunSummary) -> Self {
        Self {
            score: summary.score,
            seen: summary.seen,
            correct: summary.correct,
            accuracy_percent: summary.accuracy_percent(),
            best_streak: summary.best_streak,
        }
    }
}

/// Full state of a session as exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub id: Uuid,
    /// Player the session belongs to.
    pub user: String,
    /// Rule variant of the current run.
    pub mode: Mode,
    /// Current gameplay phase.
    pub phase: Phase,
    /// Zero-based question position within the round.
    pub index: usize,
    /// Number of questions in the round.
    pub round_len: usize,
    /// Current score.
    pub score: u32,
    /// Current streak.
    pub streak: u32,
    /// Best streak of this run.
    pub best_streak: u32,
    /// Remaining lives.
    pub lives: u8,
    /// Questions graded so far.
    pub seen: u32,
    /// Questions answered correctly so far.
    pub correct: u32,
    /// Seconds left on the countdown (TimeAttack only).
    pub remaining_seconds: u32,
    /// Labels currently selected.
    pub selection: Vec<String>,
    /// Whether the round's last question has been reviewed.
    pub round_done: bool,
    /// The active question, when the round is non-empty.
    pub question: Option<QuestionView>,
    /// Correct labels of the reviewed question; present only while reviewing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal: Option<RevealView>,
}

impl From<&PlayerSession> for SessionSnapshot {
    fn from(session: &PlayerSession) -> Self {
        let run: &Run = &session.run;
        let question = run.current_question().map(|q| QuestionView::from(q.as_ref()));
        let reveal = match run.phase() {
            Phase::Reviewing => run.current_question().map(|q| RevealView {
                correct_labels: q.answers.iter().cloned().collect(),
            }),
            Phase::Answering => None,
        };

        Self {
            id: session.id,
            user: session.user_name.clone(),
            mode: run.mode(),
            phase: run.phase(),
            index: run.index(),
            round_len: run.round_len(),
            score: run.score(),
            streak: run.streak(),
            best_streak: run.best_streak(),
            lives: run.lives(),
            seen: run.seen(),
            correct: run.correct(),
            remaining_seconds: run.remaining_seconds(),
            selection: run.selection().iter().cloned().collect(),
            round_done: run.is_round_done(),
            question,
            reveal,
        }
    }
}
