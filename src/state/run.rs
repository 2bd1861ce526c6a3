//! The run state machine: one player's live session from full lives to
//! exhaustion (or indefinitely in Practice mode).
//!
//! The machine is total over its inputs — a transition that is invalid in
//! the current phase is a silent no-op, never an error. [`Run::submit`] is
//! the only place score, streak, and lives mutate.

use std::{collections::BTreeSet, sync::Arc};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{config::GameRules, questions::Question, state::answer::is_correct};

/// Gameplay phase within a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The player is picking choices; Submit and (in TimeAttack) Tick apply.
    Answering,
    /// The grading outcome is shown; only Next applies.
    Reviewing,
}

/// Rule variant fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Lives are lost on wrong answers; no countdown.
    Classic,
    /// Classic plus a per-question countdown that force-submits at zero.
    TimeAttack,
    /// Lives are never decremented and the run never ends.
    Practice,
}

/// Summary of a run handed to the reconciler and the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Final score of the run.
    pub score: u32,
    /// Questions graded during the run.
    pub seen: u32,
    /// Questions answered correctly during the run.
    pub correct: u32,
    /// Longest consecutive-correct streak within the run.
    pub best_streak: u32,
}

impl RunSummary {
    /// Accuracy as a rounded percentage, zero when nothing was graded.
    pub fn accuracy_percent(&self) -> u32 {
        if self.seen == 0 {
            0
        } else {
            ((self.correct as f64 / self.seen as f64) * 100.0).round() as u32
        }
    }
}

/// Events emitted by transitions, for the surrounding service to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// A life was lost; presentation feedback only, carries no state.
    HeartLost,
    /// The round's last question was reviewed; carries the run summary.
    /// The machine stays in `Reviewing` — drawing a new round is the
    /// caller's decision.
    RoundFinished(RunSummary),
    /// Lives reached zero. Emitted exactly once per exhaustion; the sole
    /// trigger for reconciliation and for the revive reset.
    RunOver(RunSummary),
}

/// Live state for one run over one round of questions.
#[derive(Debug, Clone)]
pub struct Run {
    round: Vec<Arc<Question>>,
    rules: GameRules,
    mode: Mode,
    phase: Phase,
    index: usize,
    selection: BTreeSet<String>,
    score: u32,
    streak: u32,
    best_streak: u32,
    lives: u8,
    seen: u32,
    correct: u32,
    remaining_seconds: u32,
    // Latched when RunOver fires; cleared only by revive. Makes the
    // exhaustion reset idempotent even if the event is handled twice.
    terminal: bool,
    // Latched when RoundFinished fires so it is emitted once.
    round_done: bool,
}

impl Run {
    /// Start a fresh run in `Answering` on the first question of `round`.
    pub fn new(round: Vec<Arc<Question>>, mode: Mode, rules: GameRules) -> Self {
        let mut run = Self {
            round,
            rules,
            mode,
            phase: Phase::Answering,
            index: 0,
            selection: BTreeSet::new(),
            score: 0,
            streak: 0,
            best_streak: 0,
            lives: rules.max_lives,
            seen: 0,
            correct: 0,
            remaining_seconds: 0,
            terminal: false,
            round_done: false,
        };
        run.begin_question();
        run
    }

    /// Toggle a choice label while answering.
    ///
    /// Single-answer questions replace the whole selection; multi-answer
    /// questions add the label only while below the correct-label count.
    /// Anything else — unknown label, wrong phase, at capacity — is a no-op
    /// so over-selection is prevented rather than surfaced as an error.
    pub fn select(&mut self, label: &str) {
        if self.phase != Phase::Answering || self.terminal {
            return;
        }
        let Some(question) = self.round.get(self.index) else {
            return;
        };
        if !question.has_choice(label) {
            return;
        }

        if self.selection.contains(label) {
            self.selection.remove(label);
        } else if !question.is_multi() {
            self.selection.clear();
            self.selection.insert(label.to_owned());
        } else if self.selection.len() < question.selection_capacity() {
            self.selection.insert(label.to_owned());
        }
    }

    /// Grade the current selection and move to `Reviewing`.
    ///
    /// Requires a non-empty selection; the countdown expiry path is the one
    /// exception and goes through [`Run::tick`]. This is the single point
    /// where score, streak, and lives change.
    pub fn submit(&mut self) -> Vec<RunEvent> {
        if self.selection.is_empty() {
            return Vec::new();
        }
        self.grade()
    }

    /// Advance the TimeAttack countdown by one second.
    ///
    /// At zero the empty selection is graded as a wrong submit. Ticks in
    /// any other mode or phase are no-ops, so a late timer firing after the
    /// phase moved on cannot corrupt the run.
    pub fn tick(&mut self) -> Vec<RunEvent> {
        if self.mode != Mode::TimeAttack || self.phase != Phase::Answering || self.terminal {
            return Vec::new();
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return Vec::new();
        }
        self.selection.clear();
        self.grade()
    }

    /// Leave `Reviewing` for the next question, or finish the round.
    pub fn next(&mut self) -> Vec<RunEvent> {
        if self.phase != Phase::Reviewing || self.terminal || self.round_done {
            return Vec::new();
        }

        if self.index + 1 < self.round.len() {
            self.index += 1;
            self.begin_question();
            Vec::new()
        } else {
            self.round_done = true;
            vec![RunEvent::RoundFinished(self.summary())]
        }
    }

    /// Reset after life exhaustion: fresh counters, full lives, new round.
    ///
    /// Only acts while the terminal latch from [`RunEvent::RunOver`] is
    /// set, so handling the event twice resets exactly once. Returns
    /// whether the reset happened.
    pub fn revive(&mut self, round: Vec<Arc<Question>>) -> bool {
        if !self.terminal {
            return false;
        }
        self.round = round;
        self.index = 0;
        self.score = 0;
        self.streak = 0;
        self.best_streak = 0;
        self.seen = 0;
        self.correct = 0;
        self.lives = self.rules.max_lives;
        self.terminal = false;
        self.round_done = false;
        self.begin_question();
        true
    }

    fn grade(&mut self) -> Vec<RunEvent> {
        if self.phase != Phase::Answering || self.terminal {
            return Vec::new();
        }
        let Some(question) = self.round.get(self.index) else {
            return Vec::new();
        };

        let correct = is_correct(&self.selection, &question.answers);
        self.seen += 1;

        let mut events = Vec::new();
        if correct {
            self.correct += 1;
            self.score += self.rules.points_per_correct;
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
            if self.mode != Mode::Practice && self.lives > 0 {
                self.lives -= 1;
                events.push(RunEvent::HeartLost);
                if self.lives == 0 {
                    self.terminal = true;
                    events.push(RunEvent::RunOver(self.summary()));
                }
            }
        }

        self.phase = Phase::Reviewing;
        events
    }

    fn begin_question(&mut self) {
        self.selection.clear();
        self.phase = Phase::Answering;
        self.remaining_seconds = if self.mode == Mode::TimeAttack {
            self.rules.time_per_question_secs
        } else {
            0
        };
    }

    /// Snapshot of the run's aggregate result.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            score: self.score,
            seen: self.seen,
            correct: self.correct,
            best_streak: self.best_streak,
        }
    }

    /// The question currently being answered or reviewed.
    pub fn current_question(&self) -> Option<&Arc<Question>> {
        self.round.get(self.index)
    }

    /// Current gameplay phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The mode this run was started with.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Zero-based position within the round.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of questions in the current round.
    pub fn round_len(&self) -> usize {
        self.round.len()
    }

    /// Labels currently selected for the active question.
    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    /// Current score; monotone non-decreasing within a run.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current consecutive-correct streak.
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Best streak reached within this run.
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Remaining lives.
    pub fn lives(&self) -> u8 {
        self.lives
    }

    /// Questions graded so far.
    pub fn seen(&self) -> u32 {
        self.seen
    }

    /// Questions answered correctly so far.
    pub fn correct(&self) -> u32 {
        self.correct
    }

    /// Seconds left on the TimeAttack countdown (zero in other modes).
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Whether the run ended by life exhaustion and awaits revival.
    pub fn is_over(&self) -> bool {
        self.terminal
    }

    /// Whether the round's last question has been reviewed.
    pub fn is_round_done(&self) -> bool {
        self.round_done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::Choice;

    fn question(id: &str, answers: &[&str]) -> Arc<Question> {
        let choices = ["A", "B", "C", "D"]
            .iter()
            .map(|label| Choice {
                label: label.to_string(),
                text: format!("choice {label}"),
            })
            .collect();
        Arc::new(Question {
            id: id.to_string(),
            prompt: format!("prompt {id}"),
            choices,
            answers: answers.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn rules() -> GameRules {
        GameRules {
            round_size: 25,
            max_lives: 3,
            time_per_question_secs: 15,
            points_per_correct: 10,
        }
    }

    fn single_answer_run(mode: Mode, len: usize) -> Run {
        let round = (0..len).map(|i| question(&format!("q{i}"), &["A"])).collect();
        Run::new(round, mode, rules())
    }

    fn selected(run: &Run) -> Vec<&str> {
        run.selection().iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn single_answer_selection_replaces_previous_pick() {
        let mut run = single_answer_run(Mode::Classic, 3);
        run.select("A");
        run.select("B");
        assert_eq!(selected(&run), ["B"], "new pick replaces the old one");
        run.select("B");
        assert!(run.selection().is_empty(), "re-selecting toggles off");
    }

    #[test]
    fn multi_answer_selection_is_capped_at_correct_label_count() {
        let round = vec![question("q0", &["A", "C"])];
        let mut run = Run::new(round, Mode::Classic, rules());

        run.select("A");
        run.select("B");
        run.select("D");
        assert_eq!(selected(&run), ["A", "B"], "third distinct pick is a no-op");

        run.select("B");
        run.select("C");
        assert_eq!(selected(&run), ["A", "C"]);
    }

    #[test]
    fn unknown_labels_and_wrong_phase_are_ignored() {
        let mut run = single_answer_run(Mode::Classic, 2);
        run.select("Z");
        assert!(run.selection().is_empty());

        run.select("A");
        run.submit();
        assert_eq!(run.phase(), Phase::Reviewing);
        run.select("B");
        assert_eq!(selected(&run), ["A"], "selecting while reviewing is a no-op");
    }

    #[test]
    fn submit_with_empty_selection_is_a_no_op() {
        let mut run = single_answer_run(Mode::Classic, 2);
        assert!(run.submit().is_empty());
        assert_eq!(run.phase(), Phase::Answering);
        assert_eq!(run.seen(), 0);
    }

    #[test]
    fn correct_submit_scores_and_extends_streak() {
        let mut run = single_answer_run(Mode::Classic, 3);

        run.select("A");
        assert!(run.submit().is_empty());
        assert_eq!(run.score(), 10);
        assert_eq!(run.streak(), 1);
        assert_eq!(run.best_streak(), 1);
        assert_eq!(run.lives(), 3);

        run.next();
        run.select("A");
        run.submit();
        assert_eq!(run.score(), 20);
        assert_eq!(run.best_streak(), 2);
    }

    #[test]
    fn wrong_submit_resets_streak_and_costs_a_life() {
        let mut run = single_answer_run(Mode::Classic, 3);
        run.select("A");
        run.submit();
        run.next();

        run.select("B");
        let events = run.submit();
        assert_eq!(events, vec![RunEvent::HeartLost]);
        assert_eq!(run.streak(), 0);
        assert_eq!(run.best_streak(), 1, "best streak survives the reset");
        assert_eq!(run.lives(), 2);
        assert_eq!(run.score(), 10, "score never decreases");
    }

    #[test]
    fn score_is_monotone_over_any_submit_sequence() {
        let mut run = single_answer_run(Mode::Practice, 10);
        let picks = ["A", "B", "A", "C", "B", "A", "D", "A", "B", "C"];
        let mut last_score = 0;
        for pick in picks {
            run.select(pick);
            run.submit();
            assert!(run.score() >= last_score);
            last_score = run.score();
            run.next();
        }
    }

    #[test]
    fn run_over_fires_exactly_once_after_max_lives_wrong_answers() {
        let mut run = single_answer_run(Mode::Classic, 10);
        let mut run_over_count = 0;

        for _ in 0..3 {
            run.select("B");
            for event in run.submit() {
                if let RunEvent::RunOver(summary) = event {
                    run_over_count += 1;
                    assert_eq!(summary.seen, 3);
                    assert_eq!(summary.score, 0);
                }
            }
            run.next();
        }

        assert_eq!(run.lives(), 0);
        assert_eq!(run_over_count, 1);
        assert!(run.is_over());

        // Terminal state accepts no further transitions until revive.
        run.select("A");
        assert!(run.selection().is_empty());
        assert!(run.next().is_empty());
    }

    #[test]
    fn practice_mode_never_loses_lives_or_ends() {
        let mut run = single_answer_run(Mode::Practice, 12);
        for _ in 0..10 {
            run.select("B");
            let events = run.submit();
            assert!(events.is_empty(), "no hearts lost, no run over");
            assert_eq!(run.streak(), 0);
            run.next();
        }
        assert_eq!(run.lives(), 3);
        assert!(!run.is_over());
    }

    #[test]
    fn round_finished_carries_summary_and_fires_once() {
        let mut run = single_answer_run(Mode::Classic, 2);
        run.select("A");
        run.submit();
        run.next();
        run.select("B");
        run.submit();

        let events = run.next();
        match events.as_slice() {
            [RunEvent::RoundFinished(summary)] => {
                assert_eq!(summary.seen, 2);
                assert_eq!(summary.correct, 1);
                assert_eq!(summary.score, 10);
                assert_eq!(summary.accuracy_percent(), 50);
            }
            other => panic!("expected round finished, got {other:?}"),
        }

        assert!(run.next().is_empty(), "round finished is emitted once");
        assert!(run.is_round_done());
    }

    #[test]
    fn tick_counts_down_and_expiry_grades_as_wrong() {
        let mut run = single_answer_run(Mode::TimeAttack, 3);
        assert_eq!(run.remaining_seconds(), 15);

        for _ in 0..14 {
            assert!(run.tick().is_empty());
        }
        assert_eq!(run.remaining_seconds(), 1);

        let events = run.tick();
        assert_eq!(events, vec![RunEvent::HeartLost]);
        assert_eq!(run.phase(), Phase::Reviewing);
        assert_eq!(run.streak(), 0);
        assert_eq!(run.lives(), 2);
        assert_eq!(run.seen(), 1);
    }

    #[test]
    fn expiry_discards_a_partial_selection() {
        let round = vec![question("q0", &["A", "B"]), question("q1", &["A"])];
        let mut run = Run::new(round, Mode::TimeAttack, rules());
        run.select("A");

        for _ in 0..15 {
            run.tick();
        }
        assert_eq!(run.phase(), Phase::Reviewing);
        assert_eq!(run.lives(), 2, "partial selection grades as wrong");
    }

    #[test]
    fn late_ticks_outside_answering_are_no_ops() {
        let mut run = single_answer_run(Mode::TimeAttack, 2);
        run.select("A");
        run.submit();
        assert_eq!(run.phase(), Phase::Reviewing);

        assert!(run.tick().is_empty());
        assert_eq!(run.seen(), 1);

        let mut classic = single_answer_run(Mode::Classic, 2);
        assert!(classic.tick().is_empty());
        assert_eq!(classic.remaining_seconds(), 0);
    }

    #[test]
    fn next_resets_selection_and_countdown() {
        let mut run = single_answer_run(Mode::TimeAttack, 3);
        run.tick();
        run.select("A");
        run.submit();
        run.next();

        assert_eq!(run.phase(), Phase::Answering);
        assert_eq!(run.index(), 1);
        assert!(run.selection().is_empty());
        assert_eq!(run.remaining_seconds(), 15);
    }

    #[test]
    fn revive_is_idempotent_and_restores_full_lives() {
        let mut run = single_answer_run(Mode::Classic, 5);
        for _ in 0..3 {
            run.select("B");
            run.submit();
            run.next();
        }
        assert!(run.is_over());

        let fresh: Vec<Arc<Question>> =
            (0..5).map(|i| question(&format!("n{i}"), &["A"])).collect();
        assert!(run.revive(fresh.clone()));
        assert_eq!(run.lives(), 3);
        assert_eq!(run.score(), 0);
        assert_eq!(run.index(), 0);
        assert_eq!(run.phase(), Phase::Answering);

        assert!(!run.revive(fresh), "second revive must be a no-op");
    }

    #[test]
    fn malformed_question_accepts_any_pick() {
        let round = vec![question("broken", &[])];
        let mut run = Run::new(round, Mode::Classic, rules());
        run.select("C");
        run.submit();
        assert_eq!(run.score(), 10);
        assert_eq!(run.lives(), 3);
    }
}
