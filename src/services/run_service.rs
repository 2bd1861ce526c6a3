//! Session orchestration: every gameplay mutation funnels through here.
//!
//! Each session lives behind its own async mutex, so at most one transition
//! runs at a time and the countdown task can never interleave with an HTTP
//! request on the same run. Invalid transitions are absorbed by the run
//! state machine itself; the only errors this layer produces are unknown
//! sessions and rejected input.

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::session::{
        ChangeUserRequest, NewRoundRequest, SelectRequest, SessionSnapshot, StartSessionRequest,
    },
    error::ServiceError,
    services::{reconcile_service, sse_events},
    state::{
        SharedState, deck,
        run::{Mode, Phase, Run, RunEvent},
        session::PlayerSession,
    },
};

/// Create a session for a player and start its first run.
pub async fn start_session(
    state: &SharedState,
    request: StartSessionRequest,
) -> Result<SessionSnapshot, ServiceError> {
    request.validate()?;

    let rules = state.rules();
    let round = deck::build_round(state.bank().questions(), rules.round_size);
    let run = Run::new(round, request.mode, rules);

    let id = Uuid::new_v4();
    let slot = Arc::new(Mutex::new(PlayerSession::new(id, request.name, run)));
    state.sessions().insert(id, slot.clone());

    let mut session = slot.lock().await;
    arm_countdown(state, &slot, &mut session);
    info!(session = %id, user = %session.user_name, mode = ?session.run.mode(), "session started");
    Ok(SessionSnapshot::from(&*session))
}

/// Read the current state of a session.
pub async fn snapshot(state: &SharedState, id: Uuid) -> Result<SessionSnapshot, ServiceError> {
    let slot = session_slot(state, id)?;
    let session = slot.lock().await;
    Ok(SessionSnapshot::from(&*session))
}

/// Toggle a choice label on the active question.
pub async fn select(
    state: &SharedState,
    id: Uuid,
    request: SelectRequest,
) -> Result<SessionSnapshot, ServiceError> {
    let slot = session_slot(state, id)?;
    let mut session = slot.lock().await;
    session.run.select(&request.label);
    Ok(SessionSnapshot::from(&*session))
}

/// Grade the current selection.
pub async fn submit(state: &SharedState, id: Uuid) -> Result<SessionSnapshot, ServiceError> {
    let slot = session_slot(state, id)?;
    let mut session = slot.lock().await;

    let before = session.run.phase();
    let events = session.run.submit();
    if session.run.phase() != before {
        session.stop_countdown();
        sse_events::broadcast_phase_changed(state, id, session.run.phase());
    }
    handle_events(state, &mut session, events);
    arm_countdown(state, &slot, &mut session);

    Ok(SessionSnapshot::from(&*session))
}

/// Advance past the review screen to the next question.
pub async fn next(state: &SharedState, id: Uuid) -> Result<SessionSnapshot, ServiceError> {
    let slot = session_slot(state, id)?;
    let mut session = slot.lock().await;

    let before = session.run.phase();
    let events = session.run.next();
    if session.run.phase() != before {
        sse_events::broadcast_phase_changed(state, id, session.run.phase());
    }
    handle_events(state, &mut session, events);
    arm_countdown(state, &slot, &mut session);

    Ok(SessionSnapshot::from(&*session))
}

/// Draw a fresh round into the session, optionally switching mode.
///
/// The previous run is discarded wholesale; its result was already
/// reconciled when it finished.
pub async fn new_round(
    state: &SharedState,
    id: Uuid,
    request: NewRoundRequest,
) -> Result<SessionSnapshot, ServiceError> {
    let slot = session_slot(state, id)?;
    let mut session = slot.lock().await;

    session.stop_countdown();
    let mode = request.mode.unwrap_or_else(|| session.run.mode());
    let rules = state.rules();
    let round = deck::build_round(state.bank().questions(), rules.round_size);
    session.run = Run::new(round, mode, rules);
    arm_countdown(state, &slot, &mut session);
    sse_events::broadcast_phase_changed(state, id, session.run.phase());

    Ok(SessionSnapshot::from(&*session))
}

/// Rebind the session to a different player name.
///
/// Only future reconciliations use the new name; records already merged
/// stay under the old one.
pub async fn change_user(
    state: &SharedState,
    id: Uuid,
    request: ChangeUserRequest,
) -> Result<SessionSnapshot, ServiceError> {
    request.validate()?;
    let slot = session_slot(state, id)?;
    let mut session = slot.lock().await;
    session.user_name = request.name;
    Ok(SessionSnapshot::from(&*session))
}

/// Drop a session, aborting its countdown task.
///
/// The countdown task keeps the slot alive through its own `Arc`, so the
/// abort must happen here; waiting for the slot to drop would deadlock the
/// two references against each other.
pub async fn end_session(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    match state.sessions().remove(&id) {
        Some((_, slot)) => {
            slot.lock().await.stop_countdown();
            info!(session = %id, "session ended");
            Ok(())
        }
        None => Err(ServiceError::NotFound(format!("session {id}"))),
    }
}

fn session_slot(
    state: &SharedState,
    id: Uuid,
) -> Result<Arc<Mutex<PlayerSession>>, ServiceError> {
    state
        .sessions()
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| ServiceError::NotFound(format!("session {id}")))
}

/// React to the events a transition emitted.
///
/// A finished round and an exhausted run both trigger reconciliation on a
/// detached task; exhaustion additionally resets the run in place so the
/// session is immediately playable again.
fn handle_events(state: &SharedState, session: &mut PlayerSession, events: Vec<RunEvent>) {
    for event in events {
        match event {
            RunEvent::HeartLost => sse_events::broadcast_heart_lost(state, session.id),
            RunEvent::RoundFinished(summary) => {
                sse_events::broadcast_round_finished(state, session.id, summary);
                reconcile_service::spawn(state.clone(), session.user_name.clone(), summary);
            }
            RunEvent::RunOver(summary) => {
                sse_events::broadcast_run_over(state, session.id, summary);
                reconcile_service::spawn(state.clone(), session.user_name.clone(), summary);

                let round = deck::build_round(state.bank().questions(), state.rules().round_size);
                if session.run.revive(round) {
                    sse_events::broadcast_phase_changed(state, session.id, session.run.phase());
                }
            }
        }
    }
}

/// Spawn the per-question countdown task when one is needed.
///
/// The task drives [`Run::tick`] once a second and exits on its own as soon
/// as the run leaves the answering phase. A revive triggered by an expiring
/// question keeps the run in the answering phase, so the same task simply
/// carries on into the fresh run.
fn arm_countdown(
    state: &SharedState,
    slot: &Arc<Mutex<PlayerSession>>,
    session: &mut PlayerSession,
) {
    if session.run.mode() != Mode::TimeAttack || session.run.phase() != Phase::Answering {
        return;
    }

    let state = state.clone();
    let slot = slot.clone();
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // consume the immediate first tick so the countdown is a full second
        interval.tick().await;
        loop {
            interval.tick().await;
            let mut session = slot.lock().await;
            if session.run.mode() != Mode::TimeAttack || session.run.phase() != Phase::Answering {
                break;
            }

            let events = session.run.tick();
            if session.run.phase() == Phase::Reviewing {
                sse_events::broadcast_phase_changed(&state, session.id, Phase::Reviewing);
            }
            handle_events(&state, &mut session, events);

            if session.run.phase() != Phase::Answering {
                break;
            }
        }
    });
    session.set_countdown(task);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::record_store::RecordStore,
        questions::{Choice, Question, QuestionBank},
        state::AppState,
    };
    use std::collections::BTreeSet;

    fn bank(len: usize) -> QuestionBank {
        let questions = (0..len)
            .map(|i| Question {
                id: format!("q{i}"),
                prompt: format!("prompt {i}"),
                choices: ["A", "B", "C", "D"]
                    .iter()
                    .map(|label| Choice {
                        label: label.to_string(),
                        text: format!("choice {label}"),
                    })
                    .collect(),
                answers: BTreeSet::from(["A".to_string()]),
            })
            .collect();
        QuestionBank::from_questions(questions)
    }

    fn test_state() -> SharedState {
        AppState::new(AppConfig::default(), bank(30))
    }

    async fn started(state: &SharedState, mode: Mode) -> Uuid {
        let snapshot = start_session(
            state,
            StartSessionRequest {
                name: "ana".into(),
                mode,
            },
        )
        .await
        .unwrap();
        snapshot.id
    }

    #[tokio::test]
    async fn start_session_draws_a_full_round() {
        let state = test_state();
        let id = started(&state, Mode::Classic).await;

        let view = snapshot(&state, id).await.unwrap();
        assert_eq!(view.round_len, 25);
        assert_eq!(view.index, 0);
        assert_eq!(view.lives, 3);
        assert_eq!(view.phase, Phase::Answering);
        assert!(view.question.is_some());
        assert!(view.reveal.is_none(), "answers must not leak while answering");
    }

    #[tokio::test]
    async fn start_session_rejects_invalid_names() {
        let state = test_state();
        let result = start_session(
            &state,
            StartSessionRequest {
                name: "not a valid name!".into(),
                mode: Mode::Classic,
            },
        )
        .await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
        assert!(state.sessions().is_empty());
    }

    #[tokio::test]
    async fn select_submit_next_walks_the_round() {
        let state = test_state();
        let id = started(&state, Mode::Classic).await;

        let view = select(&state, id, SelectRequest { label: "A".into() })
            .await
            .unwrap();
        assert_eq!(view.selection, ["A"]);

        let view = submit(&state, id).await.unwrap();
        assert_eq!(view.phase, Phase::Reviewing);
        assert_eq!(view.score, 10);
        assert!(view.reveal.is_some(), "review exposes the correct labels");

        let view = next(&state, id).await.unwrap();
        assert_eq!(view.phase, Phase::Answering);
        assert_eq!(view.index, 1);
        assert!(view.selection.is_empty());
    }

    #[tokio::test]
    async fn submit_without_selection_changes_nothing() {
        let state = test_state();
        let id = started(&state, Mode::Classic).await;

        let view = submit(&state, id).await.unwrap();
        assert_eq!(view.phase, Phase::Answering);
        assert_eq!(view.seen, 0);
    }

    #[tokio::test]
    async fn exhaustion_reconciles_and_revives_in_place() {
        let state = test_state();
        let id = started(&state, Mode::Classic).await;

        for _ in 0..3 {
            select(&state, id, SelectRequest { label: "B".into() })
                .await
                .unwrap();
            submit(&state, id).await.unwrap();
            next(&state, id).await.unwrap();
        }

        let view = snapshot(&state, id).await.unwrap();
        assert_eq!(view.lives, 3, "session is revived with full lives");
        assert_eq!(view.score, 0);
        assert_eq!(view.index, 0);
        assert_eq!(view.phase, Phase::Answering);

        // The wrong-answer run still produced a zeroed record merge at most;
        // a correct answer before exhaustion must survive into the record.
        select(&state, id, SelectRequest { label: "A".into() })
            .await
            .unwrap();
        submit(&state, id).await.unwrap();
        next(&state, id).await.unwrap();
        for _ in 0..3 {
            select(&state, id, SelectRequest { label: "B".into() })
                .await
                .unwrap();
            submit(&state, id).await.unwrap();
            next(&state, id).await.unwrap();
        }

        // Let the detached reconciliation task run.
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let record = state
            .local_records()
            .find_record("ana")
            .await
            .unwrap()
            .expect("record must exist after exhaustion");
        assert_eq!(record.best_score, 10);
        assert_eq!(record.best_streak, 1);
    }

    #[tokio::test]
    async fn new_round_switches_mode_and_resets_the_run() {
        let state = test_state();
        let id = started(&state, Mode::Classic).await;

        select(&state, id, SelectRequest { label: "A".into() })
            .await
            .unwrap();
        submit(&state, id).await.unwrap();

        let view = new_round(
            &state,
            id,
            NewRoundRequest {
                mode: Some(Mode::Practice),
            },
        )
        .await
        .unwrap();
        assert_eq!(view.mode, Mode::Practice);
        assert_eq!(view.score, 0);
        assert_eq!(view.index, 0);
        assert_eq!(view.phase, Phase::Answering);
    }

    #[tokio::test]
    async fn change_user_affects_future_reconciliation_only() {
        let state = test_state();
        let id = started(&state, Mode::Classic).await;

        let view = change_user(&state, id, ChangeUserRequest { name: "bob".into() })
            .await
            .unwrap();
        assert_eq!(view.user, "bob");

        let rejected = change_user(&state, id, ChangeUserRequest { name: "".into() }).await;
        assert!(matches!(rejected, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn unknown_session_is_a_not_found_error() {
        let state = test_state();
        let missing = Uuid::new_v4();
        assert!(matches!(
            snapshot(&state, missing).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            end_session(&state, missing).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn end_session_removes_the_slot() {
        let state = test_state();
        let id = started(&state, Mode::Classic).await;
        end_session(&state, id).await.unwrap();
        assert!(state.sessions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_expiry_grades_the_question() {
        let state = test_state();
        let id = started(&state, Mode::TimeAttack).await;

        let view = snapshot(&state, id).await.unwrap();
        assert_eq!(view.remaining_seconds, 15);

        tokio::time::sleep(Duration::from_secs(16)).await;

        let view = snapshot(&state, id).await.unwrap();
        assert_eq!(view.phase, Phase::Reviewing);
        assert_eq!(view.seen, 1);
        assert_eq!(view.lives, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_stops_the_countdown_and_next_rearms_it() {
        let state = test_state();
        let id = started(&state, Mode::TimeAttack).await;

        select(&state, id, SelectRequest { label: "A".into() })
            .await
            .unwrap();
        submit(&state, id).await.unwrap();

        // While reviewing, time passing must not grade anything further.
        tokio::time::sleep(Duration::from_secs(30)).await;
        let view = snapshot(&state, id).await.unwrap();
        assert_eq!(view.seen, 1);
        assert_eq!(view.phase, Phase::Reviewing);

        next(&state, id).await.unwrap();
        let view = snapshot(&state, id).await.unwrap();
        assert_eq!(view.remaining_seconds, 15);

        tokio::time::sleep(Duration::from_secs(16)).await;
        let view = snapshot(&state, id).await.unwrap();
        assert_eq!(view.seen, 2, "rearmed countdown graded the next question");
    }
}
