use uuid::Uuid;

use crate::{
    dto::sse::{
        HeartLostEvent, PhaseChangedEvent, RoundFinishedEvent, RunOverEvent, ServerEvent,
        SystemStatus,
    },
    state::{
        SharedState,
        run::{Phase, RunSummary},
    },
};

const EVENT_HEART_LOST: &str = "heart.lost";
const EVENT_ROUND_FINISHED: &str = "round.finished";
const EVENT_RUN_OVER: &str = "run.over";
const EVENT_PHASE_CHANGED: &str = "phase.changed";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast that a session lost a life.
pub fn broadcast_heart_lost(state: &SharedState, session_id: Uuid) {
    let payload = HeartLostEvent { session_id };
    send_event(state, EVENT_HEART_LOST, &payload);
}

/// Broadcast the summary of a completed round.
pub fn broadcast_round_finished(state: &SharedState, session_id: Uuid, summary: RunSummary) {
    let payload = RoundFinishedEvent {
        session_id,
        summary: summary.into(),
    };
    send_event(state, EVENT_ROUND_FINISHED, &payload);
}

/// Broadcast the terminal summary of an exhausted run.
pub fn broadcast_run_over(state: &SharedState, session_id: Uuid, summary: RunSummary) {
    let payload = RunOverEvent {
        session_id,
        summary: summary.into(),
    };
    send_event(state, EVENT_RUN_OVER, &payload);
}

/// Broadcast a gameplay phase change notification.
pub fn broadcast_phase_changed(state: &SharedState, session_id: Uuid, phase: Phase) {
    let payload = PhaseChangedEvent { session_id, phase };
    send_event(state, EVENT_PHASE_CHANGED, &payload);
}

/// Broadcast whether the backend is in degraded mode.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    let payload = SystemStatus { degraded };
    send_event(state, EVENT_SYSTEM_STATUS, &payload);
}

fn send_event<T: serde::Serialize>(state: &SharedState, name: &str, payload: &T) {
    match ServerEvent::json(Some(name.to_string()), payload) {
        Ok(event) => state.events().broadcast(event),
        Err(err) => tracing::warn!(event = name, error = %err, "failed to serialize SSE event"),
    }
}
