use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dto::session::RunSummaryDto, state::run::Phase};

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    /// SSE event name, when the payload is typed.
    pub event: Option<String>,
    /// Pre-serialized data field.
    pub data: String,
}

impl ServerEvent {
    /// Build an event from a pre-rendered data string.
    pub fn new<E>(event: E, data: String) -> Self
    where
        E: Into<Option<String>>,
    {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without the remote record store.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a life is lost; presentation feedback only.
pub struct HeartLostEvent {
    /// Session the life was lost in.
    pub session_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the last question of a round has been reviewed.
pub struct RoundFinishedEvent {
    /// Session that finished its round.
    pub session_id: Uuid,
    /// Result of the run so far.
    pub summary: RunSummaryDto,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a run ends by life exhaustion.
pub struct RunOverEvent {
    /// Session whose run ended.
    pub session_id: Uuid,
    /// Final result of the run.
    pub summary: RunSummaryDto,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever a session's gameplay phase changes.
pub struct PhaseChangedEvent {
    /// Session whose phase changed.
    pub session_id: Uuid,
    /// The phase entered.
    pub phase: Phase,
}
