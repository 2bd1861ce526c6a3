use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the backend currently has its remote record store.
///
/// Gameplay works either way; "degraded" only means records live solely in
/// the local cache until the remote comes back.
pub async fn health(state: &SharedState) -> HealthResponse {
    if state.is_degraded().await {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
