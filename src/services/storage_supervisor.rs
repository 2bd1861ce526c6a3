//! Remote record store supervision.
//!
//! The supervisor owns the remote store's lifecycle: connect with
//! exponential backoff, install the store into the shared state, poll its
//! health, and tear it back down when it stops responding. The rest of the
//! application only ever sees "a remote store is installed" or "degraded
//! mode"; it never blocks on a connection attempt.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use tracing::{info, warn};

use crate::{
    dao::{record_store::RecordStore, storage::StorageResult},
    services::sse_events,
    state::SharedState,
};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(10);
// Consecutive failed health checks tolerated before the store is dropped.
const MAX_HEALTH_FAILURES: u32 = 3;

/// Factory producing a connected remote store; retried by the supervisor.
pub type ConnectFn =
    Box<dyn Fn() -> BoxFuture<'static, StorageResult<Arc<dyn RecordStore>>> + Send + Sync>;

/// Drive the remote store lifecycle forever. Spawned once at startup.
pub async fn run(state: SharedState, connect: ConnectFn) {
    loop {
        let store = connect_with_backoff(connect.as_ref()).await;
        state.install_record_store(store.clone()).await;
        sse_events::broadcast_system_status(&state, false);
        info!("remote record store connected");

        supervise(store.as_ref()).await;

        state.clear_record_store().await;
        sse_events::broadcast_system_status(&state, true);
        warn!("remote record store lost; entering degraded mode");
    }
}

async fn connect_with_backoff(
    connect: &(dyn Fn() -> BoxFuture<'static, StorageResult<Arc<dyn RecordStore>>> + Send + Sync),
) -> Arc<dyn RecordStore> {
    let mut backoff = INITIAL_BACKOFF;
    loop {
        match connect().await {
            Ok(store) => return store,
            Err(err) => {
                warn!(error = %err, retry_in = ?backoff, "remote record store connection failed");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }
}

/// Poll the installed store until it is considered gone.
async fn supervise(store: &dyn RecordStore) {
    let mut interval = tokio::time::interval(HEALTH_POLL_INTERVAL);
    let mut failures = 0u32;
    loop {
        interval.tick().await;
        match store.health_check().await {
            Ok(()) => failures = 0,
            Err(err) => {
                failures += 1;
                warn!(error = %err, failures, "record store health check failed");

                if store.try_reconnect().await.is_ok() {
                    info!("record store reconnected");
                    failures = 0;
                    continue;
                }
                if failures >= MAX_HEALTH_FAILURES {
                    return;
                }
            }
        }
    }
}
