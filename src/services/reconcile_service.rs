//! Best-record reconciliation: after each finished run, max-merge the run's
//! result into every reachable record store.
//!
//! Each store is reconciled independently with a read-modify-write cycle, so
//! a remote outage never blocks the local cache and the stores converge as
//! soon as both are reachable again. Because both fields only ever go up,
//! replaying a reconciliation is harmless.

use tracing::{debug, warn};

use crate::{
    dao::{models::UserRecordEntity, record_store::RecordStore, storage::StorageResult},
    state::{SharedState, run::RunSummary},
};

/// Fire-and-forget reconciliation of a finished run.
///
/// Gameplay never waits on storage: the merge runs on its own task and a
/// failing remote is logged and dropped, not surfaced to the player.
pub fn spawn(state: SharedState, user_name: String, summary: RunSummary) {
    tokio::spawn(async move {
        reconcile(&state, &user_name, summary).await;
    });
}

/// Merge `summary` into the local cache and, when installed, the remote
/// store.
pub async fn reconcile(state: &SharedState, user_name: &str, summary: RunSummary) {
    let local = state.local_records();
    if let Err(err) = merge_into(local.as_ref(), user_name, summary).await {
        warn!(user = %user_name, error = %err, "failed to reconcile local record");
    }

    match state.remote_records().await {
        Some(remote) => {
            if let Err(err) = merge_into(remote.as_ref(), user_name, summary).await {
                warn!(user = %user_name, error = %err, "failed to reconcile remote record");
            }
        }
        None => {
            debug!(user = %user_name, "remote store not installed; local record only");
        }
    }
}

/// Read-modify-write max-merge against a single store.
///
/// Writes only when the run actually raises a field, mirroring the
/// "update if better" contract the records have always had.
async fn merge_into(
    store: &dyn RecordStore,
    user_name: &str,
    summary: RunSummary,
) -> StorageResult<()> {
    let current = store
        .find_record(user_name)
        .await?
        .unwrap_or_else(|| UserRecordEntity::absent(user_name));

    if summary.score <= current.best_score && summary.best_streak <= current.best_streak {
        return Ok(());
    }

    let merged = current.merge_run(summary.score, summary.best_streak);
    store.save_record(merged).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::record_store::memory::MemoryRecordStore;

    fn summary(score: u32, best_streak: u32) -> RunSummary {
        RunSummary {
            score,
            seen: 10,
            correct: 5,
            best_streak,
        }
    }

    #[tokio::test]
    async fn worse_run_never_lowers_a_record() {
        let store = MemoryRecordStore::new();
        merge_into(&store, "ana", summary(50, 3)).await.unwrap();
        merge_into(&store, "ana", summary(30, 2)).await.unwrap();

        let record = store.find_record("ana").await.unwrap().unwrap();
        assert_eq!(record.best_score, 50);
        assert_eq!(record.best_streak, 3);
    }

    #[tokio::test]
    async fn fields_are_merged_independently() {
        let store = MemoryRecordStore::new();
        merge_into(&store, "bob", summary(50, 1)).await.unwrap();
        merge_into(&store, "bob", summary(20, 7)).await.unwrap();

        let record = store.find_record("bob").await.unwrap().unwrap();
        assert_eq!(record.best_score, 50, "score keeps the earlier maximum");
        assert_eq!(record.best_streak, 7, "streak takes the later maximum");
    }

    #[tokio::test]
    async fn replaying_the_same_run_is_idempotent() {
        let store = MemoryRecordStore::new();
        merge_into(&store, "cat", summary(40, 4)).await.unwrap();
        let first = store.find_record("cat").await.unwrap().unwrap();

        merge_into(&store, "cat", summary(40, 4)).await.unwrap();
        let second = store.find_record("cat").await.unwrap().unwrap();
        assert_eq!(first, second);
    }
}
