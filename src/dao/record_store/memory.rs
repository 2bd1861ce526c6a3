//! In-memory record store backing the local device cache.
//!
//! Gameplay reads the freshest best record from here even while the remote
//! store is unreachable; the reconciler keeps it in sync via the same
//! max-merge it applies remotely.

use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::dao::{
    models::UserRecordEntity,
    record_store::{RecordStore, rank_top},
    storage::StorageResult,
};

/// Keyed in-memory store; never fails.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: DashMap<String, UserRecordEntity>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Vec<UserRecordEntity> {
        self.records
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl RecordStore for MemoryRecordStore {
    fn find_record(
        &self,
        name: &str,
    ) -> BoxFuture<'static, StorageResult<Option<UserRecordEntity>>> {
        let found = self.records.get(name).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn save_record(&self, record: UserRecordEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.records.insert(record.name.clone(), record);
        Box::pin(async move { Ok(()) })
    }

    fn top_by_score(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<UserRecordEntity>>> {
        let ranked = rank_top(self.snapshot(), limit, |record| record.best_score);
        Box::pin(async move { Ok(ranked) })
    }

    fn top_by_streak(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<UserRecordEntity>>> {
        let ranked = rank_top(self.snapshot(), limit, |record| record.best_streak);
        Box::pin(async move { Ok(ranked) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let store = MemoryRecordStore::new();
        let record = UserRecordEntity::absent("ana").merge_run(40, 5);
        store.save_record(record.clone()).await.unwrap();

        let found = store.find_record("ana").await.unwrap();
        assert_eq!(found, Some(record));
        assert_eq!(store.find_record("bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn top_queries_rank_independently() {
        let store = MemoryRecordStore::new();
        store
            .save_record(UserRecordEntity::absent("ana").merge_run(90, 1))
            .await
            .unwrap();
        store
            .save_record(UserRecordEntity::absent("bob").merge_run(10, 8))
            .await
            .unwrap();

        let by_score = store.top_by_score(10).await.unwrap();
        assert_eq!(by_score[0].name, "ana");

        let by_streak = store.top_by_streak(10).await.unwrap();
        assert_eq!(by_streak[0].name, "bob");
    }
}
