/// CouchDB-backed remote record store.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// In-memory local record cache.
pub mod memory;

use crate::dao::models::UserRecordEntity;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer for per-user best records.
///
/// Two instances exist at runtime: the always-available in-memory local
/// cache and, when connected, the remote authoritative store. Both expose
/// the same keyed read/write contract so the reconciler treats them alike.
pub trait RecordStore: Send + Sync {
    /// Fetch the record stored under `name`, if any.
    fn find_record(&self, name: &str)
    -> BoxFuture<'static, StorageResult<Option<UserRecordEntity>>>;
    /// Write `record`, replacing any previous version for the same name.
    fn save_record(&self, record: UserRecordEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Top `limit` records by best score, descending.
    fn top_by_score(&self, limit: usize)
    -> BoxFuture<'static, StorageResult<Vec<UserRecordEntity>>>;
    /// Top `limit` records by best streak, descending.
    fn top_by_streak(&self, limit: usize)
    -> BoxFuture<'static, StorageResult<Vec<UserRecordEntity>>>;
    /// Probe whether the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish a lost connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Order records by a value accessor, descending, with the user name as a
/// deterministic tiebreaker, and keep the first `limit` entries.
pub(crate) fn rank_top<F>(
    mut records: Vec<UserRecordEntity>,
    limit: usize,
    value: F,
) -> Vec<UserRecordEntity>
where
    F: Fn(&UserRecordEntity) -> u32,
{
    records.sort_by(|a, b| value(b).cmp(&value(a)).then_with(|| a.name.cmp(&b.name)));
    records.truncate(limit);
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, score: u32, streak: u32) -> UserRecordEntity {
        UserRecordEntity {
            best_score: score,
            best_streak: streak,
            ..UserRecordEntity::absent(name)
        }
    }

    #[test]
    fn rank_top_is_descending_and_deterministic_on_ties() {
        let records = vec![
            record("zoe", 50, 1),
            record("ana", 50, 2),
            record("bob", 70, 3),
            record("cat", 10, 9),
        ];

        let ranked = rank_top(records, 3, |r| r.best_score);
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["bob", "ana", "zoe"], "ties break on name ascending");
    }
}
