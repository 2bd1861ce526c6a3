//! Record read-back and leaderboard queries.
//!
//! Reads prefer the remote store because it survives restarts; while the
//! backend is degraded the queries fall back to the local cache, which may
//! be stale but keeps the endpoints serving.

use tracing::warn;

use crate::{
    dao::{models::UserRecordEntity, record_store::RecordStore},
    dto::record::LeaderboardEntry,
    dto::validation::validate_user_name,
    error::ServiceError,
    state::SharedState,
};

/// Hard ceiling on leaderboard page size.
const MAX_LIMIT: usize = 100;

/// Which record field a leaderboard ranks by.
#[derive(Debug, Clone, Copy)]
enum RankBy {
    Score,
    Streak,
}

/// Top records ranked by best score.
pub async fn top_by_score(
    state: &SharedState,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    leaderboard(state, limit, RankBy::Score).await
}

/// Top records ranked by best streak.
pub async fn top_by_streak(
    state: &SharedState,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    leaderboard(state, limit, RankBy::Streak).await
}

/// The merged best record for one player.
///
/// Both reachable stores are consulted and their copies max-merged, so the
/// answer is never worse than either copy even while they have diverged.
pub async fn record_for(
    state: &SharedState,
    name: &str,
) -> Result<UserRecordEntity, ServiceError> {
    validate_user_name(name)
        .map_err(|err| ServiceError::InvalidInput(format!("invalid player name: {err}")))?;

    let local = match state.local_records().find_record(name).await {
        Ok(record) => record,
        Err(err) => {
            warn!(user = %name, error = %err, "local record lookup failed");
            None
        }
    };

    let remote = match state.remote_records().await {
        Some(store) => match store.find_record(name).await {
            Ok(record) => record,
            Err(err) => {
                warn!(user = %name, error = %err, "remote record lookup failed");
                None
            }
        },
        None => None,
    };

    match (local, remote) {
        (Some(a), Some(b)) => Ok(max_merge(a, b)),
        (Some(record), None) | (None, Some(record)) => Ok(record),
        (None, None) => Err(ServiceError::NotFound(format!("record for {name}"))),
    }
}

async fn leaderboard(
    state: &SharedState,
    limit: usize,
    rank_by: RankBy,
) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    let limit = limit.clamp(1, MAX_LIMIT);

    if let Some(remote) = state.remote_records().await {
        let query = match rank_by {
            RankBy::Score => remote.top_by_score(limit),
            RankBy::Streak => remote.top_by_streak(limit),
        };
        match query.await {
            Ok(records) => return Ok(to_entries(records, rank_by)),
            Err(err) => {
                warn!(error = %err, "remote leaderboard query failed; serving local cache");
            }
        }
    }

    let local = state.local_records();
    let records = match rank_by {
        RankBy::Score => local.top_by_score(limit).await?,
        RankBy::Streak => local.top_by_streak(limit).await?,
    };
    Ok(to_entries(records, rank_by))
}

fn to_entries(records: Vec<UserRecordEntity>, rank_by: RankBy) -> Vec<LeaderboardEntry> {
    records
        .into_iter()
        .map(|record| LeaderboardEntry {
            value: match rank_by {
                RankBy::Score => record.best_score,
                RankBy::Streak => record.best_streak,
            },
            name: record.name,
        })
        .collect()
}

fn max_merge(a: UserRecordEntity, b: UserRecordEntity) -> UserRecordEntity {
    UserRecordEntity {
        name: a.name,
        best_score: a.best_score.max(b.best_score),
        best_streak: a.best_streak.max(b.best_streak),
        updated_at: a.updated_at.max(b.updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        questions::{Choice, Question, QuestionBank},
        state::AppState,
    };
    use std::collections::BTreeSet;

    fn test_state() -> SharedState {
        let bank = QuestionBank::from_questions(vec![Question {
            id: "q0".into(),
            prompt: "prompt".into(),
            choices: vec![Choice {
                label: "A".into(),
                text: "choice".into(),
            }],
            answers: BTreeSet::from(["A".to_string()]),
        }]);
        AppState::new(AppConfig::default(), bank)
    }

    async fn seed(state: &SharedState, name: &str, score: u32, streak: u32) {
        let record = UserRecordEntity {
            best_score: score,
            best_streak: streak,
            ..UserRecordEntity::absent(name)
        };
        state.local_records().save_record(record).await.unwrap();
    }

    #[tokio::test]
    async fn degraded_leaderboard_serves_the_local_cache() {
        let state = test_state();
        seed(&state, "ana", 50, 2).await;
        seed(&state, "bob", 30, 7).await;
        seed(&state, "cat", 70, 1).await;
        assert!(state.is_degraded().await);

        let by_score = top_by_score(&state, 2).await.unwrap();
        let names: Vec<&str> = by_score.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["cat", "ana"]);
        assert_eq!(by_score[0].value, 70);

        let by_streak = top_by_streak(&state, 10).await.unwrap();
        assert_eq!(by_streak[0].name, "bob");
        assert_eq!(by_streak[0].value, 7);
    }

    #[tokio::test]
    async fn record_read_back_finds_the_local_copy() {
        let state = test_state();
        seed(&state, "ana", 50, 3).await;

        let record = record_for(&state, "ana").await.unwrap();
        assert_eq!(record.best_score, 50);
        assert_eq!(record.best_streak, 3);

        assert!(matches!(
            record_for(&state, "ghost").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            record_for(&state, "not a name!").await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn limit_is_clamped_to_a_sane_range() {
        let state = test_state();
        seed(&state, "ana", 50, 2).await;
        seed(&state, "bob", 30, 7).await;

        let zero = top_by_score(&state, 0).await.unwrap();
        assert_eq!(zero.len(), 1, "limit zero still returns one row");

        let huge = top_by_score(&state, 10_000).await.unwrap();
        assert_eq!(huge.len(), 2);
    }
}
