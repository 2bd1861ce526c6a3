use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::dao::models::UserRecordEntity;
use crate::dto::format_system_time;

/// A player's merged best record as returned by the read-back endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordResponse {
    /// Player the record belongs to.
    pub name: String,
    /// Highest score ever reached.
    pub best_score: u32,
    /// Longest streak ever reached.
    pub best_streak: u32,
    /// RFC3339 timestamp of the last time a field was raised.
    pub updated_at: String,
}

impl From<UserRecordEntity> for RecordResponse {
    fn from(record: UserRecordEntity) -> Self {
        Self {
            name: record.name,
            best_score: record.best_score,
            best_streak: record.best_streak,
            updated_at: format_system_time(record.updated_at),
        }
    }
}

/// One row of a leaderboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// Player name.
    pub name: String,
    /// The ranked value (best score or best streak, per endpoint).
    pub value: u32,
}

/// Query parameters accepted by the leaderboard endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaderboardQuery {
    /// Maximum number of rows to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}
