use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Per-user best record persisted by the storage layer.
///
/// Both fields are append-only maxima: the reconciler only ever raises them,
/// so copies in different stores converge regardless of write order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecordEntity {
    /// Player name the record belongs to.
    pub name: String,
    /// Highest score ever reached across all runs.
    pub best_score: u32,
    /// Longest consecutive-correct streak ever reached across all runs.
    pub best_streak: u32,
    /// Last time either field was raised.
    pub updated_at: SystemTime,
}

impl UserRecordEntity {
    /// A zeroed record for a player with no history yet.
    ///
    /// Defaults are applied here, once, at construction time; call sites
    /// never coalesce missing fields.
    pub fn absent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            best_score: 0,
            best_streak: 0,
            updated_at: SystemTime::UNIX_EPOCH,
        }
    }

    /// Max-merge a finished run into this record, stamping `updated_at`.
    pub fn merge_run(&self, run_score: u32, run_best_streak: u32) -> Self {
        Self {
            name: self.name.clone(),
            best_score: self.best_score.max(run_score),
            best_streak: self.best_streak.max(run_best_streak),
            updated_at: SystemTime::now(),
        }
    }
}
