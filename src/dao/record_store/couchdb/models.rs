use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::models::UserRecordEntity;

pub const RECORD_PREFIX: &str = "record::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[serde(default)]
    pub doc: Option<Value>,
}

/// CouchDB document wrapping one per-user best record.
///
/// One document per player; the reconciler reads and writes a single key,
/// never a whole-leaderboard blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchRecordDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub record: RecordBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordBody {
    pub name: String,
    pub best_score: u32,
    pub best_streak: u32,
    pub updated_at: SystemTime,
}

impl From<(UserRecordEntity, Option<String>)> for CouchRecordDocument {
    fn from((record, rev): (UserRecordEntity, Option<String>)) -> Self {
        Self {
            id: record_doc_id(&record.name),
            rev,
            record: RecordBody {
                name: record.name,
                best_score: record.best_score,
                best_streak: record.best_streak,
                updated_at: record.updated_at,
            },
        }
    }
}

impl From<CouchRecordDocument> for UserRecordEntity {
    fn from(doc: CouchRecordDocument) -> Self {
        Self {
            name: doc.record.name,
            best_score: doc.record.best_score,
            best_streak: doc.record.best_streak,
            updated_at: doc.record.updated_at,
        }
    }
}

pub fn record_doc_id(name: &str) -> String {
    format!("{}{}", RECORD_PREFIX, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_round_trips_entity() {
        let entity = UserRecordEntity::absent("ana").merge_run(50, 3);
        let doc = CouchRecordDocument::from((entity.clone(), Some("1-abc".into())));
        assert_eq!(doc.id, "record::ana");
        assert_eq!(doc.rev.as_deref(), Some("1-abc"));

        let back: UserRecordEntity = doc.into();
        assert_eq!(back, entity);
    }
}
