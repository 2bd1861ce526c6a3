/// Best-record storage and retrieval operations.
pub mod record_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
