use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Health status payloads.
pub mod health;
/// Best-record and leaderboard payloads.
pub mod record;
/// Session lifecycle and snapshot payloads.
pub mod session;
/// Payloads carried over the SSE stream.
pub mod sse;
/// Validation helpers for request payloads.
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
