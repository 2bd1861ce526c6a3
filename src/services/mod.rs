/// OpenAPI document aggregation.
pub mod documentation;
/// Health status probing.
pub mod health_service;
/// Leaderboard read queries.
pub mod leaderboard_service;
/// Best-record max-merge reconciliation.
pub mod reconcile_service;
/// Session lifecycle and run transitions.
pub mod run_service;
/// Typed SSE broadcast helpers.
pub mod sse_events;
/// SSE subscription and stream bridging.
pub mod sse_service;
/// Remote record store supervision and degraded mode.
pub mod storage_supervisor;
