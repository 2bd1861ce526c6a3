//! Library crate for quiz-rush-back, exposing modules for the binary and integration tests.

/// Runtime configuration and gameplay rules.
pub mod config;
/// Record persistence layer.
pub mod dao;
/// Wire types for the HTTP and SSE surfaces.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Question bank loading.
pub mod questions;
/// HTTP route trees.
pub mod routes;
/// Application services orchestrating gameplay, records, and events.
pub mod services;
/// Shared state, sessions, and the run state machine.
pub mod state;
