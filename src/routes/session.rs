use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::session::{
        ChangeUserRequest, NewRoundRequest, SelectRequest, SessionSnapshot, StartSessionRequest,
    },
    error::AppError,
    services::run_service,
    state::SharedState,
};

/// Routes driving the session lifecycle and run transitions.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/select", post(select_choice))
        .route("/sessions/{id}/submit", post(submit_answer))
        .route("/sessions/{id}/next", post(next_question))
        .route("/sessions/{id}/round", post(new_round))
        .route("/sessions/{id}/user", put(change_user))
}

/// Start a play session and its first run.
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "session",
    request_body = StartSessionRequest,
    responses(
        (status = 200, description = "Session started", body = SessionSnapshot),
        (status = 400, description = "Invalid player name")
    )
)]
pub async fn start_session(
    State(state): State<SharedState>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = run_service::start_session(&state, payload).await?;
    Ok(Json(snapshot))
}

/// Fetch the current state of a session.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session state", body = SessionSnapshot),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = run_service::snapshot(&state, id).await?;
    Ok(Json(snapshot))
}

/// Toggle a choice label on the active question.
///
/// Labels that cannot be selected right now (unknown, wrong phase, at
/// capacity) leave the session unchanged rather than failing.
#[utoipa::path(
    post,
    path = "/sessions/{id}/select",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = SelectRequest,
    responses(
        (status = 200, description = "Updated session state", body = SessionSnapshot),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn select_choice(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = run_service::select(&state, id, payload).await?;
    Ok(Json(snapshot))
}

/// Grade the current selection.
#[utoipa::path(
    post,
    path = "/sessions/{id}/submit",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Updated session state", body = SessionSnapshot),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = run_service::submit(&state, id).await?;
    Ok(Json(snapshot))
}

/// Advance past the review screen.
#[utoipa::path(
    post,
    path = "/sessions/{id}/next",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Updated session state", body = SessionSnapshot),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn next_question(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = run_service::next(&state, id).await?;
    Ok(Json(snapshot))
}

/// Draw a fresh round, optionally switching mode.
#[utoipa::path(
    post,
    path = "/sessions/{id}/round",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = NewRoundRequest,
    responses(
        (status = 200, description = "Fresh round started", body = SessionSnapshot),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn new_round(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewRoundRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = run_service::new_round(&state, id, payload).await?;
    Ok(Json(snapshot))
}

/// Rebind the session to a different player name.
#[utoipa::path(
    put,
    path = "/sessions/{id}/user",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = ChangeUserRequest,
    responses(
        (status = 200, description = "Updated session state", body = SessionSnapshot),
        (status = 400, description = "Invalid player name"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn change_user(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeUserRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = run_service::change_user(&state, id, payload).await?;
    Ok(Json(snapshot))
}

/// End a session and discard its run.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 204, description = "Session ended"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    run_service::end_session(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
