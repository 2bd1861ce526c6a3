use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::record::{LeaderboardEntry, LeaderboardQuery, RecordResponse},
    error::AppError,
    services::leaderboard_service,
    state::SharedState,
};

/// Routes exposing best records and the two leaderboards.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/records/{name}", get(get_record))
        .route("/leaderboard/score", get(leaderboard_score))
        .route("/leaderboard/streak", get(leaderboard_streak))
}

/// Fetch one player's merged best record.
#[utoipa::path(
    get,
    path = "/records/{name}",
    tag = "records",
    params(("name" = String, Path, description = "Player name")),
    responses(
        (status = 200, description = "Best record for the player", body = RecordResponse),
        (status = 400, description = "Invalid player name"),
        (status = 404, description = "No record for this player")
    )
)]
pub async fn get_record(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<RecordResponse>, AppError> {
    let record = leaderboard_service::record_for(&state, &name).await?;
    Ok(Json(record.into()))
}

/// Top records ranked by best score.
#[utoipa::path(
    get,
    path = "/leaderboard/score",
    tag = "records",
    params(LeaderboardQuery),
    responses((status = 200, description = "Score leaderboard", body = [LeaderboardEntry]))
)]
pub async fn leaderboard_score(
    State(state): State<SharedState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let rows = leaderboard_service::top_by_score(&state, query.limit).await?;
    Ok(Json(rows))
}

/// Top records ranked by best streak.
#[utoipa::path(
    get,
    path = "/leaderboard/streak",
    tag = "records",
    params(LeaderboardQuery),
    responses((status = 200, description = "Streak leaderboard", body = [LeaderboardEntry]))
)]
pub async fn leaderboard_streak(
    State(state): State<SharedState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let rows = leaderboard_service::top_by_streak(&state, query.limit).await?;
    Ok(Json(rows))
}
