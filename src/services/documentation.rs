use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Quiz Rush Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::session::start_session,
        crate::routes::session::get_session,
        crate::routes::session::select_choice,
        crate::routes::session::submit_answer,
        crate::routes::session::next_question,
        crate::routes::session::new_round,
        crate::routes::session::change_user,
        crate::routes::session::delete_session,
        crate::routes::leaderboard::get_record,
        crate::routes::leaderboard::leaderboard_score,
        crate::routes::leaderboard::leaderboard_streak,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::session::StartSessionRequest,
            crate::dto::session::NewRoundRequest,
            crate::dto::session::SelectRequest,
            crate::dto::session::ChangeUserRequest,
            crate::dto::session::SessionSnapshot,
            crate::dto::session::QuestionView,
            crate::dto::session::ChoiceView,
            crate::dto::session::RevealView,
            crate::dto::session::RunSummaryDto,
            crate::dto::record::RecordResponse,
            crate::dto::record::LeaderboardEntry,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::HeartLostEvent,
            crate::dto::sse::RoundFinishedEvent,
            crate::dto::sse::RunOverEvent,
            crate::dto::sse::PhaseChangedEvent,
            crate::state::run::Phase,
            crate::state::run::Mode,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "session", description = "Play session lifecycle and run transitions"),
        (name = "records", description = "Best records and leaderboards"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
