//! HTTP handlers for the coordinator's REST surface. Each handler is a thin
//! wrapper over a `CoordinatorState` method: deserialize the request DTO,
//! call the coordinator, map the error kind to a status code.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use holdem_shared::{
    ActionRequest, CreateGameRequest, EngineError, JoinRequest, PlayerId,
};
use serde::{Deserialize, Serialize};

use crate::coordinator::CoordinatorState;

pub fn build_router(state: CoordinatorState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({ "ok": true })) }))
        .route("/ws/:code", get(crate::ws::ws_handler))
        .route("/api/games", post(create_game_handler))
        .route("/api/games/:code/join", post(join_handler))
        .route("/api/games/:code/state", get(state_handler))
        .route("/api/games/:code/action", post(action_handler))
        .route("/api/games/:code/deal", post(deal_handler))
        .route("/api/games/:code/rebuy", post(rebuy_handler))
        .route("/api/games/:code/cancel_rebuy", post(cancel_rebuy_handler))
        .route("/api/games/:code/show_cards", post(show_cards_handler))
        .route("/api/games/:code/pause", post(pause_handler))
        .route("/api/games/:code/resume", post(resume_handler))
        .route("/api/games/:code/leave", post(leave_handler))
        .with_state(state)
}

fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::InvalidState { .. } => StatusCode::CONFLICT,
        EngineError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn err_response(err: EngineError) -> axum::response::Response {
    if matches!(err, EngineError::Internal(_)) {
        tracing::warn!(error = %err, "internal error handling request");
    }
    (status_for(&err), Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

fn wall_clock_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[derive(Serialize)]
struct CreateGameResponse {
    code: String,
    player_id: PlayerId,
}

async fn create_game_handler(
    State(state): State<CoordinatorState>,
    Json(req): Json<CreateGameRequest>,
) -> axum::response::Response {
    let now = wall_clock_now();
    match state
        .create_game(req.settings, req.creator_name, req.creator_pin, None, now)
        .await
    {
        Ok((code, player_id)) => Json(CreateGameResponse { code, player_id }).into_response(),
        Err(e) => err_response(e),
    }
}

#[derive(Serialize)]
struct JoinResponse {
    player_id: PlayerId,
}

async fn join_handler(
    State(state): State<CoordinatorState>,
    Path(code): Path<String>,
    Json(req): Json<JoinRequest>,
) -> axum::response::Response {
    let now = wall_clock_now();
    match state.join_game(&code, req.name, req.pin, now).await {
        Ok(player_id) => Json(JoinResponse { player_id }).into_response(),
        Err(e) => err_response(e),
    }
}

#[derive(Deserialize)]
struct PlayerQuery {
    player_id: Option<PlayerId>,
}

async fn state_handler(
    State(state): State<CoordinatorState>,
    Path(code): Path<String>,
    axum::extract::Query(q): axum::extract::Query<PlayerQuery>,
) -> axum::response::Response {
    let now = wall_clock_now();
    match state.view_for(&code, q.player_id, now).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => err_response(e),
    }
}

async fn action_handler(
    State(state): State<CoordinatorState>,
    Path(code): Path<String>,
    Json(req): Json<ActionRequest>,
) -> axum::response::Response {
    let now = wall_clock_now();
    match state
        .apply_action(&code, req.player_id, &req.pin, req.action, now)
        .await
    {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => err_response(e),
    }
}

async fn deal_handler(State(state): State<CoordinatorState>, Path(code): Path<String>) -> axum::response::Response {
    let now = wall_clock_now();
    match state.start_hand(&code, now).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => err_response(e),
    }
}

#[derive(Deserialize)]
struct AuthBody {
    player_id: PlayerId,
    pin: String,
}

macro_rules! auth_only_handler {
    ($name:ident, $method:ident) => {
        async fn $name(
            State(state): State<CoordinatorState>,
            Path(code): Path<String>,
            Json(body): Json<AuthBody>,
        ) -> axum::response::Response {
            let now = wall_clock_now();
            match state.$method(&code, body.player_id, &body.pin, now).await {
                Ok(()) => StatusCode::OK.into_response(),
                Err(e) => err_response(e),
            }
        }
    };
}

auth_only_handler!(rebuy_handler, queue_rebuy);
auth_only_handler!(cancel_rebuy_handler, cancel_rebuy);
auth_only_handler!(show_cards_handler, show_cards);
auth_only_handler!(pause_handler, pause);
auth_only_handler!(resume_handler, resume);
auth_only_handler!(leave_handler, leave_game);
