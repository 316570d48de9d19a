//! WebSocket transport. A connection is addressed by the game `code` in the
//! path and an optional `player_id` query parameter: present, it's a player
//! socket (authenticated per-message via the PIN each `ClientMsg` carries);
//! absent, it's a read-only spectator.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::IntoResponse,
};
use futures::StreamExt;
use holdem_shared::{ClientMsg, PlayerId, ServerMsg};
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::coordinator::CoordinatorState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);
const MAX_CONSECUTIVE_SEND_FAILURES: u8 = 2;

#[derive(Deserialize)]
pub struct ConnectQuery {
    player_id: Option<PlayerId>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(code): Path<String>,
    Query(q): Query<ConnectQuery>,
    State(state): State<CoordinatorState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, code, q.player_id))
}

fn wall_clock_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

async fn handle_socket(mut socket: WebSocket, state: CoordinatorState, code: String, player_id: Option<PlayerId>) {
    let now = wall_clock_now();

    let (mut rx, registration) = match player_id {
        Some(pid) => {
            let (rx, reg) = state.registry.register_player(&code, pid, now).await;
            let _ = state.mark_connected(&code, pid, true, now).await;
            (rx, Some(reg))
        }
        None => (state.registry.register_spectator(&code).await, None),
    };

    push_view(&mut socket, &state, &code, player_id).await;

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // first tick fires immediately; skip it
    let mut consecutive_send_failures: u8 = 0;

    loop {
        let mut record_send = |ok: bool| {
            if ok {
                consecutive_send_failures = 0;
            } else {
                consecutive_send_failures += 1;
            }
        };

        tokio::select! {
            biased;

            _ = heartbeat.tick() => {
                record_send(send_ws(&mut socket, &ServerMsg::Ping).await);
            }

            broadcasted = rx.recv() => {
                match broadcasted {
                    Ok(_) => push_view(&mut socket, &state, &code, player_id).await,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            incoming = socket.next() => {
                match incoming {
                    Some(Ok(Message::Text(txt))) => {
                        if let Ok(cm) = serde_json::from_str::<ClientMsg>(&txt) {
                            handle_client_msg(&state, &code, player_id, cm, &mut socket).await;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }

        if consecutive_send_failures >= MAX_CONSECUTIVE_SEND_FAILURES {
            break;
        }
        if let (Some(pid), Some(reg)) = (player_id, registration) {
            if !state.registry.is_current(&code, pid, reg).await {
                break;
            }
        }
    }

    match (player_id, registration) {
        (Some(pid), Some(reg)) => {
            state.registry.unregister_player(&code, pid, reg).await;
            let _ = state.mark_connected(&code, pid, false, wall_clock_now()).await;
        }
        _ => state.registry.unregister_spectator(&code).await,
    }
}

async fn push_view(socket: &mut WebSocket, state: &CoordinatorState, code: &str, player_id: Option<PlayerId>) {
    match state.view_for(code, player_id, wall_clock_now()).await {
        Ok(msg) => {
            send_ws(socket, &msg).await;
        }
        Err(e) => {
            send_ws(socket, &ServerMsg::Error { message: e.to_string() }).await;
        }
    }
}

/// Send a message, returning whether the send succeeded.
async fn send_ws(socket: &mut WebSocket, msg: &ServerMsg) -> bool {
    match serde_json::to_string(msg) {
        Ok(txt) => socket.send(Message::Text(txt)).await.is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize ServerMsg");
            false
        }
    }
}

async fn handle_client_msg(
    state: &CoordinatorState,
    code: &str,
    connection_player: Option<PlayerId>,
    msg: ClientMsg,
    socket: &mut WebSocket,
) {
    let now = wall_clock_now();
    let result = match msg {
        ClientMsg::Action { player_id, pin, action } => {
            state.apply_action(code, player_id, &pin, action, now).await
        }
        ClientMsg::RequestState { player_id } => {
            push_view(socket, state, code, player_id.or(connection_player)).await;
            return;
        }
        ClientMsg::Deal => state.start_hand(code, now).await,
        ClientMsg::Rebuy { player_id, pin } => state.queue_rebuy(code, player_id, &pin, now).await,
        ClientMsg::CancelRebuy { player_id, pin } => state.cancel_rebuy(code, player_id, &pin, now).await,
        ClientMsg::ShowCards { player_id, pin } => state.show_cards(code, player_id, &pin, now).await,
        ClientMsg::Pause { player_id, pin } => state.pause(code, player_id, &pin, now).await,
        ClientMsg::Resume { player_id, pin } => state.resume(code, player_id, &pin, now).await,
        ClientMsg::Pong => {
            if let Some(pid) = connection_player {
                state.registry.heartbeat(code, pid, now).await;
            }
            return;
        }
    };
    if let Err(e) = result {
        send_ws(socket, &ServerMsg::Error { message: e.to_string() }).await;
    }
}
