use crate::domain::{Broadcaster, GameError, RoomEvent};
use crate::frameworks::config;
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng;

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

struct ConnCtx {
    player_id: String,
    // Room this connection currently belongs to, if any.
    room_code: Option<String>,
    outbound_rx: mpsc::Receiver<Utf8Bytes>,

    msgs_in: u64,
    msgs_out: u64,
    invalid_json: u32,
    last_invalid_log: Instant,

    close_frame: Option<CloseFrame>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let conn_id = rng::conn_id();
        let player_id = rng::player_id();
        let span = info_span!("conn", conn_id, player_id = %player_id);
        handle_socket(socket, state, player_id).instrument(span)
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, player_id: String) {
    let (outbound_tx, outbound_rx) = mpsc::channel(config::OUTBOUND_QUEUE_CAPACITY);
    state.hub.register(&player_id, outbound_tx).await;

    // Tell the client "This is who you are".
    let identity = ServerMessage::Identity {
        player_id: player_id.clone(),
    };
    if let Err(e) = send_message(&mut socket, &identity).await {
        warn!(error = ?e, "failed to send identity");
        state.hub.unregister(&player_id).await;
        return;
    }
    info!("client connected");

    let mut ctx = ConnCtx {
        player_id,
        room_code: None,
        outbound_rx,
        msgs_in: 0,
        msgs_out: 1,
        invalid_json: 0,
        last_invalid_log: Instant::now() - LOG_THROTTLE,
        close_frame: None,
    };

    run_client_loop(&mut socket, &state, &mut ctx).await;
    disconnect_cleanup(&state, &ctx).await;
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<(), NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(socket: &mut WebSocket, state: &AppState, ctx: &mut ConnCtx) {
    loop {
        let disconnect = tokio::select! {
            incoming = socket.recv() => {
                matches!(
                    handle_incoming_ws(incoming, state, ctx).await,
                    LoopControl::Disconnect
                )
            }

            outbound = ctx.outbound_rx.recv() => {
                match outbound {
                    Some(bytes) => match socket.send(Message::Text(bytes)).await {
                        Ok(()) => {
                            ctx.msgs_out += 1;
                            false
                        }
                        Err(e) => {
                            warn!(error = ?e, "failed to send room event");
                            true
                        }
                    },
                    // The hub dropped our queue; nothing more will arrive.
                    None => true,
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }
}

async fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    state: &AppState,
    ctx: &mut ConnCtx,
) -> LoopControl {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.msgs_in += 1;
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => {
                        if let Err(e) = dispatch(state, ctx, msg).await {
                            debug!(error = ?e, "action rejected");
                            state
                                .hub
                                .publish_to(
                                    &ctx.player_id,
                                    RoomEvent::Error {
                                        message: e.user_message().to_string(),
                                    },
                                )
                                .await;
                        }
                        LoopControl::Continue
                    }
                    Err(parse_err) => {
                        ctx.invalid_json += 1;
                        if should_log(&mut ctx.last_invalid_log) {
                            warn!(
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if ctx.invalid_json > MAX_INVALID_JSON {
                            ctx.close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return LoopControl::Disconnect;
                        }
                        LoopControl::Continue
                    }
                }
            }
            Message::Binary(_) => {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                LoopControl::Disconnect
            }
            Message::Ping(_) | Message::Pong(_) => LoopControl::Continue,
            Message::Close(_) => LoopControl::Disconnect,
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            LoopControl::Disconnect
        }
        None => {
            info!("websocket closed");
            LoopControl::Disconnect
        }
    }
}

async fn dispatch(
    state: &AppState,
    ctx: &mut ConnCtx,
    msg: ClientMessage,
) -> Result<(), GameError> {
    let service = &state.service;
    let player_id = ctx.player_id.as_str();

    let room_code = match msg {
        ClientMessage::CreateRoom { player_name } => {
            let code = service.create_room(player_id, &player_name).await?;
            switch_room(state, ctx, code).await;
            return Ok(());
        }
        ClientMessage::JoinRoom {
            room_code,
            player_name,
        } => {
            let code = service.join_room(&room_code, player_id, &player_name).await?;
            switch_room(state, ctx, code).await;
            return Ok(());
        }
        _ => match ctx.room_code.as_deref() {
            Some(code) => code,
            None => {
                debug!("room action without a room; ignored");
                return Ok(());
            }
        },
    };

    match msg {
        ClientMessage::SetGameMode { game_mode } => {
            service.set_game_mode(room_code, player_id, game_mode).await
        }
        ClientMessage::StartGame => service.start_game(room_code, player_id).await,
        ClientMessage::SubmitClue { clue } => {
            service.submit_clue(room_code, player_id, &clue).await
        }
        ClientMessage::CastVote { target_id } => {
            service.cast_vote(room_code, player_id, &target_id).await
        }
        ClientMessage::CreateRoom { .. } | ClientMessage::JoinRoom { .. } => Ok(()),
    }
}

/// Records the new room and leaves the previous one, if any.
async fn switch_room(state: &AppState, ctx: &mut ConnCtx, code: String) {
    let previous = ctx.room_code.replace(code);
    if let Some(previous) = previous.filter(|prev| Some(prev) != ctx.room_code.as_ref()) {
        if let Err(e) = state
            .service
            .player_disconnected(&previous, &ctx.player_id)
            .await
        {
            warn!(room_code = %previous, error = ?e, "failed to leave previous room");
        }
    }
}

async fn disconnect_cleanup(state: &AppState, ctx: &ConnCtx) {
    if let Some(code) = ctx.room_code.as_deref() {
        if let Err(e) = state.service.player_disconnected(code, &ctx.player_id).await {
            warn!(room_code = code, error = ?e, "error during disconnect cleanup");
        }
    }
    state.hub.unregister(&ctx.player_id).await;

    info!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        invalid_json = ctx.invalid_json,
        "client disconnected"
    );
}
