// Wire protocol DTOs and conversions for the public websocket messages.

use crate::domain::{GameMode, PlayerReveal, PlayerView, RoomEvent, SessionStatus};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    // Connection identity, sent once right after the upgrade.
    Identity {
        player_id: String,
    },
    RoomCreated {
        room_code: String,
        players: Vec<PlayerDto>,
        game_mode: GameMode,
    },
    JoinSuccess {
        room_code: String,
        players: Vec<PlayerDto>,
        game_mode: GameMode,
    },
    RoomUpdate {
        players: Vec<PlayerDto>,
        host_id: String,
    },
    GameModeUpdated {
        game_mode: GameMode,
    },
    // Private to one player: carries their own role and word.
    GameStarted {
        role: String,
        word: Option<String>,
        players: Vec<PlayerDto>,
        active_player_id: String,
    },
    TurnChange {
        active_player_id: String,
        player_name: String,
        time_left: u32,
    },
    TimerTick {
        time_left: u32,
    },
    ClueUpdated {
        player_id: String,
        clue: String,
    },
    PhaseChange {
        status: SessionStatus,
        players: Vec<PlayerDto>,
    },
    VoteUpdate {
        voted_count: usize,
        total_required: usize,
    },
    RoundResult {
        eliminated: String,
        role_was: String,
        players: Vec<PlayerDto>,
    },
    GameOver {
        winner: String,
        eliminated: Option<String>,
        role_was: Option<String>,
        players: Vec<RevealedPlayerDto>,
    },
    // Rejection of the requester's last action.
    Error {
        message: String,
    },
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    CreateRoom { player_name: String },
    JoinRoom { room_code: String, player_name: String },
    SetGameMode { game_mode: GameMode },
    StartGame,
    SubmitClue { clue: String },
    CastVote { target_id: String },
}

/// Public player entry; never includes role or secret word.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: String,
    pub name: String,
    pub is_alive: bool,
    pub clue: String,
    pub votes_received: u32,
    pub is_host: bool,
}

impl From<PlayerView> for PlayerDto {
    fn from(view: PlayerView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            is_alive: view.alive,
            clue: view.clue,
            votes_received: view.votes_received,
            is_host: view.is_host,
        }
    }
}

/// End-of-game player entry with role and word revealed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealedPlayerDto {
    pub id: String,
    pub name: String,
    pub role: String,
    pub secret_word: Option<String>,
    pub is_alive: bool,
    pub clue: String,
    pub votes_received: u32,
}

impl From<PlayerReveal> for RevealedPlayerDto {
    fn from(reveal: PlayerReveal) -> Self {
        Self {
            id: reveal.id,
            name: reveal.name,
            role: reveal.role,
            secret_word: reveal.secret_word,
            is_alive: reveal.alive,
            clue: reveal.clue,
            votes_received: reveal.votes_received,
        }
    }
}

fn players(views: Vec<PlayerView>) -> Vec<PlayerDto> {
    views.into_iter().map(PlayerDto::from).collect()
}

impl From<RoomEvent> for ServerMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::RoomCreated {
                room_code,
                players: views,
                game_mode,
            } => ServerMessage::RoomCreated {
                room_code,
                players: players(views),
                game_mode,
            },
            RoomEvent::JoinSuccess {
                room_code,
                players: views,
                game_mode,
            } => ServerMessage::JoinSuccess {
                room_code,
                players: players(views),
                game_mode,
            },
            RoomEvent::RoomUpdate {
                players: views,
                host_id,
            } => ServerMessage::RoomUpdate {
                players: players(views),
                host_id,
            },
            RoomEvent::GameModeUpdated { game_mode } => {
                ServerMessage::GameModeUpdated { game_mode }
            }
            RoomEvent::GameStarted {
                role,
                word,
                players: views,
                active_player_id,
            } => ServerMessage::GameStarted {
                role,
                word,
                players: players(views),
                active_player_id,
            },
            RoomEvent::TurnChange {
                active_player_id,
                player_name,
                time_left,
            } => ServerMessage::TurnChange {
                active_player_id,
                player_name,
                time_left,
            },
            RoomEvent::TimerTick { time_left } => ServerMessage::TimerTick { time_left },
            RoomEvent::ClueUpdated { player_id, clue } => {
                ServerMessage::ClueUpdated { player_id, clue }
            }
            RoomEvent::PhaseChange {
                status,
                players: views,
            } => ServerMessage::PhaseChange {
                status,
                players: players(views),
            },
            RoomEvent::VoteUpdate {
                voted_count,
                total_required,
            } => ServerMessage::VoteUpdate {
                voted_count,
                total_required,
            },
            RoomEvent::RoundResult {
                eliminated,
                role_was,
                players: views,
            } => ServerMessage::RoundResult {
                eliminated,
                role_was,
                players: players(views),
            },
            RoomEvent::GameOver {
                winner,
                eliminated,
                role_was,
                players: reveals,
            } => ServerMessage::GameOver {
                winner,
                eliminated,
                role_was,
                players: reveals.into_iter().map(RevealedPlayerDto::from).collect(),
            },
            RoomEvent::Error { message } => ServerMessage::Error { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn when_client_sends_join_then_fields_are_camel_case() {
        let raw = r#"{"type":"joinRoom","data":{"roomCode":"abcd12","playerName":"Alice"}}"#;

        let msg: ClientMessage = serde_json::from_str(raw).unwrap();

        assert!(matches!(
            msg,
            ClientMessage::JoinRoom { room_code, player_name }
                if room_code == "abcd12" && player_name == "Alice"
        ));
    }

    #[test]
    fn when_client_starts_game_then_data_can_be_omitted() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"startGame"}"#).unwrap();

        assert!(matches!(msg, ClientMessage::StartGame));
    }

    #[test]
    fn when_game_mode_is_sent_then_screaming_case_is_accepted() {
        let raw = r#"{"type":"setGameMode","data":{"gameMode":"SIMILAR_WORD"}}"#;

        let msg: ClientMessage = serde_json::from_str(raw).unwrap();

        assert!(matches!(
            msg,
            ClientMessage::SetGameMode {
                game_mode: GameMode::SimilarWord
            }
        ));
    }

    #[test]
    fn when_phase_changes_then_status_and_players_serialize_for_clients() {
        let event = RoomEvent::PhaseChange {
            status: SessionStatus::Voting,
            players: vec![PlayerView {
                id: "p1".to_string(),
                name: "Alice".to_string(),
                alive: true,
                clue: "red".to_string(),
                votes_received: 0,
                is_host: true,
            }],
        };

        let value = serde_json::to_value(ServerMessage::from(event)).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "phaseChange",
                "data": {
                    "status": "VOTING",
                    "players": [{
                        "id": "p1",
                        "name": "Alice",
                        "isAlive": true,
                        "clue": "red",
                        "votesReceived": 0,
                        "isHost": true
                    }]
                }
            })
        );
    }

    #[test]
    fn when_timer_ticks_then_time_left_is_camel_case() {
        let msg = ServerMessage::from(RoomEvent::TimerTick { time_left: 12 });
        let value = serde_json::to_value(msg).unwrap();

        assert_eq!(value, json!({"type": "timerTick", "data": {"timeLeft": 12}}));
    }
}
