// Lobby orchestration: room creation, membership, game mode and departures.

use rand::Rng;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::{
    Departure, GameError, GameMode, GameSession, Player, RoomEvent, SessionStatus,
};
use crate::use_cases::rooms::RoomGuard;
use crate::use_cases::service::GameService;

const ROOM_CODE_LEN: usize = 6;
const ROOM_CODE_ATTEMPTS: usize = 8;
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

impl GameService {
    /// Creates a room with the caller as host and returns its code.
    pub async fn create_room(
        self: &Arc<Self>,
        player_id: &str,
        player_name: &str,
    ) -> Result<String, GameError> {
        let name = validate_display_name(player_name)?;
        for _ in 0..ROOM_CODE_ATTEMPTS {
            let code = generate_room_code();
            if self.open_room(&code, player_id, &name).await? {
                return Ok(code);
            }
            debug!(room_code = %code, "room code collision; retrying");
        }
        warn!("could not find a free room code");
        Err(GameError::StorageFailure)
    }

    /// Creates the session under `code`. Returns false if the code is taken.
    pub(crate) async fn open_room(
        &self,
        code: &str,
        player_id: &str,
        player_name: &str,
    ) -> Result<bool, GameError> {
        let mut room = self.rooms.lock(code).await;
        if self.load_locked(code, &mut room).await?.is_some() {
            return Ok(false);
        }

        let session = GameSession::new(code, Player::new(player_id, player_name));
        if let Err(e) = self.repo.create(session.clone()).await {
            error!(room_code = code, error = %e, "failed to create session");
            self.rooms.discard(code, &mut room).await;
            return Err(GameError::StorageFailure);
        }

        self.broadcaster.join_room(code, player_id).await;
        self.broadcaster
            .publish_to(
                player_id,
                RoomEvent::RoomCreated {
                    room_code: code.to_string(),
                    players: session.public_snapshot(),
                    game_mode: session.game_mode,
                },
            )
            .await;
        info!(room_code = code, player_id, "room created");
        Ok(true)
    }

    /// Adds a player to a lobby and returns the normalized room code.
    pub async fn join_room(
        self: &Arc<Self>,
        code: &str,
        player_id: &str,
        player_name: &str,
    ) -> Result<String, GameError> {
        let code = code.trim().to_uppercase();
        let name = validate_display_name(player_name)?;

        let mut room = self.rooms.lock(&code).await;
        let Some(mut session) = self.load_locked(&code, &mut room).await? else {
            self.rooms.discard(&code, &mut room).await;
            return Err(GameError::RoomNotFound);
        };
        if session.status != SessionStatus::Lobby {
            return Err(GameError::GameAlreadyStarted);
        }
        if session.player(player_id).is_some() {
            return Ok(code);
        }
        if session.is_name_taken(&name) {
            return Err(GameError::NameTaken);
        }

        session.players.push(Player::new(player_id, name));
        self.persist(&session).await?;

        self.broadcaster.join_room(&code, player_id).await;
        self.broadcaster
            .publish_to(
                player_id,
                RoomEvent::JoinSuccess {
                    room_code: code.clone(),
                    players: session.public_snapshot(),
                    game_mode: session.game_mode,
                },
            )
            .await;
        self.publish_room_update(&session).await;
        info!(room_code = %code, player_id, "player joined");
        Ok(code)
    }

    /// Host-only; the mode is frozen while a round is running.
    pub async fn set_game_mode(
        self: &Arc<Self>,
        code: &str,
        player_id: &str,
        game_mode: GameMode,
    ) -> Result<(), GameError> {
        let mut room = self.rooms.lock(code).await;
        let Some(mut session) = self.load_locked(code, &mut room).await? else {
            self.rooms.discard(code, &mut room).await;
            return Err(GameError::RoomNotFound);
        };
        if !session.is_host(player_id) || !session.is_between_games() {
            debug!(room_code = code, player_id, "game mode change ignored");
            return Ok(());
        }

        session.game_mode = game_mode;
        self.persist(&session).await?;
        self.broadcaster
            .publish(code, RoomEvent::GameModeUpdated { game_mode })
            .await;
        Ok(())
    }

    /// Prunes a disconnected player; the last one out deletes the room.
    pub async fn player_disconnected(
        self: &Arc<Self>,
        code: &str,
        player_id: &str,
    ) -> Result<(), GameError> {
        let mut room = self.rooms.lock(code).await;
        let Some(mut session) = self.load_locked(code, &mut room).await? else {
            self.rooms.discard(code, &mut room).await;
            return Ok(());
        };
        let Some(departure) = session.remove_player(player_id) else {
            return Ok(());
        };
        self.broadcaster.leave_room(code, player_id).await;

        if session.players.is_empty() {
            // Timer goes first so nothing ticks against a deleted session.
            room.timer.cancel();
            self.repo.delete(code).await.map_err(|e| {
                error!(room_code = code, error = %e, "failed to delete empty room");
                GameError::StorageFailure
            })?;
            self.rooms.discard(code, &mut room).await;
            info!(room_code = code, "room deleted (empty)");
            return Ok(());
        }

        self.persist(&session).await?;
        self.publish_room_update(&session).await;
        if departure.host_changed {
            info!(room_code = code, host_id = %session.host_id, "host reassigned");
        }

        if session.is_running() {
            self.settle_departure(&mut room, session, departure).await?;
        }
        Ok(())
    }

    /// Keeps a running game consistent after someone left mid-round.
    async fn settle_departure(
        self: &Arc<Self>,
        room: &mut RoomGuard,
        session: GameSession,
        departure: Departure,
    ) -> Result<(), GameError> {
        info!(
            room_code = %session.code,
            player_id = %departure.player.id,
            "player left a running game"
        );

        if session.evaluate_winner().is_some() {
            return self.finish_early(room, session).await;
        }

        match session.status {
            SessionStatus::Playing if departure.was_active => {
                let next = session.first_living_from(departure.index);
                match next {
                    // The pending reveal starts whoever holds the turn when it ends.
                    Some(index) if room.timer.is_revealing() => {
                        let mut session = session;
                        session.current_turn_index = index;
                        self.persist(&session).await
                    }
                    _ => self.move_turn(room, session, next).await,
                }
            }
            SessionStatus::Voting => {
                let progress = session.vote_progress();
                if progress.is_complete() {
                    return self.process_elimination(room, session).await;
                }
                self.broadcaster
                    .publish(
                        &session.code,
                        RoomEvent::VoteUpdate {
                            voted_count: progress.cast,
                            total_required: progress.required,
                        },
                    )
                    .await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn publish_room_update(&self, session: &GameSession) {
        self.broadcaster
            .publish(
                &session.code,
                RoomEvent::RoomUpdate {
                    players: session.public_snapshot(),
                    host_id: session.host_id.clone(),
                },
            )
            .await;
    }
}

fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

fn validate_display_name(value: &str) -> Result<String, GameError> {
    // Keep names short enough for the player grid.
    const MAX_LEN: usize = 20;

    let name = value.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_LEN || name.chars().any(char::is_control) {
        return Err(GameError::InvalidDisplayName);
    }
    Ok(name.to_string())
}
