// Round lifecycle: dealing roles, clues, votes and elimination.

use rand::Rng;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::domain::words::{self, WordDomain, WordEntry};
use crate::domain::{GameError, GameMode, GameSession, RoomEvent, RoundOutcome, WordPair};
use crate::use_cases::rooms::RoomGuard;
use crate::use_cases::service::GameService;

// Clues are meant to be one word.
const MAX_CLUE_LEN: usize = 40;

impl GameService {
    /// Deals roles and words, then starts the first turn after the reveal delay.
    pub async fn start_game(
        self: &Arc<Self>,
        code: &str,
        player_id: &str,
    ) -> Result<(), GameError> {
        let mut room = self.rooms.lock(code).await;
        let Some(mut session) = self.load_locked(code, &mut room).await? else {
            self.rooms.discard(code, &mut room).await;
            return Err(GameError::RoomNotFound);
        };

        if !session.is_host(player_id) || !session.is_between_games() {
            debug!(room_code = code, player_id, "start game ignored");
            return Ok(());
        }
        if session.players.len() < self.settings.min_players {
            return Err(GameError::NotEnoughPlayers);
        }

        let pair = self.draw_word_pair(session.game_mode).await;
        let shadow_index = roll(session.players.len());
        session.start_game(&pair, shadow_index);
        self.persist(&session).await?;

        let players = session.public_snapshot();
        let active_player_id = session
            .active_player()
            .map(|p| p.id.clone())
            .unwrap_or_default();
        // Role and word only ever go to their owner.
        for player in &session.players {
            self.broadcaster
                .publish_to(
                    &player.id,
                    RoomEvent::GameStarted {
                        role: player.role.label(session.game_mode).to_string(),
                        word: player.secret_word.clone(),
                        players: players.clone(),
                        active_player_id: active_player_id.clone(),
                    },
                )
                .await;
        }

        info!(
            room_code = code,
            category = %pair.category,
            players = session.players.len(),
            "game started"
        );
        self.schedule_first_turn(&mut room, code);
        Ok(())
    }

    /// Stores the active player's clue and passes the turn on immediately.
    pub async fn submit_clue(
        self: &Arc<Self>,
        code: &str,
        player_id: &str,
        clue: &str,
    ) -> Result<(), GameError> {
        validate_clue(clue)?;

        let mut room = self.rooms.lock(code).await;
        let Some(mut session) = self.load_locked(code, &mut room).await? else {
            self.rooms.discard(code, &mut room).await;
            return Ok(());
        };
        // Anyone but the active player is a stale client; drop silently.
        if !session.record_clue(player_id, clue) {
            debug!(room_code = code, player_id, "clue ignored");
            return Ok(());
        }
        self.persist(&session).await?;

        self.broadcaster
            .publish(
                code,
                RoomEvent::ClueUpdated {
                    player_id: player_id.to_string(),
                    clue: clue.to_string(),
                },
            )
            .await;

        self.advance_turn_locked(&mut room, session).await
    }

    /// Records a vote; the last missing vote triggers the elimination.
    pub async fn cast_vote(
        self: &Arc<Self>,
        code: &str,
        voter_id: &str,
        target_id: &str,
    ) -> Result<(), GameError> {
        let mut room = self.rooms.lock(code).await;
        let Some(mut session) = self.load_locked(code, &mut room).await? else {
            self.rooms.discard(code, &mut room).await;
            return Ok(());
        };
        let Some(progress) = session.record_vote(voter_id, target_id) else {
            debug!(room_code = code, voter_id, target_id, "vote ignored");
            return Ok(());
        };
        self.persist(&session).await?;

        if progress.is_complete() {
            return self.process_elimination(&mut room, session).await;
        }

        self.broadcaster
            .publish(
                code,
                RoomEvent::VoteUpdate {
                    voted_count: progress.cast,
                    total_required: progress.required,
                },
            )
            .await;
        Ok(())
    }

    pub(crate) async fn process_elimination(
        self: &Arc<Self>,
        room: &mut RoomGuard,
        mut session: GameSession,
    ) -> Result<(), GameError> {
        room.timer.cancel();
        let Some(elimination) = session.eliminate() else {
            return Ok(());
        };
        self.persist(&session).await?;

        let mode = session.game_mode;
        let role_was = elimination.role.label(mode).to_string();
        match elimination.outcome {
            RoundOutcome::GameOver(winner) => {
                info!(
                    room_code = %session.code,
                    eliminated = %elimination.name,
                    winner = winner.label(mode),
                    "game over"
                );
                self.broadcaster
                    .publish(
                        &session.code,
                        RoomEvent::GameOver {
                            winner: winner.label(mode).to_string(),
                            eliminated: Some(elimination.name),
                            role_was: Some(role_was),
                            players: session.full_snapshot(),
                        },
                    )
                    .await;
            }
            RoundOutcome::Continue => {
                info!(
                    room_code = %session.code,
                    eliminated = %elimination.name,
                    "player eliminated; next round"
                );
                self.broadcaster
                    .publish(
                        &session.code,
                        RoomEvent::RoundResult {
                            eliminated: elimination.name,
                            role_was,
                            players: session.public_snapshot(),
                        },
                    )
                    .await;
                self.begin_turn(room, &session).await;
            }
        }
        Ok(())
    }

    /// Ends a running game whose win condition fired outside of a vote.
    pub(crate) async fn finish_early(
        &self,
        room: &mut RoomGuard,
        mut session: GameSession,
    ) -> Result<(), GameError> {
        let Some(winner) = session.evaluate_winner() else {
            return Ok(());
        };
        room.timer.cancel();
        session.finish(winner);
        self.persist(&session).await?;

        let mode = session.game_mode;
        info!(room_code = %session.code, winner = winner.label(mode), "game over after departure");
        self.broadcaster
            .publish(
                &session.code,
                RoomEvent::GameOver {
                    winner: winner.label(mode).to_string(),
                    eliminated: None,
                    role_was: None,
                    players: session.full_snapshot(),
                },
            )
            .await;
        Ok(())
    }

    async fn draw_word_pair(&self, mode: GameMode) -> WordPair {
        let (domain, entry) = words::pick_entry(roll(usize::MAX), roll(usize::MAX));
        let shadow = match mode {
            GameMode::Standard => None,
            GameMode::SimilarWord => Some(self.shadow_word(domain, entry).await),
        };
        WordPair {
            category: domain.name.to_string(),
            base: entry.word.to_string(),
            shadow,
        }
    }

    /// Asks the word service for the shadow word; any failure uses the table.
    async fn shadow_word(&self, domain: &WordDomain, entry: &WordEntry) -> String {
        let fallback = entry.fallback_shadow().to_string();
        let request = self.words.similar_word(entry.word, domain.name);

        match timeout(self.settings.word_provider_timeout, request).await {
            Ok(Ok(Some(word)))
                if !word.trim().is_empty() && !word.trim().eq_ignore_ascii_case(entry.word) =>
            {
                word.trim().to_string()
            }
            Ok(Ok(_)) => {
                debug!(base = entry.word, "word service had no usable word; using fallback");
                fallback
            }
            Ok(Err(e)) => {
                warn!(base = entry.word, error = ?e, "word service failed; using fallback");
                fallback
            }
            Err(_) => {
                warn!(base = entry.word, "word service timed out; using fallback");
                fallback
            }
        }
    }
}

fn roll(upper: usize) -> usize {
    rand::rng().random_range(0..upper.max(1))
}

fn validate_clue(clue: &str) -> Result<(), GameError> {
    let len = clue.trim().chars().count();
    if len == 0 || len > MAX_CLUE_LEN {
        return Err(GameError::InvalidClue);
    }
    Ok(())
}
