// Domain-level game session entities and the round rules that mutate them.

use serde::{Deserialize, Serialize};

use crate::domain::words::WordPair;

pub type PlayerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Lobby,
    Playing,
    Voting,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameMode {
    // Shadow player gets no word and has to bluff.
    #[default]
    Standard,
    // Shadow player gets a similar but distinct word.
    SimilarWord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Unassigned,
    Majority,
    Shadow,
}

impl Role {
    /// Display label for the role; the wording depends on the game mode.
    pub fn label(self, mode: GameMode) -> &'static str {
        match (self, mode) {
            (Role::Unassigned, _) => "PENDING",
            (Role::Majority, GameMode::Standard) => "CITIZEN",
            (Role::Majority, GameMode::SimilarWord) => "AGENT",
            (Role::Shadow, GameMode::Standard) => "INFILTRATOR",
            (Role::Shadow, GameMode::SimilarWord) => "SPY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Majority,
    Shadow,
}

impl Winner {
    pub fn label(self, mode: GameMode) -> &'static str {
        match (self, mode) {
            (Winner::Majority, GameMode::Standard) => "CITIZENS",
            (Winner::Majority, GameMode::SimilarWord) => "AGENTS",
            (Winner::Shadow, mode) => Role::Shadow.label(mode),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub secret_word: Option<String>,
    pub alive: bool,
    pub clue: String,
    pub voted_for: Option<PlayerId>,
    pub votes_received: u32,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: Role::Unassigned,
            secret_word: None,
            alive: true,
            clue: String::new(),
            voted_for: None,
            votes_received: 0,
        }
    }

    fn reset_round(&mut self) {
        self.clue.clear();
        self.voted_for = None;
        self.votes_received = 0;
    }
}

/// One game instance, persisted as a whole document per room code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub code: String,
    pub status: SessionStatus,
    pub game_mode: GameMode,
    // Join order doubles as turn order.
    pub players: Vec<Player>,
    pub host_id: PlayerId,
    pub current_turn_index: usize,
    pub winner: Option<Winner>,
}

/// Progress of the current voting round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteProgress {
    pub cast: usize,
    pub required: usize,
}

impl VoteProgress {
    pub fn is_complete(&self) -> bool {
        self.cast == self.required
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Continue,
    GameOver(Winner),
}

/// Result of tallying a completed vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elimination {
    pub player_id: PlayerId,
    pub name: String,
    pub role: Role,
    pub outcome: RoundOutcome,
}

/// Bookkeeping returned when a player leaves the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub player: Player,
    // Position the player held in turn order before removal.
    pub index: usize,
    // The departed player was the one expected to give a clue.
    pub was_active: bool,
    pub host_changed: bool,
}

impl GameSession {
    pub fn new(code: impl Into<String>, host: Player) -> Self {
        Self {
            code: code.into(),
            status: SessionStatus::Lobby,
            game_mode: GameMode::default(),
            host_id: host.id.clone(),
            players: vec![host],
            current_turn_index: 0,
            winner: None,
        }
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id == player_id
    }

    pub fn is_name_taken(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.players.iter().any(|p| p.name.to_lowercase() == wanted)
    }

    /// Modes and new games can only be chosen while no round is running.
    pub fn is_between_games(&self) -> bool {
        matches!(self.status, SessionStatus::Lobby | SessionStatus::Finished)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status, SessionStatus::Playing | SessionStatus::Voting)
    }

    pub fn living_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    pub fn active_player(&self) -> Option<&Player> {
        if self.status != SessionStatus::Playing {
            return None;
        }
        self.players.get(self.current_turn_index)
    }

    /// First living player at or after `start` in turn order. Never wraps.
    pub fn first_living_from(&self, start: usize) -> Option<usize> {
        self.players
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, p)| p.alive)
            .map(|(index, _)| index)
    }

    /// Living player who speaks after the current one, if any remain this round.
    pub fn next_turn_index(&self) -> Option<usize> {
        self.first_living_from(self.current_turn_index + 1)
    }

    /// Deals roles and words for a fresh game and enters PLAYING.
    pub fn start_game(&mut self, pair: &WordPair, shadow_index: usize) {
        let shadow_word = match self.game_mode {
            GameMode::Standard => None,
            GameMode::SimilarWord => pair.shadow.clone(),
        };

        for (index, player) in self.players.iter_mut().enumerate() {
            if index == shadow_index {
                player.role = Role::Shadow;
                player.secret_word = shadow_word.clone();
            } else {
                player.role = Role::Majority;
                player.secret_word = Some(pair.base.clone());
            }
            player.alive = true;
            player.reset_round();
        }

        self.status = SessionStatus::Playing;
        self.current_turn_index = 0;
        self.winner = None;
    }

    /// Stores a clue from the active player. Returns false for anyone else.
    pub fn record_clue(&mut self, player_id: &str, clue: &str) -> bool {
        let index = self.current_turn_index;
        match self.active_player() {
            Some(active) if active.id == player_id => {}
            _ => return false,
        }
        self.players[index].clue = clue.to_string();
        true
    }

    pub fn vote_progress(&self) -> VoteProgress {
        let living = self.players.iter().filter(|p| p.alive);
        VoteProgress {
            cast: living.clone().filter(|p| p.voted_for.is_some()).count(),
            required: living.count(),
        }
    }

    /// Records a vote if it is legal. Self-votes are rejected.
    pub fn record_vote(&mut self, voter_id: &str, target_id: &str) -> Option<VoteProgress> {
        if self.status != SessionStatus::Voting || voter_id == target_id {
            return None;
        }

        let voter = self.player(voter_id)?;
        if !voter.alive || voter.voted_for.is_some() {
            return None;
        }
        let target = self.player(target_id)?;
        if !target.alive {
            return None;
        }

        self.player_mut(voter_id)?.voted_for = Some(target_id.to_string());
        self.player_mut(target_id)?.votes_received += 1;
        Some(self.vote_progress())
    }

    /// Living player with the most votes; ties go to the earliest in turn order.
    pub fn elimination_candidate(&self) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (index, player) in self.players.iter().enumerate().filter(|(_, p)| p.alive) {
            match best {
                Some((_, votes)) if player.votes_received <= votes => {}
                _ => best = Some((index, player.votes_received)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Win conditions, checked in order: shadow gone, then headcount.
    pub fn evaluate_winner(&self) -> Option<Winner> {
        let shadow_alive = self
            .players
            .iter()
            .any(|p| p.alive && p.role == Role::Shadow);

        if !shadow_alive {
            return Some(Winner::Majority);
        }
        if self.living_count() <= 2 {
            return Some(Winner::Shadow);
        }
        None
    }

    pub fn finish(&mut self, winner: Winner) {
        self.status = SessionStatus::Finished;
        self.winner = Some(winner);
    }

    /// Clears per-round state and hands the first turn to the first living player.
    pub fn begin_next_round(&mut self) {
        for player in &mut self.players {
            player.reset_round();
        }
        self.current_turn_index = self.first_living_from(0).unwrap_or(0);
        self.status = SessionStatus::Playing;
    }

    /// Tallies the finished vote, eliminates one player and decides the round.
    pub fn eliminate(&mut self) -> Option<Elimination> {
        if self.status != SessionStatus::Voting {
            return None;
        }
        let index = self.elimination_candidate()?;

        let eliminated = &mut self.players[index];
        eliminated.alive = false;
        let player_id = eliminated.id.clone();
        let name = eliminated.name.clone();
        let role = eliminated.role;

        let outcome = match self.evaluate_winner() {
            Some(winner) => {
                self.finish(winner);
                RoundOutcome::GameOver(winner)
            }
            None => {
                self.begin_next_round();
                RoundOutcome::Continue
            }
        };

        Some(Elimination {
            player_id,
            name,
            role,
            outcome,
        })
    }

    /// Removes a player, keeping turn index, host and vote counts consistent.
    pub fn remove_player(&mut self, player_id: &str) -> Option<Departure> {
        let index = self.players.iter().position(|p| p.id == player_id)?;
        let player = self.players.remove(index);

        // Withdraw the leaver's vote and reopen votes cast for them.
        if let Some(target) = player.voted_for.as_deref() {
            if let Some(target) = self.player_mut(target) {
                target.votes_received = target.votes_received.saturating_sub(1);
            }
        }
        for other in &mut self.players {
            if other.voted_for.as_deref() == Some(player_id) {
                other.voted_for = None;
            }
        }

        let was_active =
            self.status == SessionStatus::Playing && index == self.current_turn_index;
        if index < self.current_turn_index {
            self.current_turn_index -= 1;
        }

        let host_changed = self.host_id == player.id;
        if host_changed {
            if let Some(first) = self.players.first() {
                self.host_id = first.id.clone();
            }
        }

        Some(Departure {
            player,
            index,
            was_active,
            host_changed,
        })
    }
}
