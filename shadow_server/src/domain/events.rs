// Outbound room events and the player views they carry.

use crate::domain::session::{GameMode, GameSession, Player, PlayerId, SessionStatus};

/// Public view of a player: never includes role or secret word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
    pub clue: String,
    pub votes_received: u32,
    pub is_host: bool,
}

/// Full player record, only sent once the game is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerReveal {
    pub id: PlayerId,
    pub name: String,
    pub role: String,
    pub secret_word: Option<String>,
    pub alive: bool,
    pub clue: String,
    pub votes_received: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    RoomCreated {
        room_code: String,
        players: Vec<PlayerView>,
        game_mode: GameMode,
    },
    JoinSuccess {
        room_code: String,
        players: Vec<PlayerView>,
        game_mode: GameMode,
    },
    RoomUpdate {
        players: Vec<PlayerView>,
        host_id: PlayerId,
    },
    GameModeUpdated {
        game_mode: GameMode,
    },
    // Private per-player payload.
    GameStarted {
        role: String,
        word: Option<String>,
        players: Vec<PlayerView>,
        active_player_id: PlayerId,
    },
    TurnChange {
        active_player_id: PlayerId,
        player_name: String,
        time_left: u32,
    },
    TimerTick {
        time_left: u32,
    },
    ClueUpdated {
        player_id: PlayerId,
        clue: String,
    },
    PhaseChange {
        status: SessionStatus,
        players: Vec<PlayerView>,
    },
    VoteUpdate {
        voted_count: usize,
        total_required: usize,
    },
    RoundResult {
        eliminated: String,
        role_was: String,
        players: Vec<PlayerView>,
    },
    GameOver {
        winner: String,
        eliminated: Option<String>,
        role_was: Option<String>,
        players: Vec<PlayerReveal>,
    },
    Error {
        message: String,
    },
}

impl PlayerView {
    fn from_player(player: &Player, host_id: &str) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            alive: player.alive,
            clue: player.clue.clone(),
            votes_received: player.votes_received,
            is_host: player.id == host_id,
        }
    }
}

impl PlayerReveal {
    fn from_player(player: &Player, mode: GameMode) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            role: player.role.label(mode).to_string(),
            secret_word: player.secret_word.clone(),
            alive: player.alive,
            clue: player.clue.clone(),
            votes_received: player.votes_received,
        }
    }
}

impl GameSession {
    pub fn public_snapshot(&self) -> Vec<PlayerView> {
        self.players
            .iter()
            .map(|p| PlayerView::from_player(p, &self.host_id))
            .collect()
    }

    pub fn full_snapshot(&self) -> Vec<PlayerReveal> {
        self.players
            .iter()
            .map(|p| PlayerReveal::from_player(p, self.game_mode))
            .collect()
    }
}
