use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{Broadcaster, SessionRepository, WordProvider};
use crate::domain::{GameSession, Player, RoomEvent, WordPair, WordProviderError};
use crate::use_cases::{GameService, GameSettings};

pub(crate) type SessionTable = Arc<Mutex<HashMap<String, GameSession>>>;

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub find: bool,
    pub save: bool,
}

#[derive(Clone)]
pub(crate) struct RecordingRepository {
    sessions: SessionTable,
    failures: Arc<Mutex<FailureFlags>>,
}

impl RecordingRepository {
    pub(crate) fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(FailureFlags::default())),
        }
    }

    pub(crate) fn set_failures(&self, failures: FailureFlags) {
        *self.failures.lock().expect("failures mutex poisoned") = failures;
    }

    pub(crate) fn insert_test_session(&self, session: GameSession) {
        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.insert(session.code.clone(), session);
    }

    pub(crate) fn get_test_session(&self, code: &str) -> Option<GameSession> {
        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.get(code).cloned()
    }

    fn failures(&self) -> FailureFlags {
        *self.failures.lock().expect("failures mutex poisoned")
    }
}

#[async_trait]
impl SessionRepository for RecordingRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<GameSession>, String> {
        if self.failures().find {
            return Err("find failed".to_string());
        }
        Ok(self.get_test_session(code))
    }

    async fn create(&self, session: GameSession) -> Result<(), String> {
        self.insert_test_session(session);
        Ok(())
    }

    async fn save(&self, session: &GameSession) -> Result<(), String> {
        if self.failures().save {
            return Err("save failed".to_string());
        }
        self.insert_test_session(session.clone());
        Ok(())
    }

    async fn delete(&self, code: &str) -> Result<bool, String> {
        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        Ok(guard.remove(code).is_some())
    }
}

/// Who an event was addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Recipient {
    Room(String),
    Player(String),
}

#[derive(Clone, Default)]
pub(crate) struct RecordingBroadcaster {
    events: Arc<Mutex<Vec<(Recipient, RoomEvent)>>>,
}

impl RecordingBroadcaster {
    pub(crate) fn events(&self) -> Vec<(Recipient, RoomEvent)> {
        self.events.lock().expect("events mutex poisoned").clone()
    }

    pub(crate) fn room_events(&self, code: &str) -> Vec<RoomEvent> {
        self.events()
            .into_iter()
            .filter(|(to, _)| *to == Recipient::Room(code.to_string()))
            .map(|(_, event)| event)
            .collect()
    }

    pub(crate) fn player_events(&self, player_id: &str) -> Vec<RoomEvent> {
        self.events()
            .into_iter()
            .filter(|(to, _)| *to == Recipient::Player(player_id.to_string()))
            .map(|(_, event)| event)
            .collect()
    }

    pub(crate) fn timer_ticks(&self, code: &str) -> usize {
        self.room_events(code)
            .iter()
            .filter(|e| matches!(e, RoomEvent::TimerTick { .. }))
            .count()
    }

    pub(crate) fn clear(&self) {
        self.events.lock().expect("events mutex poisoned").clear();
    }
}

#[async_trait]
impl Broadcaster for RecordingBroadcaster {
    async fn join_room(&self, _room_code: &str, _player_id: &str) {}

    async fn leave_room(&self, _room_code: &str, _player_id: &str) {}

    async fn publish(&self, room_code: &str, event: RoomEvent) {
        let mut guard = self.events.lock().expect("events mutex poisoned");
        guard.push((Recipient::Room(room_code.to_string()), event));
    }

    async fn publish_to(&self, player_id: &str, event: RoomEvent) {
        let mut guard = self.events.lock().expect("events mutex poisoned");
        guard.push((Recipient::Player(player_id.to_string()), event));
    }
}

/// Word service double with a fixed answer.
pub(crate) enum ScriptedWords {
    Answer(Option<String>),
    Fail,
    Hang,
}

#[async_trait]
impl WordProvider for ScriptedWords {
    async fn similar_word(
        &self,
        _base: &str,
        _category: &str,
    ) -> Result<Option<String>, WordProviderError> {
        match self {
            ScriptedWords::Answer(word) => Ok(word.clone()),
            ScriptedWords::Fail => Err(WordProviderError::Unavailable),
            ScriptedWords::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }
}

pub(crate) struct Harness {
    pub service: Arc<GameService>,
    pub repo: RecordingRepository,
    pub events: RecordingBroadcaster,
}

pub(crate) fn harness(words: ScriptedWords) -> Harness {
    let repo = RecordingRepository::new();
    let events = RecordingBroadcaster::default();
    let service = GameService::new(
        Arc::new(repo.clone()),
        Arc::new(words),
        Arc::new(events.clone()),
        GameSettings::default(),
    );
    Harness {
        service,
        repo,
        events,
    }
}

/// Seeds a lobby with players named after their ids; the first one hosts.
pub(crate) fn seed_lobby(repo: &RecordingRepository, code: &str, ids: &[&str]) {
    let mut players = ids.iter().map(|id| Player::new(*id, *id));
    let host = players.next().expect("at least one player");
    let mut session = GameSession::new(code, host);
    session.players.extend(players);
    repo.insert_test_session(session);
}

/// Seeds a lobby and lets its first player start the game.
pub(crate) async fn start_seeded_game(h: &Harness, code: &str, ids: &[&str]) -> GameSession {
    seed_lobby(&h.repo, code, ids);
    h.service
        .start_game(code, ids[0])
        .await
        .expect("game should start");
    h.repo.get_test_session(code).expect("session stored")
}

/// Seeds a game already in PLAYING with a known shadow and no timer running.
pub(crate) fn seed_playing(
    repo: &RecordingRepository,
    code: &str,
    ids: &[&str],
    shadow_index: usize,
) {
    seed_lobby(repo, code, ids);
    let mut session = repo.get_test_session(code).expect("seeded");
    session.start_game(
        &WordPair {
            category: "Food".to_string(),
            base: "Pizza".to_string(),
            shadow: None,
        },
        shadow_index,
    );
    repo.insert_test_session(session);
}
