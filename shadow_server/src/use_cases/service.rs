// Game service wiring: collaborators, room registry and shared helpers.

use std::sync::Arc;
use tracing::error;

use crate::domain::{Broadcaster, GameError, GameSession, SessionRepository, WordProvider};
use crate::use_cases::rooms::{RoomGuard, RoomRegistry};
use crate::use_cases::types::GameSettings;

/// Entry point for every inbound action and every timer callback.
///
/// Lobby, game flow and turn scheduling are implemented in their own modules
/// as `impl GameService` blocks; they all funnel through the same room locks.
pub struct GameService {
    pub(crate) repo: Arc<dyn SessionRepository>,
    pub(crate) words: Arc<dyn WordProvider>,
    pub(crate) broadcaster: Arc<dyn Broadcaster>,
    pub(crate) rooms: RoomRegistry,
    pub(crate) settings: GameSettings,
}

impl GameService {
    pub fn new(
        repo: Arc<dyn SessionRepository>,
        words: Arc<dyn WordProvider>,
        broadcaster: Arc<dyn Broadcaster>,
        settings: GameSettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            repo,
            words,
            broadcaster,
            rooms: RoomRegistry::new(),
            settings,
        })
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Number of rooms that currently own a running timer task.
    pub async fn active_timer_count(&self) -> usize {
        self.rooms.active_timer_count().await
    }

    pub(crate) async fn load(&self, code: &str) -> Result<Option<GameSession>, GameError> {
        self.repo.find_by_code(code).await.map_err(|e| {
            error!(room_code = code, error = %e, "failed to load session");
            GameError::StorageFailure
        })
    }

    /// Loads while holding the room guard. A failed load leaves no idle slot behind.
    pub(crate) async fn load_locked(
        &self,
        code: &str,
        room: &mut RoomGuard,
    ) -> Result<Option<GameSession>, GameError> {
        let loaded = self.load(code).await;
        if loaded.is_err() {
            self.rooms.forget_idle(code, room).await;
        }
        loaded
    }

    pub(crate) async fn persist(&self, session: &GameSession) -> Result<(), GameError> {
        self.repo.save(session).await.map_err(|e| {
            error!(room_code = %session.code, error = %e, "failed to save session");
            GameError::StorageFailure
        })
    }
}
