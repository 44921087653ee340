use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{GameSession, SessionRepository};

// In-memory session repository; one document per room code.
#[derive(Clone, Default)]
pub struct InMemorySessionRepository {
    pub sessions: Arc<Mutex<HashMap<String, GameSession>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<GameSession>, String> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(code).cloned())
    }

    async fn create(&self, session: GameSession) -> Result<(), String> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&session.code) {
            return Err(format!("room {} already exists", session.code));
        }
        sessions.insert(session.code.clone(), session);
        Ok(())
    }

    async fn save(&self, session: &GameSession) -> Result<(), String> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.code.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, code: &str) -> Result<bool, String> {
        let mut sessions = self.sessions.lock().await;
        Ok(sessions.remove(code).is_some())
    }
}
