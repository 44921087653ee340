use async_trait::async_trait;

use crate::domain::errors::WordProviderError;
use crate::domain::events::RoomEvent;
use crate::domain::session::GameSession;

// Port for session persistence used by the game use cases.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<GameSession>, String>;
    async fn create(&self, session: GameSession) -> Result<(), String>;
    async fn save(&self, session: &GameSession) -> Result<(), String>;
    async fn delete(&self, code: &str) -> Result<bool, String>;
}

// Port for the external word-similarity service.
#[async_trait]
pub trait WordProvider: Send + Sync {
    /// Returns a word close to `base` within `category`, or `None` when it has no idea.
    async fn similar_word(
        &self,
        base: &str,
        category: &str,
    ) -> Result<Option<String>, WordProviderError>;
}

// Port for delivering events to room members and single players.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn join_room(&self, room_code: &str, player_id: &str);
    async fn leave_room(&self, room_code: &str, player_id: &str);
    async fn publish(&self, room_code: &str, event: RoomEvent);
    async fn publish_to(&self, player_id: &str, event: RoomEvent);
}
