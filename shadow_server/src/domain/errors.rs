// Domain-level errors for lobby and game workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    RoomNotFound,
    GameAlreadyStarted,
    NameTaken,
    InvalidDisplayName,
    InvalidClue,
    NotEnoughPlayers,
    StorageFailure,
}

impl GameError {
    /// Message sent back to the single requester.
    pub fn user_message(&self) -> &'static str {
        match self {
            GameError::RoomNotFound => "Room not found",
            GameError::GameAlreadyStarted => "Game already started",
            GameError::NameTaken => "Name taken",
            GameError::InvalidDisplayName => "Invalid display name",
            GameError::InvalidClue => "Clue must be 1 to 40 characters",
            GameError::NotEnoughPlayers => "Min 3 players required",
            GameError::StorageFailure => "Something went wrong, try again",
        }
    }
}

// Failures reported by the external word-similarity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordProviderError {
    Unavailable,
    Timeout,
    InvalidResponse,
}
