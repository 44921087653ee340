// Domain layer: game session entities, round rules and ports.

pub mod errors;
pub mod events;
pub mod ports;
pub mod session;
pub mod words;

pub use errors::{GameError, WordProviderError};
pub use events::{PlayerReveal, PlayerView, RoomEvent};
pub use ports::{Broadcaster, SessionRepository, WordProvider};
pub use session::{
    Departure, Elimination, GameMode, GameSession, Player, PlayerId, Role, RoundOutcome,
    SessionStatus, VoteProgress, Winner,
};
pub use words::WordPair;
