// Use-case level settings for the game flow.

use std::time::Duration;

/// Shared timing and sizing rules applied to every room.
#[derive(Debug, Clone)]
pub struct GameSettings {
    /// Seconds each player gets to give a clue.
    pub turn_seconds: u32,
    /// Spacing between timer ticks.
    pub tick_interval: Duration,
    /// Pause after dealing roles before the first turn starts.
    pub reveal_delay: Duration,
    /// Players required before the host may start.
    pub min_players: usize,
    /// Upper bound on waiting for the word-similarity service.
    pub word_provider_timeout: Duration,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            turn_seconds: 30,
            tick_interval: Duration::from_secs(1),
            reveal_delay: Duration::from_secs(5),
            min_players: 3,
            word_provider_timeout: Duration::from_millis(1500),
        }
    }
}
