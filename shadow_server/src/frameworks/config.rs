use std::{env, net::IpAddr, time::Duration};

use crate::use_cases::GameSettings;

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("SHADOW_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000)
}

pub fn http_host() -> IpAddr {
    env::var("SHADOW_SERVER_HOST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}

/// Base URL of the word-similarity service; unset means table words only.
pub fn word_service_url() -> Option<String> {
    env::var("WORD_SERVICE_URL")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn word_service_timeout() -> Duration {
    let millis = env::var("WORD_SERVICE_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(1500);
    Duration::from_millis(millis)
}

fn secs_var(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

/// Game timing from the environment, falling back to the standard rules.
pub fn game_settings() -> GameSettings {
    let defaults = GameSettings::default();
    let turn_seconds = u32::try_from(secs_var("TURN_DURATION_SECS", 30))
        .unwrap_or(defaults.turn_seconds)
        .max(1);
    GameSettings {
        turn_seconds,
        reveal_delay: Duration::from_secs(secs_var("REVEAL_DELAY_SECS", 5)),
        word_provider_timeout: word_service_timeout(),
        min_players: MIN_PLAYERS,
        ..defaults
    }
}

pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;
pub const MIN_PLAYERS: usize = 3;
