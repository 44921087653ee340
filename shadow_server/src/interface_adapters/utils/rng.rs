use std::{
    sync::{
        OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Process-unique, increasing id used to tag connections in logs.
pub fn conn_id() -> u64 {
    static COUNTER: OnceLock<AtomicU64> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU64::new(now_nanos()));
    counter.fetch_add(1, Ordering::Relaxed)
}

/// Opaque player id handed to a new connection.
///
/// Combines the connection counter with random bits so ids are not guessable
/// from one another.
pub fn player_id() -> String {
    let salt: u32 = rand::random();
    format!("p{:x}{:08x}", conn_id(), salt)
}
