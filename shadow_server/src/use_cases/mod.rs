// Use cases layer: application workflows for the game server.

pub mod game;
pub mod lobby;
pub mod rooms;
pub mod service;
pub mod turns;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use service::GameService;
pub use types::GameSettings;
