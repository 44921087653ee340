// Connection hub: room membership and per-connection outbound queues.

use crate::domain::{Broadcaster, RoomEvent};
use crate::interface_adapters::protocol::ServerMessage;

use async_trait::async_trait;
use axum::extract::ws::Utf8Bytes;
use std::collections::{HashMap, HashSet};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, error, warn};

/// Routes serialized events to the sockets of room members.
#[derive(Default)]
pub struct ConnectionHub {
    // Outbound queue per connected player.
    connections: RwLock<HashMap<String, mpsc::Sender<Utf8Bytes>>>,
    // Room code -> player ids currently attached to that room.
    rooms: RwLock<HashMap<String, HashSet<String>>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, player_id: &str, tx: mpsc::Sender<Utf8Bytes>) {
        self.connections
            .write()
            .await
            .insert(player_id.to_string(), tx);
    }

    /// Drops the player's queue and every room membership it still had.
    pub async fn unregister(&self, player_id: &str) {
        self.connections.write().await.remove(player_id);
        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, members| {
            members.remove(player_id);
            !members.is_empty()
        });
    }

    pub async fn room_members(&self, room_code: &str) -> usize {
        self.rooms
            .read()
            .await
            .get(room_code)
            .map_or(0, HashSet::len)
    }

    fn serialize(event: RoomEvent) -> Option<Utf8Bytes> {
        let msg = ServerMessage::from(event);
        match serde_json::to_string(&msg) {
            Ok(txt) => Some(Utf8Bytes::from(txt)),
            Err(e) => {
                error!(error = ?e, "failed to serialize room event");
                None
            }
        }
    }

    fn deliver(player_id: &str, tx: &mpsc::Sender<Utf8Bytes>, bytes: Utf8Bytes) {
        match tx.try_send(bytes) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(player_id, "outbound queue full; dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(player_id, "connection gone; event dropped");
            }
        }
    }
}

#[async_trait]
impl Broadcaster for ConnectionHub {
    async fn join_room(&self, room_code: &str, player_id: &str) {
        self.rooms
            .write()
            .await
            .entry(room_code.to_string())
            .or_default()
            .insert(player_id.to_string());
    }

    async fn leave_room(&self, room_code: &str, player_id: &str) {
        let mut rooms = self.rooms.write().await;
        if let Some(members) = rooms.get_mut(room_code) {
            members.remove(player_id);
            if members.is_empty() {
                rooms.remove(room_code);
            }
        }
    }

    async fn publish(&self, room_code: &str, event: RoomEvent) {
        let members: Vec<String> = match self.rooms.read().await.get(room_code) {
            Some(members) => members.iter().cloned().collect(),
            None => return,
        };
        // Serialize once; every member gets the same shared bytes.
        let Some(bytes) = Self::serialize(event) else {
            return;
        };

        let connections = self.connections.read().await;
        for player_id in &members {
            if let Some(tx) = connections.get(player_id) {
                Self::deliver(player_id, tx, bytes.clone());
            }
        }
    }

    async fn publish_to(&self, player_id: &str, event: RoomEvent) {
        let Some(bytes) = Self::serialize(event) else {
            return;
        };
        if let Some(tx) = self.connections.read().await.get(player_id) {
            Self::deliver(player_id, tx, bytes);
        }
    }
}
