// Per-room serialization and turn timer ownership.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::task::AbortHandle;

/// What the room's timer task is waiting for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimerKind {
    Reveal,
    #[default]
    Countdown,
}

/// The one outstanding timer task (reveal delay or countdown) for a room.
#[derive(Debug, Default)]
pub struct TurnTimer {
    // Bumped on every arm/cancel so stale tasks can tell they were superseded.
    generation: u64,
    handle: Option<AbortHandle>,
    kind: TimerKind,
}

impl TurnTimer {
    /// Cancels any running task and returns the generation for the next one.
    pub fn rearm(&mut self) -> u64 {
        self.cancel();
        self.generation
    }

    /// Attaches the task spawned for `generation`.
    pub fn attach(&mut self, generation: u64, kind: TimerKind, handle: AbortHandle) {
        if generation == self.generation {
            self.handle = Some(handle);
            self.kind = kind;
        } else {
            handle.abort();
        }
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.handle.is_some()
    }

    /// Called by the task itself when it stops; never aborts the caller.
    pub fn release(&mut self, generation: u64) {
        if self.generation == generation {
            self.generation += 1;
            self.handle = None;
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// True while the roles are on screen and no turn has started yet.
    pub fn is_revealing(&self) -> bool {
        self.handle.is_some() && self.kind == TimerKind::Reveal
    }
}

/// State owned by a room besides its persisted session.
#[derive(Debug, Default)]
pub struct RoomSlot {
    pub timer: TurnTimer,
}

pub type RoomGuard = OwnedMutexGuard<RoomSlot>;

/// Thread-safe registry of room locks. Holding a room's guard is the only way
/// to mutate that room's session, which gives every room a total order of
/// mutations while different rooms proceed in parallel.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Arc<Mutex<RoomSlot>>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, code: &str) -> Arc<Mutex<RoomSlot>> {
        if let Some(slot) = self.rooms.read().await.get(code) {
            return slot.clone();
        }
        let mut rooms = self.rooms.write().await;
        rooms.entry(code.to_string()).or_default().clone()
    }

    /// Waits for exclusive access to a room, registering it if needed.
    pub async fn lock(&self, code: &str) -> RoomGuard {
        loop {
            let slot = self.slot(code).await;
            if let Some(guard) = self.lock_slot(code, slot).await {
                return guard;
            }
        }
    }

    /// Like `lock`, but gives up if the room is not registered.
    /// Timer tasks use this so they never resurrect a deleted room.
    pub async fn lock_existing(&self, code: &str) -> Option<RoomGuard> {
        loop {
            let slot = self.rooms.read().await.get(code).cloned()?;
            if let Some(guard) = self.lock_slot(code, slot).await {
                return Some(guard);
            }
        }
    }

    async fn lock_slot(&self, code: &str, slot: Arc<Mutex<RoomSlot>>) -> Option<RoomGuard> {
        let guard = slot.clone().lock_owned().await;
        // The slot may have been discarded while we waited.
        self.rooms
            .read()
            .await
            .get(code)
            .is_some_and(|current| Arc::ptr_eq(current, &slot))
            .then_some(guard)
    }

    /// Drops the room entry. Call while holding the room's guard.
    pub async fn discard(&self, code: &str, guard: &mut RoomGuard) {
        guard.timer.cancel();
        self.rooms.write().await.remove(code);
    }

    /// Drops the room entry unless a timer task still belongs to it.
    pub async fn forget_idle(&self, code: &str, guard: &mut RoomGuard) {
        if !guard.timer.is_active() {
            self.rooms.write().await.remove(code);
        }
    }

    pub async fn contains(&self, code: &str) -> bool {
        self.rooms.read().await.contains_key(code)
    }

    #[cfg(test)]
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Number of rooms with a live timer task.
    pub async fn active_timer_count(&self) -> usize {
        let slots: Vec<_> = self.rooms.read().await.values().cloned().collect();
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.timer.is_active() {
                count += 1;
            }
        }
        count
    }
}
