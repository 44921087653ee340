// Turn scheduling: reveal delay, per-turn countdown and the advance-turn primitive.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info, warn};

use crate::domain::{GameError, GameSession, RoomEvent, SessionStatus};
use crate::use_cases::rooms::{RoomGuard, TimerKind};
use crate::use_cases::service::GameService;

impl GameService {
    /// (Re)starts the countdown for whoever holds the current turn.
    pub async fn start_turn(self: &Arc<Self>, code: &str) -> Result<(), GameError> {
        let mut room = self.rooms.lock(code).await;
        match self.load_locked(code, &mut room).await? {
            Some(session) => self.begin_turn(&mut room, &session).await,
            None => self.rooms.discard(code, &mut room).await,
        }
        Ok(())
    }

    /// Moves the turn to the next living player, or opens voting.
    pub async fn advance_turn(self: &Arc<Self>, code: &str) -> Result<(), GameError> {
        let mut room = self.rooms.lock(code).await;
        let Some(session) = self.load_locked(code, &mut room).await? else {
            self.rooms.discard(code, &mut room).await;
            return Ok(());
        };
        self.advance_turn_locked(&mut room, session).await
    }

    pub(crate) async fn advance_turn_locked(
        self: &Arc<Self>,
        room: &mut RoomGuard,
        session: GameSession,
    ) -> Result<(), GameError> {
        if session.status != SessionStatus::Playing {
            room.timer.cancel();
            return Ok(());
        }
        let next = session.next_turn_index();
        self.move_turn(room, session, next).await
    }

    /// Hands the turn to `next`, or switches to voting when nobody is left.
    pub(crate) async fn move_turn(
        self: &Arc<Self>,
        room: &mut RoomGuard,
        mut session: GameSession,
        next: Option<usize>,
    ) -> Result<(), GameError> {
        match next {
            Some(index) => {
                session.current_turn_index = index;
                self.persist(&session).await?;
                self.begin_turn(room, &session).await;
            }
            None => {
                session.status = SessionStatus::Voting;
                self.persist(&session).await?;
                room.timer.cancel();
                info!(room_code = %session.code, "all clues in; voting started");
                self.broadcaster
                    .publish(
                        &session.code,
                        RoomEvent::PhaseChange {
                            status: SessionStatus::Voting,
                            players: session.public_snapshot(),
                        },
                    )
                    .await;
            }
        }
        Ok(())
    }

    /// Replaces the room timer with a fresh countdown for the active player.
    pub(crate) async fn begin_turn(self: &Arc<Self>, room: &mut RoomGuard, session: &GameSession) {
        let generation = room.timer.rearm();
        let Some(active) = session.active_player() else {
            return;
        };

        self.broadcaster
            .publish(
                &session.code,
                RoomEvent::TurnChange {
                    active_player_id: active.id.clone(),
                    player_name: active.name.clone(),
                    time_left: self.settings.turn_seconds,
                },
            )
            .await;

        let task = tokio::spawn(self.clone().countdown(session.code.clone(), generation));
        room.timer.attach(generation, TimerKind::Countdown, task.abort_handle());
        debug!(room_code = %session.code, player_id = %active.id, "turn started");
    }

    /// Waits out the role reveal, then starts the first turn.
    pub(crate) fn schedule_first_turn(self: &Arc<Self>, room: &mut RoomGuard, code: &str) {
        let generation = room.timer.rearm();
        let task = tokio::spawn(self.clone().reveal_then_start(code.to_string(), generation));
        room.timer.attach(generation, TimerKind::Reveal, task.abort_handle());
    }

    fn reveal_then_start(self: Arc<Self>, code: String, generation: u64) -> BoxFuture<'static, ()> {
        async move {
            tokio::time::sleep(self.settings.reveal_delay).await;

            let Some(mut room) = self.rooms.lock_existing(&code).await else {
                return;
            };
            // A turn may already have started, e.g. the first clue came in early.
            if !room.timer.is_current(generation) {
                return;
            }
            room.timer.release(generation);

            match self.load(&code).await {
                Ok(Some(session)) => self.begin_turn(&mut room, &session).await,
                Ok(None) => debug!(room_code = %code, "room gone before first turn"),
                Err(_) => {
                    warn!(room_code = %code, "first turn not started; retrying after delay");
                    self.schedule_first_turn(&mut room, &code);
                }
            }
        }
        .boxed()
    }

    fn countdown(self: Arc<Self>, code: String, generation: u64) -> BoxFuture<'static, ()> {
        async move {
            let tick = self.settings.tick_interval;
            let mut ticks = interval_at(Instant::now() + tick, tick);
            let mut time_left = self.settings.turn_seconds;

            loop {
                ticks.tick().await;

                let Some(mut room) = self.rooms.lock_existing(&code).await else {
                    return;
                };
                if !room.timer.is_current(generation) {
                    return;
                }

                // Re-check the session every tick; it may be gone or past PLAYING.
                let session = match self.load(&code).await {
                    Ok(Some(session)) if session.status == SessionStatus::Playing => session,
                    Ok(_) => {
                        room.timer.release(generation);
                        return;
                    }
                    Err(_) => continue,
                };

                time_left = time_left.saturating_sub(1);
                self.broadcaster
                    .publish(&code, RoomEvent::TimerTick { time_left })
                    .await;

                if time_left == 0 {
                    room.timer.release(generation);
                    debug!(room_code = %code, "turn timed out");
                    let stalled = session.clone();
                    if let Err(e) = self.advance_turn_locked(&mut room, session).await {
                        // Nothing was stored; give the same player a fresh countdown.
                        warn!(room_code = %code, error = ?e, "failed to advance after timeout");
                        self.begin_turn(&mut room, &stalled).await;
                    }
                    return;
                }
            }
        }
        .boxed()
    }
}
