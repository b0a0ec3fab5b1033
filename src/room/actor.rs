//! Room actor with async message handling.
//!
//! One actor task owns one room: its engine, its countdown, and its
//! port handles. Because every command and every timer expiry is
//! processed on this single task, timer-driven and user-driven actions
//! can never race, and a manual action always cancels the pending
//! countdown before the next one is armed. Port calls are dispatched as
//! fire-and-forget tasks after the state change, so nothing blocks the
//! room while a sink is slow.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, interval};

use super::config::RoomConfig;
use super::messages::{CommandResult, RoomClosed, RoomError, RoomMessage};
use super::timer::{RoundTimer, TimerBinding};
use crate::game::engine::{GameEngine, GameEvent};
use crate::game::entities::{ActionRecord, Chips, HandId, RoomId, SeatNumber, Seating};
use crate::ports::{NotificationSink, PersistenceSink, SeatingProvider};

/// Room handle for sending messages.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    room_id: RoomId,
}

impl RoomHandle {
    #[must_use]
    pub fn new(sender: mpsc::Sender<RoomMessage>, room_id: RoomId) -> Self {
        Self { sender, room_id }
    }

    #[must_use]
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Send a message to the room.
    pub async fn send(&self, message: RoomMessage) -> Result<(), RoomClosed> {
        self.sender.send(message).await.map_err(|_| RoomClosed)
    }
}

/// Room actor managing a single room's hand lifecycle.
pub struct RoomActor {
    id: RoomId,
    engine: GameEngine,
    inbox: mpsc::Receiver<RoomMessage>,
    seating: Arc<dyn SeatingProvider>,
    notifications: Arc<dyn NotificationSink>,
    persistence: Arc<dyn PersistenceSink>,
    timer: Option<RoundTimer>,
    is_closed: bool,
}

impl RoomActor {
    /// Create a new room actor and the handle that feeds it.
    pub fn new(
        id: RoomId,
        config: RoomConfig,
        seating: Arc<dyn SeatingProvider>,
        notifications: Arc<dyn NotificationSink>,
        persistence: Arc<dyn PersistenceSink>,
    ) -> (Self, RoomHandle) {
        Self::with_engine(GameEngine::new(id), config, seating, notifications, persistence)
    }

    /// Same as [`RoomActor::new`] but with a caller-built engine, which
    /// is how tests inject a seeded one.
    pub fn with_engine(
        mut engine: GameEngine,
        config: RoomConfig,
        seating: Arc<dyn SeatingProvider>,
        notifications: Arc<dyn NotificationSink>,
        persistence: Arc<dyn PersistenceSink>,
    ) -> (Self, RoomHandle) {
        let id = engine.room_id();
        engine.set_time_per_round(config.time_per_round_secs);
        let (sender, inbox) = mpsc::channel(config.inbox_capacity);
        let actor = Self {
            id,
            engine,
            inbox,
            seating,
            notifications,
            persistence,
            timer: None,
            is_closed: false,
        };
        (actor, RoomHandle::new(sender, id))
    }

    /// Run the room's event loop until it is closed or every handle is
    /// dropped.
    pub async fn run(mut self) {
        log::info!("room {} starting", self.id);

        let mut tick = interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => self.handle_message(message).await,
                        None => break,
                    }
                    if self.is_closed {
                        break;
                    }
                }
                _ = tick.tick() => {
                    self.handle_tick();
                }
            }
        }

        // Leaving the loop cancels any outstanding countdown with it.
        self.timer = None;
        log::info!("room {} closed", self.id);
    }

    async fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::StartHand { response } => {
                let result = self.start_hand().await;
                let _ = response.send(result);
                self.after_state_change();
            }

            RoomMessage::TakeAction { seat, action, response } => {
                let result = self.engine.apply_action(seat, action).map_err(RoomError::from);
                if let Err(err) = &result {
                    log::debug!("room {}: seat {seat} action rejected: {err}", self.id);
                }
                let _ = response.send(result);
                self.after_state_change();
            }

            RoomMessage::CastRunOutVote { seat, option, response } => {
                let result = self.engine.cast_allin_vote(seat, option).map_err(RoomError::from);
                let _ = response.send(result);
                self.after_state_change();
            }

            RoomMessage::LeaveSeat { seat, response } => {
                let result = self.engine.force_player_leave(seat).map_err(RoomError::from);
                let _ = response.send(result);
                self.after_state_change();
            }

            RoomMessage::SetTimePerRound { secs, response } => {
                self.engine.set_time_per_round(secs);
                let _ = response.send(());
            }

            RoomMessage::GetView { response } => {
                let _ = response.send(self.engine.view());
            }

            RoomMessage::GetHoleCards { seat, response } => {
                let _ = response.send(self.engine.hole_cards(seat).map_err(RoomError::from));
            }

            RoomMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    async fn start_hand(&mut self) -> CommandResult {
        let seats = self.seating.seated_players(self.id).await?;
        let blinds = self.seating.blinds(self.id).await?;
        let min_players = self.seating.min_players(self.id).await?;
        let seating = Seating { seats, blinds, min_players };
        Ok(self.engine.start_hand(&seating)?)
    }

    /// One second of wall clock: count the live timer down, broadcast
    /// the remaining time, and fire the fallback when it hits zero.
    fn handle_tick(&mut self) {
        let Some(timer) = self.timer.as_mut() else {
            return;
        };
        let binding = timer.binding();
        let expired = timer.tick();
        let tick_event = GameEvent::TimerTick {
            seat: match binding {
                TimerBinding::Turn(seat) => Some(seat),
                TimerBinding::Vote => None,
            },
            remaining_secs: timer.remaining_secs(),
            total_secs: timer.total_secs(),
        };
        self.publish(tick_event);
        if !expired {
            return;
        }

        self.timer = None;
        let result = match binding {
            TimerBinding::Turn(seat) => self.engine.handle_timeout(seat).map(|_| ()),
            TimerBinding::Vote => self.engine.handle_vote_deadline().map(|_| ()),
        };
        if let Err(err) = result {
            // A broken fallback must not take the room down.
            log::error!("room {}: timeout fallback failed: {err}", self.id);
        }
        self.after_state_change();
    }

    /// Publish drained events, persist what needs persisting, and
    /// re-arm the countdown for whoever acts next.
    fn after_state_change(&mut self) {
        let events = self.engine.drain_events();
        if events.is_empty() {
            return;
        }
        let hand_id = self.engine.view().map(|view| view.hand_id);

        let mut rearm = false;
        for event in events {
            match &event {
                GameEvent::ActionApplied { record, .. } => {
                    if let Some(hand_id) = hand_id {
                        self.persist_action(hand_id, record.clone());
                    }
                    rearm = true;
                }
                GameEvent::HandFinished { hand_id, payouts } => {
                    self.persist_result(*hand_id, payouts.clone());
                    rearm = true;
                }
                // Vote casts don't refresh the vote deadline.
                GameEvent::RunOutVoteCast { .. } | GameEvent::TimerTick { .. } => {}
                _ => rearm = true,
            }
            self.publish(event);
        }
        if rearm {
            self.rearm_timer();
        }
    }

    fn rearm_timer(&mut self) {
        let secs = self.engine.time_per_round_secs();
        self.timer = match self.engine.view() {
            Some(view) if view.vote_open => Some(RoundTimer::vote(secs)),
            Some(view) if view.street.is_betting() => {
                view.current_actor.map(|seat| RoundTimer::turn(seat, secs))
            }
            _ => None,
        };
    }

    fn publish(&self, event: GameEvent) {
        let sink = Arc::clone(&self.notifications);
        let room_id = self.id;
        tokio::spawn(async move {
            if let Err(err) = sink.publish(room_id, event).await {
                log::warn!("room {room_id}: dropping notification: {err}");
            }
        });
    }

    fn persist_action(&self, hand_id: HandId, record: ActionRecord) {
        let sink = Arc::clone(&self.persistence);
        let room_id = self.id;
        tokio::spawn(async move {
            if let Err(err) = sink.record_action(room_id, hand_id, record).await {
                log::warn!("room {room_id}: failed to record action: {err}");
            }
        });
    }

    fn persist_result(&self, hand_id: HandId, payouts: BTreeMap<SeatNumber, Chips>) {
        let sink = Arc::clone(&self.persistence);
        let room_id = self.id;
        tokio::spawn(async move {
            if let Err(err) = sink.record_hand_result(room_id, hand_id, payouts).await {
                log::warn!("room {room_id}: failed to record hand result: {err}");
            }
        });
    }
}
