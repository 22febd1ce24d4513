//! Countdown controller: owns the session and drives the per-second tick

use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{CountdownSession, SessionSnapshot, StateChange, TimerState};
use crate::{
    format::{ClockField, ClockTime},
    tasks::{Repeat, TimerHandle, TimerService, TokioTimerService},
};

/// Default interval between ticks
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);
/// Default wait between reaching zero and the automatic stop
pub const DEFAULT_GRACE: Duration = Duration::from_millis(300);

/// Timing configuration for the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub tick: Duration,
    pub grace: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            grace: DEFAULT_GRACE,
        }
    }
}

/// Session plus the timer currently scheduled on its behalf
struct Inner {
    session: CountdownSession,
    /// Bumped whenever the timer is cancelled; callbacks carrying an older
    /// value are stale and must not touch the session
    generation: u64,
    timer: Option<Box<dyn TimerHandle>>,
}

impl Inner {
    fn cancel_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        self.generation = self.generation.wrapping_add(1);
    }
}

struct Shared {
    inner: Mutex<Inner>,
    config: ControllerConfig,
    timers: Arc<dyn TimerService>,
    /// Channel carrying the latest session snapshot
    snapshot_tx: watch::Sender<SessionSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<SessionSnapshot>,
    /// Channel for applied state transitions
    transition_tx: broadcast::Sender<StateChange>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Countdown session lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Notify observers; called with the session lock held so that
    /// notifications go out in the order the mutations were applied
    fn publish(&self, session: &CountdownSession, change: Option<StateChange>) {
        if let Err(e) = self.snapshot_tx.send(session.snapshot()) {
            warn!("Failed to send session snapshot: {}", e);
        }
        if let Some(change) = change {
            if self.transition_tx.send(change).is_err() {
                debug!("No transition subscribers for {} -> {}", change.from, change.to);
            }
        }
    }

    fn start_ticking(self: &Arc<Self>, inner: &mut Inner) {
        let generation = inner.generation;
        let weak = Arc::downgrade(self);
        inner.timer = Some(self.timers.repeat(
            self.config.tick,
            Box::new(move || match weak.upgrade() {
                Some(shared) => shared.on_tick(generation),
                None => Repeat::Stop,
            }),
        ));
    }

    fn on_tick(self: &Arc<Self>, generation: u64) -> Repeat {
        let mut inner = self.lock();
        if inner.generation != generation || !inner.session.state.is_running() {
            debug!("Discarding stale tick");
            return Repeat::Stop;
        }

        let remaining = inner.session.tick();
        debug!(
            "Tick: {}s remaining ({}%)",
            remaining, inner.session.progress_percent
        );
        self.publish(&inner.session, None);

        if remaining > 0 {
            return Repeat::Continue;
        }

        info!(
            "Countdown reached zero, stopping in {}ms",
            self.config.grace.as_millis()
        );
        let weak: Weak<Shared> = Arc::downgrade(self);
        inner.timer = Some(self.timers.once(
            self.config.grace,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.finish(generation);
                }
            }),
        ));
        Repeat::Stop
    }

    fn finish(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation || !inner.session.state.is_running() {
            debug!("Discarding stale auto-stop");
            return;
        }

        let from = inner.session.state;
        inner.cancel_timer();
        inner.session.reset();
        info!("Countdown finished");
        self.publish(
            &inner.session,
            Some(StateChange {
                from,
                to: TimerState::Stopped,
            }),
        );
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let inner = self
            .inner
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.cancel_timer();
    }
}

/// Owner of the countdown session
///
/// Cloning yields another handle to the same session. Every read and write goes
/// through one mutex, so ticks and requests are applied one at a time, in order.
/// A tick scheduled before the session left `Running` is never applied after it.
#[derive(Clone)]
pub struct CountdownController {
    shared: Arc<Shared>,
}

impl CountdownController {
    /// Create a controller ticking on the tokio runtime
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_timer_service(config, Arc::new(TokioTimerService::new()))
    }

    /// Create a controller on top of a host-provided timer service
    pub fn with_timer_service(config: ControllerConfig, timers: Arc<dyn TimerService>) -> Self {
        let session = CountdownSession::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
        let (transition_tx, _) = broadcast::channel(16);

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    session,
                    generation: 0,
                    timer: None,
                }),
                config,
                timers,
                snapshot_tx,
                _snapshot_rx: snapshot_rx,
                transition_tx,
            }),
        }
    }

    pub fn config(&self) -> ControllerConfig {
        self.shared.config
    }

    /// Configure the countdown duration.
    ///
    /// Only applies while stopped; returns whether it did.
    pub fn set_duration(&self, total_seconds: u64) -> bool {
        let mut inner = self.shared.lock();
        self.set_duration_locked(&mut inner, total_seconds)
    }

    fn set_duration_locked(&self, inner: &mut Inner, total_seconds: u64) -> bool {
        if !inner.session.set_duration(total_seconds) {
            debug!(
                "Ignoring duration change to {}s while {}",
                total_seconds, inner.session.state
            );
            return false;
        }

        info!("Duration set to {}", ClockTime::from_seconds(total_seconds));
        self.shared.publish(&inner.session, None);
        true
    }

    /// Edit one clock field of the configured duration as an input field would.
    ///
    /// Same rules as [`CountdownController::set_duration`], so it only applies while stopped.
    pub fn apply_entry(&self, field: ClockField, text: &str) -> bool {
        let mut inner = self.shared.lock();
        let current = ClockTime::from_seconds(inner.session.remaining_seconds);
        self.set_duration_locked(&mut inner, current.apply_entry(field, text))
    }

    /// Request a state transition.
    ///
    /// Invalid or redundant requests are silently ignored; returns whether the
    /// transition applied.
    pub fn request_state(&self, target: TimerState) -> bool {
        let mut inner = self.shared.lock();
        if !inner.session.can_enter(target) {
            debug!(
                "Ignoring request for {} while {} with {}s remaining",
                target, inner.session.state, inner.session.remaining_seconds
            );
            return false;
        }

        let from = inner.session.state;
        inner.cancel_timer();
        match target {
            TimerState::Running => {
                inner.session.state = TimerState::Running;
                self.shared.start_ticking(&mut inner);
            }
            TimerState::Paused => {
                inner.session.state = TimerState::Paused;
            }
            TimerState::Stopped => {
                inner.session.reset();
            }
        }

        info!("Timer state changed: {} -> {}", from, target);
        self.shared
            .publish(&inner.session, Some(StateChange { from, to: target }));
        true
    }

    /// Current session snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.lock().session.snapshot()
    }

    pub fn state(&self) -> TimerState {
        self.shared.lock().session.state
    }

    pub fn total_seconds(&self) -> u64 {
        self.shared.lock().session.total_seconds
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.shared.lock().session.remaining_seconds
    }

    pub fn progress_percent(&self) -> u8 {
        self.shared.lock().session.progress_percent
    }

    /// Watch the latest snapshot; the receiver sees every change that has not
    /// yet been superseded
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Receive every applied state transition, including the automatic stop
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<StateChange> {
        self.shared.transition_tx.subscribe()
    }
}

impl Default for CountdownController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl std::fmt::Debug for CountdownController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownController")
            .field("config", &self.shared.config)
            .field("session", &self.shared.lock().session)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[tokio::test(start_paused = true)]
    async fn set_duration_while_stopped() {
        let controller = CountdownController::default();
        assert!(controller.set_duration(90));
        assert_eq!(controller.total_seconds(), 90);
        assert_eq!(controller.remaining_seconds(), 90);
        assert_eq!(controller.progress_percent(), 100);
        assert_eq!(controller.state(), TimerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn set_duration_ignored_while_running() {
        let controller = CountdownController::default();
        controller.set_duration(10);
        assert!(controller.request_state(TimerState::Running));

        assert!(!controller.set_duration(99));
        assert_eq!(controller.state(), TimerState::Running);
        assert_eq!(controller.total_seconds(), 10);
        assert_eq!(controller.remaining_seconds(), 10);
        controller.request_state(TimerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn running_with_zero_duration_is_noop() {
        let controller = CountdownController::default();
        assert!(!controller.request_state(TimerState::Running));
        assert!(!controller.request_state(TimerState::Paused));
        assert_eq!(controller.state(), TimerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_then_stops_after_grace() {
        let controller = CountdownController::default();
        controller.set_duration(3);
        controller.request_state(TimerState::Running);

        sleep(ms(1100)).await;
        assert_eq!(controller.remaining_seconds(), 2);
        assert_eq!(controller.progress_percent(), 66);

        sleep(ms(2000)).await;
        assert_eq!(controller.remaining_seconds(), 0);
        assert_eq!(controller.state(), TimerState::Running);

        sleep(ms(300)).await;
        assert_eq!(controller.state(), TimerState::Stopped);
        assert_eq!(controller.total_seconds(), 0);
        assert_eq!(controller.remaining_seconds(), 0);
        assert_eq!(controller.progress_percent(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_and_resume_lose_no_tick() {
        let controller = CountdownController::default();
        controller.set_duration(10);
        controller.request_state(TimerState::Running);

        sleep(ms(5500)).await;
        assert_eq!(controller.remaining_seconds(), 5);
        assert!(controller.request_state(TimerState::Paused));

        sleep(ms(10_000)).await;
        assert_eq!(controller.remaining_seconds(), 5);
        assert_eq!(controller.state(), TimerState::Paused);

        assert!(controller.request_state(TimerState::Running));
        sleep(ms(1100)).await;
        assert_eq!(controller.remaining_seconds(), 4);
        sleep(ms(1000)).await;
        assert_eq!(controller.remaining_seconds(), 3);
        controller.request_state(TimerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_resets_and_cancels() {
        let controller = CountdownController::default();
        controller.set_duration(30);
        controller.request_state(TimerState::Running);
        sleep(ms(2500)).await;

        assert!(controller.request_state(TimerState::Stopped));
        assert_eq!(controller.total_seconds(), 0);
        assert_eq!(controller.remaining_seconds(), 0);
        assert_eq!(controller.progress_percent(), 0);

        sleep(ms(5000)).await;
        assert_eq!(controller.state(), TimerState::Stopped);
        assert_eq!(controller.remaining_seconds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_from_paused_resets() {
        let controller = CountdownController::default();
        controller.set_duration(30);
        controller.request_state(TimerState::Running);
        sleep(ms(1500)).await;
        controller.request_state(TimerState::Paused);

        assert!(controller.request_state(TimerState::Stopped));
        assert_eq!(controller.snapshot().total_seconds, 0);
        assert_eq!(controller.state(), TimerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_running_request_does_not_restart_ticks() {
        let controller = CountdownController::default();
        controller.set_duration(10);
        controller.request_state(TimerState::Running);

        sleep(ms(1500)).await;
        assert_eq!(controller.remaining_seconds(), 9);
        assert!(!controller.request_state(TimerState::Running));

        // A restarted loop would not tick again until 2.5s
        sleep(ms(600)).await;
        assert_eq!(controller.remaining_seconds(), 8);
        assert_eq!(controller.progress_percent(), 80);
        controller.request_state(TimerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_grace_cancels_auto_stop() {
        let controller = CountdownController::default();
        let mut transitions = controller.subscribe_transitions();
        controller.set_duration(1);
        controller.request_state(TimerState::Running);

        sleep(ms(1100)).await;
        assert_eq!(controller.remaining_seconds(), 0);
        // Paused is refused once nothing remains
        assert!(!controller.request_state(TimerState::Paused));
        assert!(controller.request_state(TimerState::Stopped));

        sleep(ms(1000)).await;
        let mut seen = Vec::new();
        while let Ok(change) = transitions.try_recv() {
            seen.push(change);
        }
        assert_eq!(
            seen,
            vec![
                StateChange { from: TimerState::Stopped, to: TimerState::Running },
                StateChange { from: TimerState::Running, to: TimerState::Stopped },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_pause_request_is_noop() {
        let controller = CountdownController::default();
        let mut transitions = controller.subscribe_transitions();
        controller.set_duration(10);
        controller.request_state(TimerState::Running);
        sleep(ms(2500)).await;
        assert!(controller.request_state(TimerState::Paused));

        let mut snapshots = controller.subscribe();
        assert!(!controller.request_state(TimerState::Paused));
        assert!(!snapshots.has_changed().unwrap());
        assert_eq!(controller.state(), TimerState::Paused);
        assert_eq!(controller.remaining_seconds(), 8);

        let mut seen = Vec::new();
        while let Ok(change) = transitions.try_recv() {
            seen.push(change.to);
        }
        assert_eq!(seen, vec![TimerState::Running, TimerState::Paused]);
        controller.request_state(TimerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn apply_entry_ignored_unless_stopped() {
        let controller = CountdownController::default();
        controller.set_duration(90);
        controller.request_state(TimerState::Paused);
        assert!(!controller.apply_entry(ClockField::Minutes, "5"));
        assert_eq!(controller.total_seconds(), 90);
        assert_eq!(controller.remaining_seconds(), 90);
    }

    #[tokio::test(start_paused = true)]
    async fn apply_entry_edits_one_field() {
        let controller = CountdownController::default();
        controller.set_duration(90);
        assert!(controller.apply_entry(ClockField::Seconds, "75"));
        assert_eq!(controller.total_seconds(), 65);
        assert!(controller.apply_entry(ClockField::Hours, "2"));
        assert_eq!(controller.total_seconds(), 2 * 3600 + 65);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_timing() {
        let controller = CountdownController::new(ControllerConfig {
            tick: ms(100),
            grace: ms(50),
        });
        controller.set_duration(2);
        controller.request_state(TimerState::Running);

        sleep(ms(210)).await;
        assert_eq!(controller.remaining_seconds(), 0);
        sleep(ms(50)).await;
        assert_eq!(controller.state(), TimerState::Stopped);
    }
}
