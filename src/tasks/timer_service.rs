//! Schedulable timers that the countdown controller drives its ticks from

use std::time::Duration;
use tokio::{
    task::JoinHandle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

/// Shortest period a repeating timer will run with
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Returned by a repeating callback to keep or end its loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Continue,
    Stop,
}

/// Handle to a scheduled timer
pub trait TimerHandle: Send {
    /// Prevent any further firing of this timer
    fn cancel(&mut self);
}

/// Host-provided timer capability
pub trait TimerService: Send + Sync {
    /// Fire `on_fire` every `period`, first one `period` from now, until it
    /// returns [`Repeat::Stop`] or the handle is cancelled.
    ///
    /// A zero `period` runs as [`MIN_PERIOD`].
    fn repeat(
        &self,
        period: Duration,
        on_fire: Box<dyn FnMut() -> Repeat + Send>,
    ) -> Box<dyn TimerHandle>;

    /// Fire `on_fire` once after `delay` unless the handle is cancelled first
    fn once(&self, delay: Duration, on_fire: Box<dyn FnOnce() + Send>) -> Box<dyn TimerHandle>;
}

/// [`TimerService`] backed by the tokio runtime
///
/// Must be used from within a tokio runtime context.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimerService;

impl TokioTimerService {
    pub fn new() -> Self {
        Self
    }
}

/// Aborts the spawned timer task on cancel
#[derive(Debug)]
pub struct TokioTimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle for TokioTimerHandle {
    fn cancel(&mut self) {
        self.task.abort();
    }
}

impl TimerService for TokioTimerService {
    fn repeat(
        &self,
        period: Duration,
        mut on_fire: Box<dyn FnMut() -> Repeat + Send>,
    ) -> Box<dyn TimerHandle> {
        let period = if period.is_zero() {
            warn!("Zero timer period, using {}ms", MIN_PERIOD.as_millis());
            MIN_PERIOD
        } else {
            period
        };
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            // A late tick must not be followed by a burst of catch-up ticks
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if on_fire() == Repeat::Stop {
                    debug!("Repeating timer finished");
                    break;
                }
            }
        });
        Box::new(TokioTimerHandle { task })
    }

    fn once(&self, delay: Duration, on_fire: Box<dyn FnOnce() + Send>) -> Box<dyn TimerHandle> {
        let task = tokio::spawn(async move {
            sleep(delay).await;
            on_fire();
        });
        Box::new(TokioTimerHandle { task })
    }
}
