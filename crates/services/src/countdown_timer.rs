use std::time::Duration;

use prep_core::Countdown;
use prep_core::model::LearningMode;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::info;

/// Background countdown for timed attempts.
///
/// Ticks a `Countdown` once per period and publishes each value. The task
/// stops when time runs out, on `cancel`, or when the timer is dropped.
pub struct CountdownTimer {
    state: watch::Receiver<Countdown>,
    task: JoinHandle<()>,
}

impl CountdownTimer {
    /// Start a one-second countdown if `mode` is timed.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(mode: LearningMode, limit_secs: u32) -> Option<Self> {
        mode.is_timed()
            .then(|| Self::start_with_period(limit_secs, Duration::from_secs(1)))
    }

    #[must_use]
    pub fn start_with_period(limit_secs: u32, period: Duration) -> Self {
        let countdown = Countdown::new(limit_secs);
        let (tx, state) = watch::channel(countdown);
        let task = tokio::spawn(run(countdown, period, tx));
        Self { state, task }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Countdown> {
        self.state.clone()
    }

    #[must_use]
    pub fn remaining(&self) -> Countdown {
        *self.state.borrow()
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.state.borrow().is_expired()
    }

    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(mut countdown: Countdown, period: Duration, tx: watch::Sender<Countdown>) {
    if countdown.is_expired() {
        return;
    }
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let expired = countdown.tick();
        tx.send_replace(countdown);
        if expired {
            info!("time limit reached");
            return;
        }
    }
}
