//! Rate Gate: a single global token source shared by every worker
//!
//! One token is released per tick of `1s / rate_limit`, with no burst
//! credit beyond the one buffered token, and `acquire` is cancellable.
//! `rate_limit == 0` disables the gate entirely (`acquire` becomes a
//! no-op).
//!
//! This deliberately does not reach for the `governor` token-bucket crate
//! the teacher uses elsewhere (`prtip-scanner::rate_limiter`): governor's
//! quota model allows configurable burst sizes and doesn't expose a
//! joinable/stoppable timer, whereas this engine only needs a single
//! shared tick source that tears down cleanly on engine teardown — a
//! `tokio::time::Interval` behind an async mutex gives that directly,
//! with no background task to leak.

use scangate_core::Error;
use tokio::sync::Mutex;
use tokio::time::{self, Duration, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Global probe-initiation rate limiter.
pub struct RateGate {
    ticker: Option<Mutex<Interval>>,
}

impl RateGate {
    /// Build a gate. `rate_limit == 0` disables throttling.
    pub fn new(rate_limit: u32) -> Self {
        let ticker = (rate_limit > 0).then(|| {
            let period = Duration::from_secs_f64(1.0 / rate_limit as f64);
            let mut interval = time::interval(period);
            // Delay (not Burst) is what keeps "at most one token buffered":
            // a stalled consumer never accumulates catch-up ticks.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Mutex::new(interval)
        });
        Self { ticker }
    }

    /// Block until a token is available or `cancel` fires.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), Error> {
        let Some(ticker) = &self.ticker else {
            return Ok(());
        };
        let mut guard = ticker.lock().await;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            _ = guard.tick() => Ok(()),
        }
    }

    pub fn is_limited(&self) -> bool {
        self.ticker.is_some()
    }
}
