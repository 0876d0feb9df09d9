//! Progress Reporter: periodic `Progress` events on the bus.
//!
//! Grounded on the teacher's `prtip-scanner::scheduler::ProgressTracker`,
//! which publishes on a fixed tick while a scan runs — this version ticks
//! every 100ms and uses `scangate_core::compute_progress`'s raw rate
//! instead of the teacher's EWMA-smoothed throughput.

use scangate_core::{compute_progress, Event};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_millis(100);

/// Publish a `Progress` event every tick until `completed >= total` or
/// `cancel` fires, then publish one final sample and return.
pub async fn run(
    total: u64,
    completed: Arc<AtomicU64>,
    events: mpsc::Sender<Event>,
    cancel: CancellationToken,
) {
    let start = Instant::now();
    let mut ticker = interval(TICK);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                publish(total, &completed, start, &events).await;
                return;
            }
            _ = ticker.tick() => {
                let done = completed.load(Ordering::Relaxed);
                publish(total, &completed, start, &events).await;
                if done >= total {
                    return;
                }
            }
        }
    }
}

async fn publish(total: u64, completed: &Arc<AtomicU64>, start: Instant, events: &mpsc::Sender<Event>) {
    let progress = compute_progress(total, completed.load(Ordering::Relaxed), start.elapsed());
    let _ = events.send(Event::Progress(progress)).await;
}
