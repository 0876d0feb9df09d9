//! Worker: one fixed task per pool slot, looping on a shared queue.
//!
//! A fixed pool draining a shared queue, not a task spawned per job.
//! Grounded on `examples/other_examples/dd960222_thomas0903-lan-scan-rs`'s
//! `scanner.rs`, which pairs a `CancellationToken` with a bounded number of
//! long-lived tasks pulling from a queue via `tokio::select!` — the same
//! shape as `tokio::task::JoinSet` used here for lifecycle tracking.

use crate::feeder::Job;
use crate::retry::RetryLoop;
use scangate_core::{Event, Protocol, ResultEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// A job queue shared by every worker in one protocol's pool. `mpsc::Receiver`
/// isn't `Clone`, so a fixed number of long-lived workers take turns locking
/// it — contention is negligible next to the I/O each job performs.
pub type SharedJobQueue = Arc<AsyncMutex<mpsc::Receiver<Job>>>;

/// Desired TCP worker count. `0` auto-scales from the CPU count, following
/// the teacher's `adaptive_parallelism::calculate_parallelism` tiering —
/// generous because these are lightweight async tasks, not OS threads.
pub fn tcp_worker_count(configured: usize) -> usize {
    if configured == 0 {
        (num_cpus::get() * 25).clamp(20, 1000)
    } else {
        configured
    }
}

/// UDP worker count as a fraction of the TCP count. A ratio of `0.0` still
/// runs exactly one worker, rather than disabling UDP scanning outright.
pub fn udp_worker_count(tcp_workers: usize, ratio: f64) -> usize {
    if ratio <= 0.0 {
        1
    } else {
        ((tcp_workers as f64) * ratio).ceil().max(1.0) as usize
    }
}

/// Drain `jobs` until the channel closes or `cancel` fires, running each
/// job through `retry` and publishing a `ResultEvent` for every job that
/// wasn't abandoned to cancellation.
pub async fn run_worker(
    protocol: Protocol,
    jobs: SharedJobQueue,
    retry: Arc<RetryLoop>,
    events: mpsc::Sender<Event>,
    completed: Arc<AtomicU64>,
    cancel: CancellationToken,
) {
    loop {
        let received = {
            let mut guard = jobs.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                job = guard.recv() => job,
            }
        };
        let job = match received {
            Some(job) => job,
            None => {
                debug!(%protocol, "job queue drained, worker exiting");
                break;
            }
        };

        trace!(%protocol, host = %job.host, port = job.port, "job received");

        let Some(outcome) = retry.run(&job.host, job.port, protocol, &cancel).await else {
            // Cancelled mid-attempt: abandon the job silently, no event published.
            trace!(%protocol, host = %job.host, port = job.port, "job abandoned on cancellation");
            continue;
        };

        trace!(%protocol, host = %job.host, port = job.port, state = ?outcome.state, "job classified");

        let result = ResultEvent::new(job.host, job.port, protocol, outcome.state)
            .with_banner(outcome.banner)
            .with_duration(outcome.duration);

        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = events.send(Event::Result(result)) => result.is_ok(),
        };
        if !sent {
            debug!(%protocol, "event bus closed, worker exiting");
            break;
        }
        completed.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_configured_workers_auto_scales_within_bounds() {
        let count = tcp_worker_count(0);
        assert!(count >= 20 && count <= 1000);
    }

    #[test]
    fn nonzero_configured_workers_passes_through() {
        assert_eq!(tcp_worker_count(42), 42);
    }

    #[test]
    fn zero_udp_ratio_still_runs_one_worker() {
        assert_eq!(udp_worker_count(100, 0.0), 1);
    }

    #[test]
    fn udp_ratio_scales_from_tcp_count() {
        assert_eq!(udp_worker_count(100, 0.5), 50);
        assert_eq!(udp_worker_count(10, 0.25), 3); // ceil(2.5)
    }
}
