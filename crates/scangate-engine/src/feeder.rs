//! Job Feeder: fans target/port pairs into the protocol job queues.
//!
//! Grounded on the teacher's `prtip-scanner::scheduler::ScanScheduler`,
//! which owns the analogous "walk targets, hand work to workers" role,
//! generalized here to push into one queue per active protocol instead of
//! one combined queue (see DESIGN.md's note on "shared job queue").

use scangate_core::ScanTarget;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One (host, port) unit of work. Created by the feeder, consumed by
/// exactly one worker, never shared.
#[derive(Debug, Clone)]
pub struct Job {
    pub host: String,
    pub port: u16,
}

/// Push every (host, port) pair in `targets` onto `tcp_tx` and/or `udp_tx`
/// (whichever is `Some`), stopping early if `cancel` fires mid-send.
///
/// Closing both channels (by dropping the senders on return) is what lets
/// worker loops notice there's no more work and exit.
pub async fn feed(
    targets: &[ScanTarget],
    tcp_tx: Option<mpsc::Sender<Job>>,
    udp_tx: Option<mpsc::Sender<Job>>,
    cancel: &CancellationToken,
) {
    'targets: for target in targets {
        for &port in &target.ports {
            let job = Job {
                host: target.host.clone(),
                port,
            };
            if let Some(tx) = &tcp_tx {
                if send_cancellable(tx, job.clone(), cancel).await.is_err() {
                    break 'targets;
                }
            }
            if let Some(tx) = &udp_tx {
                if send_cancellable(tx, job, cancel).await.is_err() {
                    break 'targets;
                }
            }
        }
    }
}

async fn send_cancellable(tx: &mpsc::Sender<Job>, job: Job, cancel: &CancellationToken) -> Result<(), ()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(()),
        result = tx.send(job) => result.map_err(|_| ()),
    }
}
