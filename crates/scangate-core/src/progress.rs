//! Progress-rate math shared by the engine's progress reporter
//!
//! Uses a direct `completed / elapsed` rate rather than the EWMA smoothing
//! `prtip-core::progress::ProgressCalculator` uses elsewhere in the pack —
//! this scan engine publishes a sample every ~100ms, frequently enough that
//! smoothing is unnecessary and would only mask a genuine rate-limit cap.
//! The floor below guards against dividing by a near-zero elapsed duration.

use crate::events::ProgressEvent;
use std::time::Duration;

/// Smallest elapsed duration used as the rate denominator, so a sample
/// taken in the first instant of a scan doesn't divide by zero.
pub const MIN_ELAPSED: Duration = Duration::from_millis(1);

/// Build a `ProgressEvent` from raw counters, clamping `completed` to
/// `total` and flooring `elapsed` so the rate never divides by zero.
pub fn compute_progress(total: u64, completed: u64, elapsed: Duration) -> ProgressEvent {
    let completed = completed.min(total);
    let elapsed = elapsed.max(MIN_ELAPSED);
    let rate = completed as f64 / elapsed.as_secs_f64();
    ProgressEvent {
        total,
        completed,
        rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_completed_to_total() {
        let progress = compute_progress(10, 15, Duration::from_secs(1));
        assert_eq!(progress.completed, 10);
    }

    #[test]
    fn floors_elapsed_to_avoid_division_by_zero() {
        let progress = compute_progress(100, 5, Duration::ZERO);
        assert!(progress.rate.is_finite());
        assert!(progress.rate > 0.0);
    }

    #[test]
    fn rate_is_completed_over_elapsed_seconds() {
        let progress = compute_progress(100, 50, Duration::from_secs(2));
        assert!((progress.rate - 25.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_zero_completed_is_zero_rate() {
        let progress = compute_progress(0, 0, Duration::from_secs(1));
        assert_eq!(progress.total, 0);
        assert_eq!(progress.completed, 0);
        assert_eq!(progress.rate, 0.0);
    }
}
