//! The typed event union published on the engine's event bus
//!
//! `Event` is the only shape ever sent on the bus; raw result structs never
//! go out directly. Consumers dispatch on the tag; each variant carries
//! exactly the fields its external consumer (CSV/JSON exporter, terminal UI)
//! needs to render a row without going back to the engine for more context.

use crate::types::{Protocol, ScanState};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of probing a single (host, port) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEvent {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub state: ScanState,
    /// Empty unless `state == Open` and banner grabbing produced output
    pub banner: String,
    /// Wall-clock duration of the final attempt (not the sum of retries)
    pub duration: Duration,
}

impl ResultEvent {
    pub fn new(host: impl Into<String>, port: u16, protocol: Protocol, state: ScanState) -> Self {
        Self {
            host: host.into(),
            port,
            protocol,
            state,
            banner: String::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn with_banner(mut self, banner: String) -> Self {
        self.banner = banner;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Periodic snapshot of scan completion, sampled by the progress reporter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub total: u64,
    pub completed: u64,
    /// Completed probes per second of active scan time
    pub rate: f64,
}

/// Catastrophic, non-per-probe failure the engine chooses to surface.
///
/// Ordinary socket errors are never represented here — they're recovered
/// locally into `ResultEvent`s. This variant exists for conditions worth
/// reporting before the bus closes (e.g. the job feeder itself failing to
/// enumerate targets).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorKind {
    pub message: String,
}

impl ErrorKind {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Tagged union of everything the engine publishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    Result(ResultEvent),
    Progress(ProgressEvent),
    Error(ErrorKind),
}

impl From<ResultEvent> for Event {
    fn from(value: ResultEvent) -> Self {
        Event::Result(value)
    }
}

impl From<ProgressEvent> for Event {
    fn from(value: ProgressEvent) -> Self {
        Event::Progress(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_event_defaults_to_empty_banner() {
        let event = ResultEvent::new("127.0.0.1", 80, Protocol::Tcp, ScanState::Open);
        assert!(event.banner.is_empty());
        assert_eq!(event.duration, Duration::ZERO);
    }

    #[test]
    fn event_round_trips_through_json() {
        let event: Event = ResultEvent::new("10.0.0.1", 53, Protocol::Udp, ScanState::Filtered)
            .with_banner(String::new())
            .into();
        let json = serde_json::to_string(&event).unwrap();
        let decoded: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn progress_event_is_copy() {
        let p = ProgressEvent {
            total: 10,
            completed: 5,
            rate: 2.5,
        };
        let p2 = p;
        assert_eq!(p.completed, p2.completed);
    }
}
