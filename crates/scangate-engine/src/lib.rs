//! scangate-engine: the concurrent TCP/UDP port scanning engine
//!
//! Wires together a bounded worker pool, a shared rate gate, a retrying
//! probe executor, and a typed event stream behind one `Engine` handle.
//! See `scangate_core` for the shared vocabulary (`ScanTarget`, `Event`,
//! `EngineConfig`) this crate builds on.
//!
//! # Examples
//!
//! ```no_run
//! use scangate_core::EngineConfig;
//! use scangate_engine::Engine;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> scangate_core::Result<()> {
//! let engine = Engine::new(EngineConfig::default())?;
//! let mut events = engine.events();
//! let cancel = CancellationToken::new();
//!
//! let scan = engine.scan_range(cancel, "127.0.0.1", vec![22, 80, 443]);
//! tokio::pin!(scan);
//!
//! loop {
//!     tokio::select! {
//!         result = &mut scan => { result?; break; }
//!         Some(event) = events.recv() => { println!("{event:?}"); }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod engine;
pub mod executor;
pub mod feeder;
pub mod probe_catalog;
pub mod probe_stats;
pub mod progress_reporter;
pub mod rate_gate;
pub mod retry;
pub mod worker;

pub use engine::Engine;
pub use probe_catalog::ProbeCatalog;
pub use probe_stats::{ProbeStats, ProbeStatsTable};
pub use rate_gate::RateGate;
