//! scangate-core: shared types for the scangate scan engine
//!
//! This crate holds the data model, with no networking
//! dependencies: the `Event` union published on the engine's bus, the
//! `EngineConfig` options, and the `ScanTarget`/`Protocol`/`ScanState`
//! vocabulary both the engine and its future external consumers (a CLI,
//! a TUI, an exporter) share.
//!
//! # Examples
//!
//! ```
//! use scangate_core::{EngineConfig, ScanTarget};
//!
//! let target = ScanTarget::new("127.0.0.1", vec![22, 80, 443]);
//! let config = EngineConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(target.port_count(), 3);
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod progress;
pub mod types;

pub use config::{EngineConfig, ScanProtocols};
pub use error::{Error, Result};
pub use events::{ErrorKind, Event, ProgressEvent, ResultEvent};
pub use progress::compute_progress;
pub use types::{Protocol, ScanState, ScanTarget};
