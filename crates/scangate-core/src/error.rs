//! Error types for the scangate core library

use thiserror::Error;

/// Result type alias for scangate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the engine's public API.
///
/// Per-probe failures (timeouts, refused connections, unreachable hosts)
/// are never represented here — they are recovered locally by the
/// [`crate::events::Event`] classification pipeline and published as
/// `Result` events instead. This type only covers configuration and setup
/// failures that prevent a scan from starting at all.
#[derive(Error, Debug)]
pub enum Error {
    /// Engine configuration failed validation
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error unrelated to a specific probe (e.g. socket setup)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cancellation signalled while waiting on a suspension point
    #[error("operation cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_message() {
        let err = Error::Config("workers must be >= 0".to_string());
        assert_eq!(err.to_string(), "configuration error: workers must be >= 0");
    }

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
