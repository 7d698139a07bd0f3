//! Domain-specific error types for lumigrid.
//!
//! All fallible operations return `Result<T, LumigridError>`.
//! Per-frame failures (timeouts, truncated transfers, bad dimensions)
//! are *not* errors — they are classified drop reasons carried by
//! [`FrameOutcome`](crate::receiver::FrameOutcome). Only conditions
//! that should abort or escalate use this type.

use std::time::Duration;
use thiserror::Error;

/// The canonical error type for lumigrid.
#[derive(Debug, Error)]
pub enum LumigridError {
    /// A byte slice was too short to hold the structure it claims to be.
    #[error("invalid header: expected {expected} bytes, got {actual}")]
    HeaderTooShort { expected: usize, actual: usize },

    /// The TCP/IO layer reported an error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// An operation exceeded its deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// Binding or configuring the listening socket failed. Fatal:
    /// the serve loop is never entered.
    #[error("listener setup failed on {addr}: {source}")]
    ListenerSetup {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The display driver could not present a buffer.
    #[error("display error: {0}")]
    Display(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = LumigridError::HeaderTooShort {
            expected: 8,
            actual: 3,
        };
        assert!(e.to_string().contains("8"));
        assert!(e.to_string().contains("3"));

        let e = LumigridError::Timeout(Duration::from_secs(5));
        assert!(e.to_string().contains("5"));
    }

    #[test]
    fn from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broke");
        let e: LumigridError = io_err.into();
        assert!(matches!(e, LumigridError::Connection(_)));
    }
}
