//! Error types for the blockscript engine
//!
//! Domain errors use thiserror. The `Stop`/`CooldownExceeded` variants are
//! intentional control flow raised by blocks, not bug signals: the
//! interpreter loop intercepts them and converts them into a truncated body.

use thiserror::Error;

use crate::interpreter::Response;

/// Boxed error type accepted from host-written blocks and adapters.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience result alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while processing a block script.
#[derive(Debug, Error)]
pub enum Error {
    /// The cumulative substituted output exceeded the configured character
    /// budget. Fatal; propagates to the caller.
    #[error("interpreter workload exceeded: {attempted}/{limit} characters")]
    WorkloadExceeded {
        /// Characters attempted, including the substitution that overflowed.
        attempted: usize,
        /// The configured character budget.
        limit: usize,
    },

    /// Malformed input to the embed block's attribute handlers.
    #[error("failed to parse embed: {0}")]
    EmbedParse(String),

    /// An unexpected error was raised inside a block or adapter mid-pass.
    /// Carries the partial response so the caller can inspect whatever was
    /// resolved before the failure.
    #[error("block processing failed: {source}")]
    Process {
        /// The original error raised by the block or adapter.
        source: BoxedError,
        /// The incomplete response that was being built.
        response: Box<Response>,
    },

    /// Raised by the stop block to end the pass early. The message is
    /// user-facing output, not a system failure.
    #[error("{message}")]
    Stop {
        /// Text that becomes the tail of the truncated body.
        message: String,
    },

    /// Raised by the cooldown block when a keyed rate limit is breached.
    #[error("{message}")]
    CooldownExceeded {
        /// Text that becomes the tail of the truncated body.
        message: String,
        /// The bucket key that reached its cooldown.
        key: String,
        /// Seconds left until the cooldown ends.
        retry_after: f64,
    },

    /// Escape hatch for failures inside host-written blocks. This is the
    /// only variant `process` wraps into [`Error::Process`].
    #[error("unexpected block error: {0}")]
    Unexpected(#[source] BoxedError),
}

impl Error {
    /// Wrap an arbitrary error raised inside a block or adapter.
    pub fn unexpected(error: impl Into<BoxedError>) -> Self {
        Error::Unexpected(error.into())
    }

    /// The user-facing message when this error is a stop-class failure.
    ///
    /// Stop-class failures truncate the pass instead of propagating.
    pub fn stop_message(&self) -> Option<&str> {
        match self {
            Error::Stop { message } | Error::CooldownExceeded { message, .. } => Some(message),
            _ => None,
        }
    }
}
