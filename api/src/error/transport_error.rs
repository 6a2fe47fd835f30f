//! Transport-level faults.

use thiserror::Error;

/// Faults raised by a [`Transport`](crate::transport::Transport).
///
/// The pipeline converts every variant except [`TransportError::Abort`]
/// into a synthetic failed response, so that status-based handling stays
/// the single failure channel for callers. `Abort` is the allow-listed
/// kind: it propagates out of the call unchanged.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed due to network or protocol error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A file parameter could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-defined failure with an explicit status.
    #[error("{message}")]
    Failed {
        /// Status to report on the synthetic response.
        status: u16,
        /// Description of the failure.
        message: String,
    },

    /// Control-flow signal that must reach the caller untouched.
    #[error("Transport aborted: {0}")]
    Abort(String),
}

impl TransportError {
    /// Returns `true` if this fault must propagate instead of being
    /// converted into a failed response.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Abort(_))
    }

    /// Status reported on the synthetic response; 0 when the fault carries none.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()).unwrap_or(0),
            Self::Failed { status, .. } => *status,
            Self::Io(_) | Self::Abort(_) => 0,
        }
    }
}
