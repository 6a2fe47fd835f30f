//! Top-level API error type.

use super::{ApiResponseError, CodecError, ConfigError, RequestError, TransportError};
use thiserror::Error;

/// Top-level error type for all API caller operations.
///
/// This enum aggregates all error categories, enabling unified error handling
/// while preserving the ability to match on specific error types when needed.
///
/// ## Examples
///
/// ```rust,ignore
/// use api_caller::error::ApiError;
///
/// fn handle_error(err: ApiError) {
///     match err {
///         ApiError::Config(e) => eprintln!("Configuration error: {e}"),
///         ApiError::Request(e) => eprintln!("Bad call: {e}"),
///         ApiError::Response(e) => eprintln!("Server said {}: {e}", e.status()),
///         ApiError::Codec(e) => eprintln!("Codec failure: {e}"),
///         ApiError::Transport(e) => eprintln!("Transport aborted: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown case or endpoint, or invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Missing or mistyped call parameters.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The server (or a converted transport fault) returned a non-2xx status.
    #[error(transparent)]
    Response(#[from] ApiResponseError),

    /// Serialization of inputs or typed deserialization of the response failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A transport fault of an allow-listed kind that is never converted
    /// into a synthetic response.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ApiError {
    /// Returns the HTTP status code when this is a response error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.status()),
            _ => None,
        }
    }
}
