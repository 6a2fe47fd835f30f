//! Layered error types for the API caller.
//!
//! The error hierarchy is structured for actionable diagnostics:
//! - [`ApiError`] - Top-level error type returned by every call
//! - [`ConfigError`] - Unknown cases/endpoints and invalid configuration
//! - [`RequestError`] - Missing or mistyped call parameters
//! - [`ApiResponseError`] - Non-2xx responses, carrying the full response
//! - [`CodecError`] - Serialization and typed deserialization failures
//! - [`TransportError`] - Faults raised by a transport implementation

mod api_error;
mod codec_error;
mod config_error;
mod request_error;
mod response_error;
mod transport_error;

pub use api_error::ApiError;
pub use codec_error::CodecError;
pub use config_error::ConfigError;
pub use request_error::RequestError;
pub use response_error::ApiResponseError;
pub use transport_error::TransportError;
