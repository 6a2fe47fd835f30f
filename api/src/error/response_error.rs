//! Non-success response error.

use thiserror::Error;

use crate::transport::TransportResponse;

/// The transport returned a non-2xx status.
///
/// Carries the complete response so callers can branch on status and
/// content. Transport faults converted into synthetic responses arrive
/// through this same channel.
#[derive(Debug, Error)]
#[error("Response status is {}; {}", .response.status, .response.content)]
pub struct ApiResponseError {
    response: TransportResponse,
}

impl ApiResponseError {
    pub fn new(response: TransportResponse) -> Self {
        Self { response }
    }

    /// The HTTP status (or synthetic status for converted faults).
    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn response(&self) -> &TransportResponse {
        &self.response
    }

    pub fn into_response(self) -> TransportResponse {
        self.response
    }

    /// Returns `true` for 5xx statuses.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.response.status)
    }
}
