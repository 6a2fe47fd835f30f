//! Transport collaborator.
//!
//! The pipeline hands a fully assembled [`TransportRequest`] to a
//! [`Transport`] and receives a [`TransportResponse`] back. Raw HTTP
//! execution, body encoding and response decoding all live behind this
//! trait; [`HttpTransport`] is the reqwest implementation.

mod http;

use std::fmt;
use std::future::Future;

use bytes::Bytes;
use serde_json::Value;

use crate::codec::TypedValue;
use crate::error::TransportError;
use crate::method::RestMethod;
use crate::value::{Headers, ParamMap};

pub use http::{HttpTransport, HttpTransportBuilder};

/// Executes assembled requests.
///
/// Implementations own every I/O concern: encoding, timeouts, connection
/// reuse. The pipeline never retries.
///
/// ## Examples
///
/// ```rust,ignore
/// use api_caller::transport::{Transport, TransportRequest, TransportResponse};
/// use api_caller::error::TransportError;
///
/// struct Canned;
///
/// impl Transport for Canned {
///     async fn execute(&self, _: &TransportRequest) -> Result<TransportResponse, TransportError> {
///         Ok(TransportResponse::text(200, "canned"))
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: &TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// A request as handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Absolute URL: domain followed by the built path.
    pub url: String,
    pub method: RestMethod,
    /// Body parameters; sent as the query string for GET and DELETE.
    pub body: ParamMap,
    pub headers: Headers,
    /// Raw `Cookie` header value.
    pub cookies: Option<String>,
    pub files: ParamMap,
}

impl TransportRequest {
    pub fn new(url: impl Into<String>, method: RestMethod) -> Self {
        Self {
            url: url.into(),
            method,
            body: ParamMap::new(),
            headers: Headers::new(),
            cookies: None,
            files: ParamMap::new(),
        }
    }
}

/// Content of a response.
#[derive(Debug, Clone)]
pub enum ResponseContent {
    /// Text body, decoded as lossy UTF-8.
    Text(String),
    /// Downloadable attachment, kept as raw bytes.
    Binary(Bytes),
    /// Body parsed from an `application/json` response.
    Json(Value),
    /// Body cast into an endpoint's declared response type.
    Typed(TypedValue),
}

impl ResponseContent {
    /// Textual form of the content as it travelled on the wire.
    ///
    /// JSON content is re-serialized; binary content is decoded lossily;
    /// typed content renders as its type name.
    pub fn to_wire_string(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Self::Json(value) => value.to_string(),
            Self::Typed(typed) => format!("<{}>", typed.type_name()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_typed(&self) -> Option<&TypedValue> {
        match self {
            Self::Typed(typed) => Some(typed),
            _ => None,
        }
    }
}

impl fmt::Display for ResponseContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire_string())
    }
}

impl From<String> for ResponseContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ResponseContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for ResponseContent {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Status and content returned by a transport.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub content: ResponseContent,
}

impl TransportResponse {
    pub fn new(status: u16, content: impl Into<ResponseContent>) -> Self {
        Self {
            status,
            content: content.into(),
        }
    }

    /// A `200` response.
    pub fn ok(content: impl Into<ResponseContent>) -> Self {
        Self::new(200, content)
    }

    pub fn text(status: u16, text: impl Into<String>) -> Self {
        Self::new(status, ResponseContent::Text(text.into()))
    }

    /// Synthetic response standing in for a transport fault.
    pub fn from_fault(error: &TransportError) -> Self {
        Self::text(error.status_code(), format!("Transport error: {error}"))
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Downcasts typed content to `T`.
    pub fn typed<T: std::any::Any>(&self) -> Option<&T> {
        self.content.as_typed().and_then(|typed| typed.downcast_ref::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_ok_range() {
        assert!(TransportResponse::ok("x").is_ok());
        assert!(TransportResponse::text(204, "").is_ok());
        assert!(!TransportResponse::text(199, "").is_ok());
        assert!(!TransportResponse::text(301, "").is_ok());
        assert!(!TransportResponse::text(0, "").is_ok());
    }

    #[test]
    fn test_wire_string() {
        assert_eq!(ResponseContent::from("raw").to_wire_string(), "raw");
        assert_eq!(
            ResponseContent::from(json!({ "a": [1, 2] })).to_wire_string(),
            r#"{"a":[1,2]}"#
        );
        assert_eq!(
            ResponseContent::Binary(Bytes::from_static(b"file")).to_wire_string(),
            "file"
        );
        let typed = ResponseContent::Typed(TypedValue::new("Foo", 1u8));
        assert_eq!(typed.to_string(), "<Foo>");
    }

    #[test]
    fn test_typed_accessor() {
        let response = TransportResponse::ok(ResponseContent::Typed(TypedValue::new(
            "Names",
            vec!["some casted value".to_string()],
        )));
        assert_eq!(
            response.typed::<Vec<String>>(),
            Some(&vec!["some casted value".to_string()])
        );
        assert!(response.typed::<String>().is_none());
    }

    #[test]
    fn test_from_fault() {
        let fault = TransportError::Failed {
            status: 503,
            message: "upstream closed".to_string(),
        };
        let response = TransportResponse::from_fault(&fault);
        assert_eq!(response.status, 503);
        assert_eq!(
            response.content.as_text(),
            Some("Transport error: upstream closed")
        );
    }
}
