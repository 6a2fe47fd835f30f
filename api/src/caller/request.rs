//! Call inputs: endpoint selection, values and per-call options.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::context::RequestListener;
use crate::error::CodecError;
use crate::value::{Headers, ParamMap};

/// Which endpoint to call, optionally with inline path values.
///
/// Inline path values take precedence over every other source when
/// placeholders are substituted, and satisfy path-only placeholders during
/// validation without reaching the body.
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointSelector {
    Name(String),
    WithPath(String, ParamMap),
}

impl EndpointSelector {
    pub fn with_path(name: impl Into<String>, path_values: ParamMap) -> Self {
        Self::WithPath(name.into(), path_values)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::WithPath(name, _) => name,
        }
    }

    pub(crate) fn into_parts(self) -> (String, ParamMap) {
        match self {
            Self::Name(name) => (name, ParamMap::new()),
            Self::WithPath(name, values) => (name, values),
        }
    }
}

impl From<&str> for EndpointSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for EndpointSelector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<(&str, ParamMap)> for EndpointSelector {
    fn from((name, values): (&str, ParamMap)) -> Self {
        Self::WithPath(name.to_string(), values)
    }
}

impl From<(String, ParamMap)> for EndpointSelector {
    fn from((name, values): (String, ParamMap)) -> Self {
        Self::WithPath(name, values)
    }
}

/// Input values of one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestValues {
    /// No values.
    #[default]
    Empty,
    /// An already flat parameter map.
    Map(ParamMap),
    /// A structured value, flattened through the codec before validation.
    /// `null` flattens to an empty map.
    Object(Value),
}

impl RequestValues {
    /// Captures any serializable value as a structured input.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use api_caller::caller::RequestValues;
    ///
    /// #[derive(serde::Serialize)]
    /// struct Search { q: &'static str, page: u32 }
    ///
    /// let values = RequestValues::object(&Search { q: "rust", page: 2 }).unwrap();
    /// assert!(matches!(values, RequestValues::Object(_)));
    /// ```
    pub fn object<T: Serialize + ?Sized>(value: &T) -> Result<Self, CodecError> {
        Ok(Self::Object(serde_json::to_value(value)?))
    }
}

impl From<ParamMap> for RequestValues {
    fn from(values: ParamMap) -> Self {
        Self::Map(values)
    }
}

impl From<Option<ParamMap>> for RequestValues {
    fn from(values: Option<ParamMap>) -> Self {
        values.map_or(Self::Empty, Self::Map)
    }
}

impl From<Value> for RequestValues {
    fn from(value: Value) -> Self {
        Self::Object(value)
    }
}

impl From<()> for RequestValues {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

/// Optional per-call settings.
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub(crate) listener: Option<Arc<dyn RequestListener>>,
    pub(crate) headers: Option<Headers>,
    pub(crate) domain: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes this call after dispatch.
    pub fn listener(mut self, listener: impl RequestListener + 'static) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// Shares an existing listener across calls.
    pub fn shared_listener(mut self, listener: Arc<dyn RequestListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Header overrides; these win over the endpoint's defaults.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Adds one header override.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sends this call to `domain` instead of the case's domain.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("listener", &self.listener.is_some())
            .field("headers", &self.headers)
            .field("domain", &self.domain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::method::RestMethod;
    use crate::transport::ResponseContent;

    #[test]
    fn test_selector_forms() {
        let plain: EndpointSelector = "list".into();
        assert_eq!(plain.name(), "list");
        assert_eq!(plain.into_parts(), ("list".to_string(), ParamMap::new()));

        let path = ParamMap::from([("id".to_string(), 7.into())]);
        let with_path: EndpointSelector = ("get", path.clone()).into();
        assert_eq!(with_path.name(), "get");
        assert_eq!(with_path.into_parts().1, path);
    }

    #[test]
    fn test_values_forms() {
        assert_eq!(RequestValues::from(()), RequestValues::Empty);
        assert_eq!(RequestValues::from(None::<ParamMap>), RequestValues::Empty);
        assert_eq!(
            RequestValues::from(json!({ "a": 1 })),
            RequestValues::Object(json!({ "a": 1 }))
        );
    }

    #[test]
    fn test_options_builder() {
        let options = RequestOptions::new()
            .header("H1", "1")
            .header("H2", "2")
            .domain("http://other")
            .listener(|_: &str, _: &ParamMap, _: &ResponseContent, _: u16, _: RestMethod| {});

        let headers = options.headers.as_ref().unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(options.domain.as_deref(), Some("http://other"));
        assert_eq!(
            format!("{options:?}"),
            r#"RequestOptions { listener: true, headers: Some({"H1": "1", "H2": "2"}), domain: Some("http://other") }"#
        );
    }
}
