//! Endpoint definitions.
//!
//! An [`EndpointSpec`] is the immutable description of one named API
//! operation: its path template, HTTP method, parameter rules, default
//! headers and optional response type. Specs are normally produced by
//! [`Registry::resolve`](crate::registry::Registry::resolve) from
//! configuration, but can also be assembled directly with the `with_*`
//! methods.

use indexmap::IndexMap;
use serde_json::Value;
use strum::{Display, EnumString};

use crate::codec::WireFormat;
use crate::method::RestMethod;
use crate::path;
use crate::value::{Headers, ParamValue};

/// Kind a parameter value is required to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ValueKind {
    String,
    /// Whole numbers only.
    #[strum(to_string = "integer", serialize = "int")]
    Integer,
    /// Any JSON number.
    #[strum(to_string = "number", serialize = "float")]
    Number,
    #[strum(to_string = "boolean", serialize = "bool")]
    Boolean,
    Array,
    Object,
    /// A [`FileParam`](crate::value::FileParam).
    File,
}

impl ValueKind {
    /// Returns `true` if `value` is of this kind.
    pub fn matches(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (Self::File, ParamValue::File(_)) => true,
            (Self::String, ParamValue::Value(Value::String(_))) => true,
            (Self::Integer, ParamValue::Value(Value::Number(n))) => n.is_i64() || n.is_u64(),
            (Self::Number, ParamValue::Value(Value::Number(_))) => true,
            (Self::Boolean, ParamValue::Value(Value::Bool(_))) => true,
            (Self::Array, ParamValue::Value(Value::Array(_))) => true,
            (Self::Object, ParamValue::Value(Value::Object(_))) => true,
            _ => false,
        }
    }
}

/// Validation and routing rule for one named parameter.
///
/// A rule with no fields set still matters: the parameter becomes required
/// and is always routed to the body set, even when it also names a path
/// placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamRule {
    /// Value used when the caller supplies none.
    pub default: Option<Value>,
    /// Kind the supplied value must have.
    pub kind: Option<ValueKind>,
    /// Route the value to the file set.
    pub is_file: bool,
}

impl ParamRule {
    /// A required, untyped rule.
    pub fn required() -> Self {
        Self::default()
    }

    /// A rule routing the value to the file set.
    pub fn file() -> Self {
        Self {
            is_file: true,
            ..Self::default()
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Returns `true` if values governed by this rule go to the file set.
    pub fn routes_to_files(&self) -> bool {
        self.is_file || self.kind == Some(ValueKind::File)
    }
}

/// Declared response type of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSpec {
    /// Name the codec resolves the target type by.
    pub type_name: String,
    /// Wire format of the response body.
    pub format: WireFormat,
}

impl ResponseSpec {
    pub fn new(type_name: impl Into<String>, format: WireFormat) -> Self {
        Self {
            type_name: type_name.into(),
            format,
        }
    }
}

/// Immutable description of one named endpoint.
///
/// ## Examples
///
/// ```rust
/// use api_caller::{EndpointSpec, ParamRule, RestMethod};
///
/// let spec = EndpointSpec::new("upload", "/items/{id}/files/{slot}")
///     .with_method(RestMethod::Post)
///     .with_param("file", ParamRule::file());
///
/// assert_eq!(spec.path_params(), vec!["id", "slot"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSpec {
    name: String,
    title: Option<String>,
    path: String,
    method: RestMethod,
    params: IndexMap<String, ParamRule>,
    headers: Headers,
    response: Option<ResponseSpec>,
}

impl EndpointSpec {
    /// Creates a GET endpoint with no rules, headers or response type.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            path: path.into(),
            method: RestMethod::default(),
            params: IndexMap::new(),
            headers: Headers::new(),
            response: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_method(mut self, method: RestMethod) -> Self {
        self.method = method;
        self
    }

    /// Adds a parameter rule. Rules keep their insertion order.
    pub fn with_param(mut self, name: impl Into<String>, rule: ParamRule) -> Self {
        self.params.insert(name.into(), rule);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_response(mut self, response: ResponseSpec) -> Self {
        self.response = Some(response);
        self
    }

    /// Registry key of this endpoint.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable name from configuration, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Path template, possibly containing `{placeholder}` tokens.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> RestMethod {
        self.method
    }

    pub fn params(&self) -> &IndexMap<String, ParamRule> {
        &self.params
    }

    pub fn rule(&self, name: &str) -> Option<&ParamRule> {
        self.params.get(name)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn response(&self) -> Option<&ResponseSpec> {
        self.response.as_ref()
    }

    /// Placeholder names in the path template, in order of first appearance.
    pub fn path_params(&self) -> Vec<&str> {
        path::placeholders(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::value::FileParam;

    #[test]
    fn test_defaults() {
        let spec = EndpointSpec::new("list", "/items");
        assert_eq!(spec.name(), "list");
        assert_eq!(spec.method(), RestMethod::Get);
        assert!(spec.params().is_empty());
        assert!(spec.headers().is_empty());
        assert!(spec.response().is_none());
        assert!(spec.path_params().is_empty());
    }

    #[test]
    fn test_rules_keep_declaration_order() {
        let spec = EndpointSpec::new("search", "/search")
            .with_param("zeta", ParamRule::required())
            .with_param("alpha", ParamRule::required().with_default("x"));

        let names: Vec<_> = spec.params().keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[test]
    fn test_value_kind_parse() {
        assert_eq!("string".parse::<ValueKind>().unwrap(), ValueKind::String);
        assert_eq!("int".parse::<ValueKind>().unwrap(), ValueKind::Integer);
        assert_eq!("Boolean".parse::<ValueKind>().unwrap(), ValueKind::Boolean);
        assert_eq!(ValueKind::Integer.to_string(), "integer");
        assert!("blob".parse::<ValueKind>().is_err());
    }

    #[test]
    fn test_value_kind_matches() {
        assert!(ValueKind::Integer.matches(&ParamValue::from(3)));
        assert!(!ValueKind::Integer.matches(&ParamValue::from(3.5)));
        assert!(ValueKind::Number.matches(&ParamValue::from(3.5)));
        assert!(ValueKind::Object.matches(&ParamValue::from(json!({ "a": 1 }))));
        assert!(!ValueKind::String.matches(&ParamValue::from(true)));
        assert!(ValueKind::File.matches(&ParamValue::from(FileParam::path("a.txt"))));
        assert!(!ValueKind::File.matches(&ParamValue::from("a.txt")));
    }

    #[test]
    fn test_file_kind_routes_to_files() {
        assert!(ParamRule::file().routes_to_files());
        assert!(ParamRule::required()
            .with_kind(ValueKind::File)
            .routes_to_files());
        assert!(!ParamRule::required().routes_to_files());
    }
}
