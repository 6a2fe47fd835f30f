//! Serde model of caller configuration.
//!
//! Configuration is a set of named cases. Each case binds one domain to a
//! map of endpoint definitions:
//!
//! ```yaml
//! cases:
//!   shop:
//!     domain: https://shop.example.com/
//!     endpoints:
//!       get_item:
//!         name: Fetch one item
//!         path: /items/{id}
//!         response_class: Item
//!       upload:
//!         name: Upload attachment
//!         path: /items/{id}/files
//!         method: post
//!         params:
//!           file: file
//!           note: ~
//!           page: { value: 1, class: integer }
//!         headers:
//!           X-Api-Version: 2
//! ```
//!
//! The model is deliberately loose: method names, rule kinds and domains are
//! kept as written and only checked when [`Registry::resolve`] turns a case
//! into endpoint specs.
//!
//! [`Registry::resolve`]: crate::registry::Registry::resolve

use std::path::Path;

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::codec::WireFormat;
use crate::endpoint::{ParamRule, ValueKind};
use crate::error::ConfigError;
use crate::value::Headers;

/// Top-level configuration: every case the caller factory can serve.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiCallerConfig {
    #[serde(default)]
    pub cases: IndexMap<String, CaseConfig>,
}

impl ApiCallerConfig {
    /// Parses configuration from YAML.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the document does not match the model.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parses configuration from JSON.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Json`] if the document does not match the model.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads configuration from a file. `.yaml` and `.yml` files are read as
    /// YAML, everything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml_str(&contents)
        } else {
            Self::from_json_str(&contents)
        }
    }

    /// Looks up a case by name.
    pub fn case(&self, name: &str) -> Result<&CaseConfig, ConfigError> {
        self.cases.get(name).ok_or_else(|| ConfigError::UnknownCase {
            case: name.to_string(),
        })
    }
}

/// One case: a domain and the endpoints served from it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CaseConfig {
    /// Base URL. Required by the time the case is resolved.
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub endpoints: IndexMap<String, EndpointConfig>,
}

impl CaseConfig {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
            endpoints: IndexMap::new(),
        }
    }

    pub fn with_endpoint(mut self, key: impl Into<String>, endpoint: EndpointConfig) -> Self {
        self.endpoints.insert(key.into(), endpoint);
        self
    }
}

/// One endpoint definition as written in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EndpointConfig {
    /// Human-readable name.
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub params: IndexMap<String, ParamRuleConfig>,
    /// HTTP method as written; GET when absent.
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "stringified_headers")]
    pub headers: Headers,
    /// Registered type name the response is cast into.
    #[serde(default)]
    pub response_class: Option<String>,
    #[serde(default)]
    pub response_format: Option<WireFormat>,
}

impl EndpointConfig {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            params: IndexMap::new(),
            method: None,
            headers: Headers::new(),
            response_class: None,
            response_format: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, rule: ParamRuleConfig) -> Self {
        self.params.insert(name.into(), rule);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_response_class(mut self, type_name: impl Into<String>) -> Self {
        self.response_class = Some(type_name.into());
        self
    }
}

/// A parameter rule as written in configuration.
///
/// Accepts `null` (required, untyped), a shorthand string (`file` or a kind
/// name such as `integer`), or a full mapping.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamRuleConfig {
    #[default]
    Untyped,
    Shorthand(String),
    Detailed(ParamRuleDetail),
}

/// Mapping form of a parameter rule.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParamRuleDetail {
    /// Display name; informational only.
    #[serde(default)]
    pub name: Option<String>,
    /// Default used when the caller supplies no value.
    #[serde(default)]
    pub value: Option<Value>,
    /// Kind the supplied value must have.
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub file: bool,
}

impl ParamRuleConfig {
    /// Converts the written rule for parameter `param` into a [`ParamRule`].
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidParamRule`] for unknown kind names.
    pub fn to_rule(&self, param: &str) -> Result<ParamRule, ConfigError> {
        match self {
            Self::Untyped => Ok(ParamRule::required()),
            Self::Shorthand(word) if word.eq_ignore_ascii_case("file") => Ok(ParamRule::file()),
            Self::Shorthand(kind) => Ok(ParamRule::required().with_kind(parse_kind(param, kind)?)),
            Self::Detailed(detail) => {
                let mut rule = ParamRule {
                    default: detail.value.clone(),
                    kind: None,
                    is_file: detail.file,
                };
                if let Some(kind) = &detail.class {
                    rule.kind = Some(parse_kind(param, kind)?);
                }
                Ok(rule)
            }
        }
    }
}

fn parse_kind(param: &str, kind: &str) -> Result<ValueKind, ConfigError> {
    kind.parse()
        .map_err(|_| ConfigError::invalid_rule(format!("unknown kind '{kind}' for '{param}'")))
}

/// Header values may be written as strings, numbers or booleans.
fn stringified_headers<'de, D>(deserializer: D) -> Result<Headers, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<IndexMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    raw.into_iter()
        .map(|(name, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(<D::Error as de::Error>::custom(format!(
                        "header '{name}' must be a string, number or boolean, got {other}"
                    )))
                }
            };
            Ok((name, text))
        })
        .collect()
}
