//! Per-case endpoint registry.

use std::sync::Arc;

use indexmap::IndexMap;
use url::Url;

use crate::config::{CaseConfig, EndpointConfig};
use crate::endpoint::{EndpointSpec, ResponseSpec};
use crate::error::ConfigError;
use crate::method::RestMethod;

/// The resolved endpoints of one case, bound to its domain.
///
/// Built once and read-only afterwards, so one registry can serve any
/// number of concurrent calls.
#[derive(Debug, Clone)]
pub struct Registry {
    case: String,
    domain: String,
    endpoints: IndexMap<String, Arc<EndpointSpec>>,
}

impl Registry {
    /// Creates an empty registry for `case`, served from `domain`.
    ///
    /// Trailing slashes are stripped from the domain.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::MissingDomain`] for an empty domain and
    /// [`ConfigError::InvalidUrl`] if it does not parse as a URL.
    pub fn new(case: impl Into<String>, domain: &str) -> Result<Self, ConfigError> {
        let case = case.into();
        let domain = normalize_domain(&case, Some(domain))?;
        Ok(Self {
            case,
            domain,
            endpoints: IndexMap::new(),
        })
    }

    /// Builds a registry from a case's configuration.
    ///
    /// Every endpoint entry becomes an [`EndpointSpec`] keyed by its entry
    /// name, with GET as the default method and no rules, headers or
    /// response type unless configured. Path placeholders are not checked
    /// against rules here; that happens per call.
    pub fn resolve(case: impl Into<String>, config: &CaseConfig) -> Result<Self, ConfigError> {
        let case = case.into();
        let domain = normalize_domain(&case, config.domain.as_deref())?;

        let endpoints = config
            .endpoints
            .iter()
            .map(|(key, endpoint)| Ok((key.clone(), Arc::new(build_spec(key, endpoint)?))))
            .collect::<Result<_, ConfigError>>()?;

        Ok(Self {
            case,
            domain,
            endpoints,
        })
    }

    /// Adds or replaces an endpoint, keyed by its name.
    pub fn with_endpoint(mut self, spec: EndpointSpec) -> Self {
        self.endpoints
            .insert(spec.name().to_string(), Arc::new(spec));
        self
    }

    pub fn case(&self) -> &str {
        &self.case
    }

    /// Base URL without trailing slashes.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Looks up an endpoint by name.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::UnknownEndpoint`] if no endpoint has this name.
    pub fn endpoint(&self, name: &str) -> Result<Arc<EndpointSpec>, ConfigError> {
        self.endpoints
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownEndpoint {
                endpoint: name.to_string(),
            })
    }

    /// Endpoint names in configuration order.
    pub fn endpoint_names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

fn normalize_domain(case: &str, domain: Option<&str>) -> Result<String, ConfigError> {
    let domain = domain.map(|d| d.trim_end_matches('/')).unwrap_or_default();
    if domain.is_empty() {
        return Err(ConfigError::MissingDomain {
            case: case.to_string(),
        });
    }
    Url::parse(domain).map_err(|source| ConfigError::InvalidUrl {
        domain: domain.to_string(),
        source,
    })?;
    Ok(domain.to_string())
}

fn build_spec(key: &str, config: &EndpointConfig) -> Result<EndpointSpec, ConfigError> {
    let method = match &config.method {
        Some(method) => RestMethod::try_from(method.clone())?,
        None => RestMethod::default(),
    };

    let mut spec = EndpointSpec::new(key, config.path.as_str())
        .with_title(config.name.as_str())
        .with_method(method);

    for (param, rule) in &config.params {
        spec = spec.with_param(param.as_str(), rule.to_rule(param)?);
    }
    for (name, value) in &config.headers {
        spec = spec.with_header(name.as_str(), value.as_str());
    }
    if let Some(type_name) = &config.response_class {
        let format = config.response_format.unwrap_or_default();
        spec = spec.with_response(ResponseSpec::new(type_name.as_str(), format));
    }

    Ok(spec)
}
