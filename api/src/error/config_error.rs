//! Case, endpoint and configuration errors.

use thiserror::Error;

/// Errors in API caller configuration or endpoint lookup.
///
/// These are fatal to the call and are surfaced immediately; retrying
/// with the same input cannot succeed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No case with this name is configured.
    #[error("ApiCaller case '{case}' is not defined.")]
    UnknownCase {
        /// The requested case name.
        case: String,
    },

    /// The case's registry has no endpoint with this name.
    #[error("Api '{endpoint}' does not exist")]
    UnknownEndpoint {
        /// The requested endpoint name.
        endpoint: String,
    },

    /// A case was configured without a domain.
    #[error("Missing domain for case '{case}'")]
    MissingDomain {
        /// The case lacking a domain.
        case: String,
    },

    /// The configured domain is not a valid URL.
    #[error("Invalid domain URL '{domain}': {source}")]
    InvalidUrl {
        /// The offending domain string.
        domain: String,
        /// The underlying parse error.
        source: url::ParseError,
    },

    /// The configured HTTP method is not supported.
    #[error("Unsupported HTTP method: {method}")]
    InvalidMethod {
        /// The method as written in the configuration.
        method: String,
    },

    /// A parameter rule could not be interpreted.
    #[error("Invalid parameter rule: {message}")]
    InvalidParamRule {
        /// Description of the rule error.
        message: String,
    },

    /// The per-case caller cache lock was poisoned.
    #[error("Caller cache lock poisoned")]
    CachePoisoned,

    /// YAML configuration could not be parsed.
    #[error("YAML config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON configuration could not be parsed.
    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates an invalid parameter rule error.
    pub fn invalid_rule(message: impl Into<String>) -> Self {
        Self::InvalidParamRule {
            message: message.into(),
        }
    }
}
