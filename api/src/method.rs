//! HTTP method types for configured endpoints.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::ConfigError;

/// HTTP methods an endpoint may be configured with.
///
/// Parsing is case-insensitive so that configuration files may spell the
/// method as `post`, `Post` or `POST`. Display always renders uppercase.
///
/// ## Examples
///
/// ```rust
/// use api_caller::RestMethod;
///
/// let method: RestMethod = "patch".parse().unwrap();
/// assert_eq!(method, RestMethod::Patch);
/// assert_eq!(method.to_string(), "PATCH");
/// assert!(method.has_body());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum RestMethod {
    /// HTTP GET. Body parameters are sent as the query string.
    #[default]
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP PATCH.
    Patch,
    /// HTTP DELETE. Body parameters are sent as the query string.
    Delete,
}

impl RestMethod {
    /// Returns `true` if body parameters travel in the request body
    /// rather than in the query string.
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// Converts to the equivalent `reqwest::Method`.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl From<RestMethod> for reqwest::Method {
    fn from(method: RestMethod) -> Self {
        method.to_reqwest()
    }
}

impl TryFrom<String> for RestMethod {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map_err(|_| ConfigError::InvalidMethod { method: value })
    }
}

impl From<RestMethod> for String {
    fn from(method: RestMethod) -> Self {
        method.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display() {
        assert_eq!(RestMethod::Get.to_string(), "GET");
        assert_eq!(RestMethod::Post.to_string(), "POST");
        assert_eq!(RestMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("GET".parse::<RestMethod>().unwrap(), RestMethod::Get);
        assert_eq!("post".parse::<RestMethod>().unwrap(), RestMethod::Post);
        assert_eq!("Patch".parse::<RestMethod>().unwrap(), RestMethod::Patch);
    }

    #[test]
    fn test_default_is_get() {
        assert_eq!(RestMethod::default(), RestMethod::Get);
    }

    #[test]
    fn test_has_body() {
        assert!(!RestMethod::Get.has_body());
        assert!(RestMethod::Post.has_body());
        assert!(RestMethod::Put.has_body());
        assert!(RestMethod::Patch.has_body());
        assert!(!RestMethod::Delete.has_body());
    }

    #[test]
    fn test_enum_iteration() {
        let methods: Vec<_> = RestMethod::iter().collect();
        assert_eq!(methods.len(), 5);
    }

    #[test]
    fn test_to_reqwest() {
        assert_eq!(RestMethod::Get.to_reqwest(), reqwest::Method::GET);
        assert_eq!(RestMethod::Delete.to_reqwest(), reqwest::Method::DELETE);
    }

    #[test]
    fn test_deserialize_rejects_unknown() {
        let parsed: RestMethod = serde_json::from_str("\"put\"").unwrap();
        assert_eq!(parsed, RestMethod::Put);

        let err = serde_json::from_str::<RestMethod>("\"TRACE\"").unwrap_err();
        assert!(err.to_string().contains("TRACE"));
    }
}
