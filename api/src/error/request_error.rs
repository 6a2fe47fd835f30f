//! Parameter validation errors.

use thiserror::Error;

/// Errors raised while validating call parameters against an endpoint.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// One or more required parameters could not be resolved.
    ///
    /// Every unmet name is listed: declared rules first, then path-only
    /// placeholders, each in declaration order.
    #[error("Not enough parameters: {}", .names.join(", "))]
    MissingParameters {
        /// The unresolved parameter names.
        names: Vec<String>,
    },

    /// A supplied value does not match its rule's required kind.
    #[error("Param '{param}' should be of kind '{expected}'")]
    TypeMismatch {
        /// The parameter name.
        param: String,
        /// The kind the rule requires.
        expected: String,
    },
}

impl RequestError {
    /// Creates a missing parameters error.
    pub fn missing(names: Vec<String>) -> Self {
        Self::MissingParameters { names }
    }

    /// Returns the missing names, or an empty slice for other variants.
    pub fn missing_names(&self) -> &[String] {
        match self {
            Self::MissingParameters { names } => names,
            Self::TypeMismatch { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_joins_names() {
        let err = RequestError::missing(vec!["param".to_string(), "param1".to_string()]);
        assert_eq!(err.to_string(), "Not enough parameters: param, param1");
        assert_eq!(err.missing_names(), ["param", "param1"]);
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = RequestError::TypeMismatch {
            param: "some".to_string(),
            expected: "integer".to_string(),
        };
        assert_eq!(err.to_string(), "Param 'some' should be of kind 'integer'");
        assert!(err.missing_names().is_empty());
    }
}
