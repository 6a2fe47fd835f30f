//! Serialization and deserialization errors.

use thiserror::Error;

/// Errors from the serialization collaborator.
///
/// Raised while flattening request objects into parameter maps, or while
/// casting a successful response body into its declared type.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON parsing or serialization failed.
    #[error("JSON codec error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// YAML parsing or serialization failed.
    #[error("YAML codec error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::DeError),

    /// XML serialization failed.
    #[error("XML serialize error: {0}")]
    XmlSerialize(#[from] quick_xml::SeError),

    /// No deserializer is registered for the declared response type.
    #[error("Unknown response type: {type_name}")]
    UnknownType {
        /// The type name from the endpoint configuration.
        type_name: String,
    },

    /// A request object did not serialize into a key/value map.
    #[error("Expected an object with named fields, got {kind}")]
    NotAnObject {
        /// The JSON kind that was produced instead.
        kind: &'static str,
    },
}

impl CodecError {
    /// Returns `true` if this is a parsing error.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::JsonParse(_) | Self::YamlParse(_) | Self::XmlParse(_)
        )
    }
}
