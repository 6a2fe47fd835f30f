//! Serialization collaborator.
//!
//! The pipeline uses a [`Codec`] for two jobs: flattening structured request
//! objects into plain parameter maps, and casting successful response bodies
//! into the type an endpoint declares. [`SerdeCodec`] implements both with
//! `serde_json`, `serde_yaml` and `quick-xml`, resolving declared type names
//! through an explicit registry instead of runtime reflection.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::CodecError;
use crate::value::{object_to_params, ParamMap};

/// Wire format of serialized content.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    #[default]
    Json,
    Yaml,
    Xml,
}

/// A deserialized response value of a type known only at runtime.
///
/// Produced by [`Codec::deserialize`]; recover the concrete type with
/// [`downcast_ref`](Self::downcast_ref).
#[derive(Clone)]
pub struct TypedValue {
    type_name: String,
    value: Arc<dyn Any + Send + Sync>,
}

impl TypedValue {
    pub fn new<T: Any + Send + Sync>(type_name: impl Into<String>, value: T) -> Self {
        Self {
            type_name: type_name.into(),
            value: Arc::new(value),
        }
    }

    /// The declared type name this value was produced for.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }
}

impl fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Serialization collaborator used by the pipeline.
pub trait Codec: Send + Sync {
    /// Serializes a plain value into `format`.
    fn serialize(&self, value: &Value, format: WireFormat) -> Result<String, CodecError>;

    /// Deserializes `content` into the type registered as `type_name`.
    fn deserialize(
        &self,
        content: &str,
        type_name: &str,
        format: WireFormat,
    ) -> Result<TypedValue, CodecError>;

    /// Flattens a structured value into a parameter map by round-tripping
    /// it through the JSON wire format.
    fn to_field_map(&self, value: &Value) -> Result<ParamMap, CodecError> {
        let wire = self.serialize(value, WireFormat::Json)?;
        object_to_params(serde_json::from_str(&wire)?)
    }
}

type Decoder = Arc<dyn Fn(&str, WireFormat) -> Result<TypedValue, CodecError> + Send + Sync>;

/// Serde-backed [`Codec`] with a registry of named response types.
///
/// ## Examples
///
/// ```rust
/// use api_caller::codec::{Codec, SerdeCodec, WireFormat};
///
/// #[derive(serde::Deserialize)]
/// struct Item { id: u32 }
///
/// let codec = SerdeCodec::new().register::<Item>("Item");
/// let typed = codec.deserialize(r#"{"id": 3}"#, "Item", WireFormat::Json).unwrap();
/// assert_eq!(typed.downcast_ref::<Item>().unwrap().id, 3);
/// ```
#[derive(Clone, Default)]
pub struct SerdeCodec {
    decoders: HashMap<String, Decoder>,
}

impl SerdeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` as the target of responses declaring `type_name`.
    pub fn register<T>(mut self, type_name: impl Into<String>) -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let name = type_name.into();
        let tag = name.clone();
        let decoder: Decoder = Arc::new(move |content: &str, format: WireFormat| {
            let value: T = decode(content, format)?;
            Ok(TypedValue::new(tag.clone(), value))
        });
        self.decoders.insert(name, decoder);
        self
    }

    /// Returns `true` if a type is registered under `type_name`.
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.decoders.contains_key(type_name)
    }
}

impl fmt::Debug for SerdeCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.decoders.keys().collect();
        names.sort();
        f.debug_struct("SerdeCodec").field("types", &names).finish()
    }
}

impl Codec for SerdeCodec {
    fn serialize(&self, value: &Value, format: WireFormat) -> Result<String, CodecError> {
        encode(value, format)
    }

    fn deserialize(
        &self,
        content: &str,
        type_name: &str,
        format: WireFormat,
    ) -> Result<TypedValue, CodecError> {
        let decoder = self
            .decoders
            .get(type_name)
            .ok_or_else(|| CodecError::UnknownType {
                type_name: type_name.to_string(),
            })?;
        (decoder.as_ref())(content, format)
    }
}

/// Deserializes `content` in `format` into `T`.
pub fn decode<T: DeserializeOwned>(content: &str, format: WireFormat) -> Result<T, CodecError> {
    match format {
        WireFormat::Json => Ok(serde_json::from_str(content)?),
        WireFormat::Yaml => Ok(serde_yaml::from_str(content)?),
        WireFormat::Xml => Ok(quick_xml::de::from_str(content)?),
    }
}

/// Serializes `value` into `format`. XML output is wrapped in a `<request>` root.
pub fn encode<T: Serialize>(value: &T, format: WireFormat) -> Result<String, CodecError> {
    match format {
        WireFormat::Json => Ok(serde_json::to_string(value)?),
        WireFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        WireFormat::Xml => Ok(quick_xml::se::to_string_with_root("request", value)?),
    }
}
