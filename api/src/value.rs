//! Parameter values passed into a call.
//!
//! A call's inputs are a flat, insertion-ordered [`ParamMap`]. Each entry is
//! either a plain JSON value or a [`FileParam`]; file params are routed to the
//! transport's file set regardless of endpoint rules.

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::CodecError;

/// Insertion-ordered parameter map.
pub type ParamMap = IndexMap<String, ParamValue>;

/// Insertion-ordered header map. Names are compared by exact string.
pub type Headers = IndexMap<String, String>;

/// A file-like parameter.
///
/// Paths are borrowed by reference only: the transport reads the file when
/// the request is sent, and the caller keeps ownership of the file itself.
#[derive(Debug, Clone, PartialEq)]
pub enum FileParam {
    /// A file on disk.
    Path(PathBuf),
    /// In-memory content with an optional upload filename.
    Bytes {
        filename: Option<String>,
        data: Bytes,
    },
}

impl FileParam {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn bytes(data: impl Into<Bytes>, filename: Option<String>) -> Self {
        Self::Bytes {
            filename,
            data: data.into(),
        }
    }

    /// The filename sent with a multipart upload, if any.
    pub fn filename(&self) -> Option<String> {
        match self {
            Self::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            Self::Bytes { filename, .. } => filename.clone(),
        }
    }
}

impl From<&Path> for FileParam {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// One call input value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A plain value (string, number, bool, array, object or null).
    Value(Value),
    /// A file-like value.
    File(FileParam),
}

impl ParamValue {
    /// Builds a plain value from any serializable type.
    ///
    /// Nested structured values are flattened to plain JSON here, so the
    /// pipeline only ever sees plain values and files.
    pub fn serialized<T: Serialize + ?Sized>(value: &T) -> Result<Self, CodecError> {
        Ok(Self::Value(serde_json::to_value(value)?))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// `null` counts as absent during validation.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::File(_) => None,
        }
    }

    /// Textual form used when substituting a path placeholder.
    ///
    /// Strings are used verbatim; numbers and booleans use their canonical
    /// text; arrays and objects use their JSON text; null is empty. Files
    /// render as their path or filename.
    pub fn to_path_segment(&self) -> String {
        match self {
            Self::Value(Value::String(s)) => s.clone(),
            Self::Value(Value::Null) => String::new(),
            Self::Value(other) => other.to_string(),
            Self::File(FileParam::Path(path)) => path.display().to_string(),
            Self::File(file) => file.filename().unwrap_or_default(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path_segment())
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<FileParam> for ParamValue {
    fn from(file: FileParam) -> Self {
        Self::File(file)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Value(Value::from(value))
    }
}

/// Converts a JSON object into a parameter map. Non-object values are rejected.
pub fn object_to_params(value: Value) -> Result<ParamMap, CodecError> {
    match value {
        Value::Object(fields) => Ok(fields
            .into_iter()
            .map(|(key, value)| (key, ParamValue::Value(value)))
            .collect()),
        Value::Null => Ok(ParamMap::new()),
        other => Err(CodecError::NotAnObject {
            kind: json_kind(&other),
        }),
    }
}

/// Name of a JSON value's kind, for diagnostics.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Capability to flatten a typed value into a plain parameter map.
///
/// Implemented for every `Serialize` type: field names become keys, and
/// nested structures become plain JSON values.
///
/// ## Examples
///
/// ```rust
/// use api_caller::ToFieldMap;
///
/// #[derive(serde::Serialize)]
/// struct NewItem { id: u32, label: &'static str }
///
/// let params = NewItem { id: 7, label: "seven" }.to_field_map().unwrap();
/// assert_eq!(params["id"].to_string(), "7");
/// assert_eq!(params["label"].to_string(), "seven");
/// ```
pub trait ToFieldMap {
    fn to_field_map(&self) -> Result<ParamMap, CodecError>;
}

impl<T: Serialize + ?Sized> ToFieldMap for T {
    fn to_field_map(&self) -> Result<ParamMap, CodecError> {
        object_to_params(serde_json::to_value(self)?)
    }
}
