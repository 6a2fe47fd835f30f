//! Declarative REST API caller.
//!
//! The `api-caller` crate turns a static registry of named endpoints into
//! validated HTTP calls. Each endpoint declares a path template, method,
//! parameter rules, default headers and an optional response type; a call
//! names the endpoint and supplies values, and the pipeline does the rest.
//!
//! ## Features
//!
//! - **Configured endpoints**: cases and endpoints load from YAML or JSON
//! - **Joint validation**: every missing parameter is reported at once
//! - **Path templates**: `{placeholder}` substitution with inline overrides
//! - **Interceptors and listeners**: rewrite requests before dispatch, observe them after
//! - **Typed responses**: JSON, YAML or XML bodies cast into registered types
//! - **Async transport**: built on `reqwest` with `tokio`, swappable behind a trait
//! - **Layered error handling**: structured errors for each failure mode
//!
//! ## Example
//!
//! ```rust,ignore
//! use api_caller::{ApiCallerConfig, ApiCallerFactory, HttpTransport, ParamMap, SerdeCodec};
//!
//! #[derive(serde::Deserialize)]
//! struct Item { id: u64, label: String }
//!
//! let config = ApiCallerConfig::from_path("callers.yaml")?;
//! let codec = SerdeCodec::new().register::<Item>("Item");
//! let factory = ApiCallerFactory::new(config, HttpTransport::new()?, codec);
//!
//! let values = ParamMap::from([("id".to_string(), 42.into())]);
//! let response = factory.caller("shop")?.call("get_item", values).await?;
//! let item: &Item = response.typed().expect("declared response type");
//! ```

pub mod caller;
pub mod codec;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod headers;
pub mod method;
pub mod params;
pub mod path;
pub mod registry;
pub mod transport;
pub mod value;

// Re-exports for convenience
pub use caller::{ApiCaller, ApiCallerFactory, EndpointSelector, RequestOptions, RequestValues};
pub use codec::{Codec, SerdeCodec, TypedValue, WireFormat};
pub use config::{ApiCallerConfig, CaseConfig, EndpointConfig, ParamRuleConfig};
pub use context::{RequestContext, RequestInterceptor, RequestListener};
pub use endpoint::{EndpointSpec, ParamRule, ResponseSpec, ValueKind};
pub use error::{
    ApiError, ApiResponseError, CodecError, ConfigError, RequestError, TransportError,
};
pub use method::RestMethod;
pub use registry::Registry;
pub use transport::{
    HttpTransport, ResponseContent, Transport, TransportRequest, TransportResponse,
};
pub use value::{FileParam, Headers, ParamMap, ParamValue, ToFieldMap};
