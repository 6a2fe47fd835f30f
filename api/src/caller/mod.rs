//! The request pipeline and its per-case factory.
//!
//! [`ApiCaller::make_request`] is the orchestrator: it resolves an endpoint,
//! validates and classifies the call's values, builds the path, merges
//! headers, runs interceptors, dispatches through the transport and maps the
//! response. [`ApiCallerFactory`] caches one caller per configured case.

mod executor;
mod factory;
mod request;

pub use executor::ApiCaller;
pub use factory::ApiCallerFactory;
pub use request::{EndpointSelector, RequestOptions, RequestValues};
