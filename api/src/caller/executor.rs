//! Request assembly and dispatch with tracing instrumentation.

use std::sync::Arc;

use tracing::{debug, instrument, warn, Span};

use super::request::{EndpointSelector, RequestOptions, RequestValues};
use crate::codec::Codec;
use crate::context::{RequestContext, RequestInterceptor};
use crate::endpoint::EndpointSpec;
use crate::error::{ApiError, ApiResponseError};
use crate::headers::merge_headers;
use crate::params::{self, ClassifiedParams};
use crate::path::PathBuilder;
use crate::registry::Registry;
use crate::transport::{ResponseContent, Transport, TransportRequest, TransportResponse};
use crate::value::{Headers, ParamMap};

/// Assembled request parts that interceptors may rewrite.
struct Assembled {
    path: String,
    body: ParamMap,
    files: ParamMap,
    headers: Headers,
}

/// Executes calls against the endpoints of one case.
///
/// A caller is immutable once built and may be shared across tasks; every
/// call works on its own request context.
///
/// ## Examples
///
/// ```rust,ignore
/// use api_caller::{ApiCaller, EndpointSpec, HttpTransport, Registry, SerdeCodec};
/// use api_caller::caller::RequestOptions;
///
/// let registry = Registry::new("shop", "https://shop.example.com")?
///     .with_endpoint(EndpointSpec::new("get_item", "/items/{id}"));
/// let caller = ApiCaller::new(registry, HttpTransport::new()?, SerdeCodec::new());
///
/// let values = ParamMap::from([("id".to_string(), 42.into())]);
/// let response = caller.make_request("get_item", values, RequestOptions::new()).await?;
/// println!("{}", response.content);
/// ```
pub struct ApiCaller<T> {
    registry: Arc<Registry>,
    transport: Arc<T>,
    codec: Arc<dyn Codec>,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl<T: Transport> ApiCaller<T> {
    pub fn new(registry: Registry, transport: T, codec: impl Codec + 'static) -> Self {
        Self::from_parts(Arc::new(registry), Arc::new(transport), Arc::new(codec))
    }

    /// Builds a caller from shared collaborators.
    pub fn from_parts(
        registry: Arc<Registry>,
        transport: Arc<T>,
        codec: Arc<dyn Codec>,
    ) -> Self {
        Self {
            registry,
            transport,
            codec,
            interceptors: Vec::new(),
        }
    }

    /// Registers an interceptor. Interceptors run in registration order.
    pub fn with_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub(crate) fn with_interceptors(mut self, interceptors: &[Arc<dyn RequestInterceptor>]) -> Self {
        self.interceptors.extend(interceptors.iter().cloned());
        self
    }

    /// Name of the case this caller serves.
    pub fn case(&self) -> &str {
        self.registry.case()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Calls an endpoint with default options.
    pub async fn call(
        &self,
        selector: impl Into<EndpointSelector>,
        values: impl Into<RequestValues>,
    ) -> Result<TransportResponse, ApiError> {
        self.make_request(selector, values, RequestOptions::default())
            .await
    }

    /// Assembles, validates and dispatches one call.
    ///
    /// The endpoint is resolved by name, the values are validated against
    /// its rules and placeholders, and the path, body, files and headers are
    /// assembled and passed through every interceptor before the transport
    /// sends them to the case's domain (or `options.domain`).
    ///
    /// Transport faults are converted into failed responses, except for
    /// [`TransportError::Abort`](crate::error::TransportError::Abort), which
    /// propagates unchanged. The listener, if any, sees every dispatched
    /// call. When the endpoint declares a response type, a successful body
    /// is cast into it through the codec.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The endpoint is not registered
    /// - A required value is missing or has the wrong kind
    /// - Structured values cannot be flattened
    /// - The response status is not 2xx
    /// - The response cannot be cast into the declared type
    #[instrument(
        name = "api_request",
        skip_all,
        fields(
            api.case = %self.registry.case(),
            api.endpoint = tracing::field::Empty,
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub async fn make_request(
        &self,
        selector: impl Into<EndpointSelector>,
        values: impl Into<RequestValues>,
        options: RequestOptions,
    ) -> Result<TransportResponse, ApiError> {
        let span = Span::current();
        let selector: EndpointSelector = selector.into();
        let (name, path_overrides) = selector.into_parts();
        span.record("api.endpoint", name.as_str());

        let values = self.normalize(values.into())?;
        let spec = self.registry.endpoint(&name)?;
        let method = spec.method();
        span.record("http.method", method.to_string().as_str());
        debug!(endpoint = %name, path = spec.path(), "Resolved endpoint");

        let ClassifiedParams { body, files } =
            params::validate_and_classify(&spec, &path_overrides, &values)?;
        let assembled = Assembled {
            path: PathBuilder::build(spec.path(), &values, &path_overrides, spec.params()),
            body,
            files,
            headers: merge_headers(spec.headers(), options.headers.as_ref()),
        };
        let assembled = self.intercept(&spec, values, assembled);

        let domain = options
            .domain
            .as_deref()
            .map(|domain| domain.trim_end_matches('/'))
            .unwrap_or_else(|| self.registry.domain());
        let request = TransportRequest {
            url: format!("{domain}{}", assembled.path),
            method,
            body: assembled.body,
            headers: assembled.headers,
            cookies: None,
            files: assembled.files,
        };
        span.record("http.url", request.url.as_str());

        debug!(method = %method, url = %request.url, "Dispatching request");
        let (response, faulted) = match self.transport.execute(&request).await {
            Ok(response) => (response, false),
            Err(error) if error.is_passthrough() => {
                span.record("otel.status_code", "ERROR");
                return Err(error.into());
            }
            Err(error) => {
                warn!(url = %request.url, error = %error, "Transport fault converted into a failed response");
                (TransportResponse::from_fault(&error), true)
            }
        };
        span.record("http.status_code", response.status);

        if let Some(listener) = &options.listener {
            listener.on_request(
                &request.url,
                &request.body,
                &response.content,
                response.status,
                method,
            );
        }

        if !response.is_ok() {
            let otel_status = if faulted || response.status >= 500 {
                "ERROR"
            } else {
                "UNSET"
            };
            span.record("otel.status_code", otel_status);
            return Err(ApiResponseError::new(response).into());
        }

        let Some(declared) = spec.response() else {
            span.record("otel.status_code", "OK");
            return Ok(response);
        };
        let typed = match self.codec.deserialize(
            &response.content.to_wire_string(),
            &declared.type_name,
            declared.format,
        ) {
            Ok(typed) => typed,
            Err(error) => {
                span.record("otel.status_code", "ERROR");
                warn!(type_name = %declared.type_name, error = %error, "Response could not be cast into the declared type");
                return Err(error.into());
            }
        };
        span.record("otel.status_code", "OK");
        debug!(type_name = %declared.type_name, format = %declared.format, "Cast response into declared type");

        Ok(TransportResponse::new(
            response.status,
            ResponseContent::Typed(typed),
        ))
    }

    fn normalize(&self, values: RequestValues) -> Result<ParamMap, ApiError> {
        match values {
            RequestValues::Empty => Ok(ParamMap::new()),
            RequestValues::Map(values) => Ok(values),
            RequestValues::Object(value) => Ok(self.codec.to_field_map(&value)?),
        }
    }

    fn intercept(&self, spec: &Arc<EndpointSpec>, values: ParamMap, assembled: Assembled) -> Assembled {
        if self.interceptors.is_empty() {
            return assembled;
        }

        let context = RequestContext::new(
            self.registry.case(),
            Arc::clone(spec),
            values,
            assembled.path,
            assembled.body,
            assembled.files,
            assembled.headers,
        );
        let context = self
            .interceptors
            .iter()
            .fold(context, |context, interceptor| interceptor.intercept(context));
        debug!(count = self.interceptors.len(), path = %context.path, "Applied interceptors");

        Assembled {
            path: context.path,
            body: context.body,
            files: context.files,
            headers: context.headers,
        }
    }
}

impl<T> std::fmt::Debug for ApiCaller<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCaller")
            .field("case", &self.registry.case())
            .field("domain", &self.registry.domain())
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::codec::{SerdeCodec, WireFormat};
    use crate::endpoint::ResponseSpec;
    use crate::error::TransportError;
    use crate::method::RestMethod;

    #[derive(Default)]
    struct Recording {
        requests: Mutex<Vec<TransportRequest>>,
    }

    impl Transport for Recording {
        async fn execute(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(TransportResponse::ok("done"))
        }
    }

    fn caller() -> ApiCaller<Recording> {
        let registry = Registry::new("test", "http://api.test/")
            .unwrap()
            .with_endpoint(EndpointSpec::new("search", "/search").with_header("Accept", "text/plain"))
            .with_endpoint(EndpointSpec::new("item", "/items/{id}").with_method(RestMethod::Delete));
        ApiCaller::new(registry, Recording::default(), SerdeCodec::new())
    }

    #[tokio::test]
    async fn test_query_and_headers_reach_transport() {
        let caller = caller();
        let values = ParamMap::from([("q".to_string(), "rust".into())]);
        let options = RequestOptions::new().header("X-Trace", "1");

        let response = caller.make_request("search", values, options).await.unwrap();
        assert_eq!(response.content.as_text(), Some("done"));

        let sent = caller.transport().requests.lock().unwrap();
        assert_eq!(sent[0].url, "http://api.test/search");
        assert_eq!(sent[0].method, RestMethod::Get);
        assert_eq!(sent[0].body["q"].to_string(), "rust");
        assert_eq!(sent[0].headers.keys().collect::<Vec<_>>(), ["Accept", "X-Trace"]);
        assert_eq!(sent[0].cookies, None);
    }

    #[tokio::test]
    async fn test_object_values_are_flattened() {
        let caller = caller();
        caller
            .call("item", serde_json::json!({ "id": 9 }))
            .await
            .unwrap();

        let sent = caller.transport().requests.lock().unwrap();
        assert_eq!(sent[0].url, "http://api.test/items/9");
        assert!(sent[0].body.is_empty());
    }

    #[tokio::test]
    async fn test_null_object_is_empty() {
        let caller = caller();
        let err = caller
            .call("item", serde_json::Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not enough parameters: id");
    }

    #[tokio::test]
    async fn test_scalar_object_is_rejected() {
        let caller = caller();
        let err = caller.call("search", serde_json::json!(5)).await.unwrap_err();
        assert!(matches!(err, ApiError::Codec(_)));
        assert!(caller.transport().requests.lock().unwrap().is_empty());
    }

    struct Failing;

    impl Transport for Failing {
        async fn execute(&self, _: &TransportRequest) -> Result<TransportResponse, TransportError> {
            Err(TransportError::Failed {
                status: 502,
                message: "bad gateway".to_string(),
            })
        }
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_request_emits_tracing_events() {
        let caller = caller();
        let values = ParamMap::from([("id".to_string(), 3.into())]);
        caller.call("item", values).await.unwrap();

        assert!(logs_contain("api_request"));
        assert!(logs_contain("api.case=test"));
        assert!(logs_contain("Resolved endpoint"));
        assert!(logs_contain("Dispatching request"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_fault_conversion_is_logged() {
        let registry = Registry::new("test", "http://api.test")
            .unwrap()
            .with_endpoint(EndpointSpec::new("search", "/search"));
        let caller = ApiCaller::new(registry, Failing, SerdeCodec::new());

        let err = caller.call("search", ()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(502));
        assert!(logs_contain("Transport fault converted into a failed response"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_interceptors_are_logged() {
        let caller = caller().with_interceptor(|mut ctx: RequestContext| {
            ctx.path = "/rewritten".to_string();
            ctx
        });
        caller.call("search", ()).await.unwrap();

        assert_eq!(
            caller.transport().requests.lock().unwrap()[0].url,
            "http://api.test/rewritten"
        );
        assert!(logs_contain("Applied interceptors"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_failed_cast_is_not_reported_ok() {
        let registry = Registry::new("test", "http://api.test")
            .unwrap()
            .with_endpoint(
                EndpointSpec::new("widget", "/widget")
                    .with_response(ResponseSpec::new("Widget", WireFormat::Json)),
            );
        let caller = ApiCaller::new(registry, Recording::default(), SerdeCodec::new());

        let err = caller.call("widget", ()).await.unwrap_err();
        assert!(matches!(err, ApiError::Codec(_)));
        assert!(logs_contain("Response could not be cast into the declared type"));
        assert!(logs_contain("ERROR"));
        assert!(!logs_contain("otel.status_code=\"OK\""));
        assert!(!logs_contain("otel.status_code=OK"));
    }

    #[test]
    fn test_debug_summary() {
        let caller = caller().with_interceptor(|ctx: RequestContext| ctx);
        let debug = format!("{caller:?}");
        assert!(debug.contains("case: \"test\""));
        assert!(debug.contains("interceptors: 1"));
    }
}
