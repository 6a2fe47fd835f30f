//! Pre-dispatch interception and post-dispatch observation hooks.

use std::sync::Arc;

use crate::endpoint::EndpointSpec;
use crate::method::RestMethod;
use crate::transport::ResponseContent;
use crate::value::{Headers, ParamMap};

/// The assembled request as seen by interceptors.
///
/// One context exists per call and is never shared between calls.
/// Interceptors may replace the public fields; the identifying fields are
/// read-only.
#[derive(Debug, Clone)]
pub struct RequestContext {
    case: String,
    endpoint: String,
    spec: Arc<EndpointSpec>,
    values: ParamMap,
    /// Built path, relative to the domain.
    pub path: String,
    /// Body (or query) parameters.
    pub body: ParamMap,
    pub files: ParamMap,
    pub headers: Headers,
}

impl RequestContext {
    pub(crate) fn new(
        case: impl Into<String>,
        spec: Arc<EndpointSpec>,
        values: ParamMap,
        path: String,
        body: ParamMap,
        files: ParamMap,
        headers: Headers,
    ) -> Self {
        Self {
            case: case.into(),
            endpoint: spec.name().to_string(),
            spec,
            values,
            path,
            body,
            files,
            headers,
        }
    }

    /// Name of the case the call was made through.
    pub fn case(&self) -> &str {
        &self.case
    }

    /// Name of the endpoint being called.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn spec(&self) -> &EndpointSpec {
        &self.spec
    }

    /// The call's normalized input values.
    pub fn values(&self) -> &ParamMap {
        &self.values
    }
}

/// Rewrites an assembled request before it is sent.
///
/// Interceptors run synchronously in registration order; each receives the
/// context returned by the previous one. Any closure of the right shape is
/// an interceptor.
///
/// ## Examples
///
/// ```rust
/// use api_caller::RequestContext;
///
/// let stamp = |mut ctx: RequestContext| {
///     ctx.headers.insert("X-Case".to_string(), ctx.case().to_string());
///     ctx
/// };
/// # let _: &dyn api_caller::RequestInterceptor = &stamp;
/// ```
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, context: RequestContext) -> RequestContext;
}

impl<F> RequestInterceptor for F
where
    F: Fn(RequestContext) -> RequestContext + Send + Sync,
{
    fn intercept(&self, context: RequestContext) -> RequestContext {
        self(context)
    }
}

/// Observes a call after dispatch, whatever its outcome.
///
/// Listeners see the final URL, the body parameters that were sent, the
/// raw response content and status, and the method. They cannot alter the
/// call.
pub trait RequestListener: Send + Sync {
    fn on_request(
        &self,
        url: &str,
        body: &ParamMap,
        content: &ResponseContent,
        status: u16,
        method: RestMethod,
    );
}

impl<F> RequestListener for F
where
    F: Fn(&str, &ParamMap, &ResponseContent, u16, RestMethod) + Send + Sync,
{
    fn on_request(
        &self,
        url: &str,
        body: &ParamMap,
        content: &ResponseContent,
        status: u16,
        method: RestMethod,
    ) {
        self(url, body, content, status, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn context() -> RequestContext {
        let spec = Arc::new(EndpointSpec::new("get_item", "/items/{id}"));
        RequestContext::new(
            "shop",
            spec,
            ParamMap::from([("id".to_string(), 1.into())]),
            "/items/1".to_string(),
            ParamMap::new(),
            ParamMap::new(),
            Headers::new(),
        )
    }

    #[test]
    fn test_identity_fields() {
        let ctx = context();
        assert_eq!(ctx.case(), "shop");
        assert_eq!(ctx.endpoint(), "get_item");
        assert_eq!(ctx.spec().path(), "/items/{id}");
        assert_eq!(ctx.values().len(), 1);
    }

    #[test]
    fn test_closure_interceptor_rewrites() {
        let interceptor = |mut ctx: RequestContext| {
            ctx.path = format!("/v2{}", ctx.path);
            ctx
        };
        let ctx = interceptor.intercept(context());
        assert_eq!(ctx.path, "/v2/items/1");
    }

    #[test]
    fn test_closure_listener_observes() {
        let seen = Mutex::new(Vec::new());
        let listener = |url: &str, _: &ParamMap, content: &ResponseContent, status: u16, method: RestMethod| {
            seen.lock()
                .unwrap()
                .push(format!("{method} {url} {status} {content}"));
        };
        listener.on_request(
            "http://x/items/1",
            &ParamMap::new(),
            &ResponseContent::from("ok"),
            200,
            RestMethod::Get,
        );
        assert_eq!(seen.into_inner().unwrap(), ["GET http://x/items/1 200 ok"]);
    }
}
