//! Per-case caller cache.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::executor::ApiCaller;
use crate::codec::Codec;
use crate::config::ApiCallerConfig;
use crate::context::RequestInterceptor;
use crate::error::ConfigError;
use crate::registry::Registry;
use crate::transport::Transport;

type CallerCache<T> = RwLock<HashMap<String, Arc<ApiCaller<T>>>>;

/// Hands out one shared [`ApiCaller`] per configured case.
///
/// Callers are created lazily on first use and cached by case name. All
/// callers share the factory's transport, codec and interceptors.
///
/// ## Examples
///
/// ```rust,ignore
/// use api_caller::{ApiCallerConfig, ApiCallerFactory, HttpTransport, SerdeCodec};
///
/// let config = ApiCallerConfig::from_path("callers.yaml")?;
/// let factory = ApiCallerFactory::new(config, HttpTransport::new()?, SerdeCodec::new());
///
/// let shop = factory.caller("shop")?;
/// let response = shop.call("list_items", ()).await?;
/// ```
pub struct ApiCallerFactory<T> {
    config: ApiCallerConfig,
    transport: Arc<T>,
    codec: Arc<dyn Codec>,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
    callers: CallerCache<T>,
}

impl<T: Transport> ApiCallerFactory<T> {
    pub fn new(config: ApiCallerConfig, transport: T, codec: impl Codec + 'static) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
            codec: Arc::new(codec),
            interceptors: Vec::new(),
            callers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers an interceptor applied by every caller this factory creates.
    pub fn with_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn config(&self) -> &ApiCallerConfig {
        &self.config
    }

    /// Returns the cached caller for `case`, creating it on first use.
    ///
    /// Concurrent first calls for the same case create a single caller.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::UnknownCase`] if the case is not configured, or
    /// any error from resolving its registry.
    pub fn caller(&self, case: &str) -> Result<Arc<ApiCaller<T>>, ConfigError> {
        {
            let cache = self
                .callers
                .read()
                .map_err(|_| ConfigError::CachePoisoned)?;
            if let Some(caller) = cache.get(case) {
                return Ok(Arc::clone(caller));
            }
        }

        let mut cache = self
            .callers
            .write()
            .map_err(|_| ConfigError::CachePoisoned)?;
        if let Some(caller) = cache.get(case) {
            return Ok(Arc::clone(caller));
        }

        let caller = Arc::new(self.build(case, Arc::clone(&self.transport))?);
        cache.insert(case.to_string(), Arc::clone(&caller));
        debug!(case, domain = caller.registry().domain(), "Created API caller");

        Ok(caller)
    }

    /// Builds an uncached caller for `case` bound to another transport.
    pub fn caller_with_transport<U: Transport>(
        &self,
        case: &str,
        transport: U,
    ) -> Result<ApiCaller<U>, ConfigError> {
        self.build(case, Arc::new(transport))
    }

    /// Number of callers created so far.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::CachePoisoned`] if a thread panicked while
    /// holding the cache lock.
    pub fn cached_len(&self) -> Result<usize, ConfigError> {
        let cache = self
            .callers
            .read()
            .map_err(|_| ConfigError::CachePoisoned)?;
        Ok(cache.len())
    }

    fn build<U: Transport>(&self, case: &str, transport: Arc<U>) -> Result<ApiCaller<U>, ConfigError> {
        let registry = Registry::resolve(case, self.config.case(case)?)?;
        Ok(
            ApiCaller::from_parts(Arc::new(registry), transport, Arc::clone(&self.codec))
                .with_interceptors(&self.interceptors),
        )
    }
}

impl<T> std::fmt::Debug for ApiCallerFactory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCallerFactory")
            .field("cases", &self.config.cases.keys().collect::<Vec<_>>())
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}
