use crate::core::collection::HeaderPolicyCollection;
use crate::core::config::SecurityHeadersConfig;
use crate::engine::context::PolicyContext;
use crate::engine::evaluation::PolicyEvaluation;
use crate::engine::resolution::resolve_policy;
use crate::security::state::RequestSecurityState;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::CONTENT_TYPE,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::{rc::Rc, sync::Arc};

/// Writes the configured security headers on every response.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    config: Arc<SecurityHeadersConfig>,
}

impl SecurityHeaders {
    #[inline]
    pub fn new(config: SecurityHeadersConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    #[inline]
    pub fn config(&self) -> Arc<SecurityHeadersConfig> {
        self.config.clone()
    }
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self::new(SecurityHeadersConfig::default())
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SecurityHeadersService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityHeadersService {
            service: Rc::new(service),
            config: self.config.clone(),
        }))
    }
}

pub struct SecurityHeadersService<S> {
    service: Rc<S>,
    config: Arc<SecurityHeadersConfig>,
}

impl<S, B> Service<ServiceRequest> for SecurityHeadersService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let config = self.config.clone();

        Box::pin(async move {
            config.stats().increment_request_count();

            let state = RequestSecurityState::new(config.nonce_generator().clone());
            let mut evaluation =
                PolicyEvaluation::new(resolve_policy(&config, req.request()).collection);

            // A route-level EndpointPolicy may still replace the collection.
            if config.uses_endpoint_resolution() {
                evaluation.prepare(&state);
            } else {
                evaluation.begin(&state);
            }

            let is_https = req.connection_info().scheme() == "https";
            {
                let mut extensions = req.extensions_mut();
                extensions.insert(state);
                extensions.insert(evaluation);
                extensions.insert(config.clone());
            }

            let mut res = service.call(req).await?;

            let mut extensions = res.request().extensions_mut();
            let state = extensions.remove::<RequestSecurityState>();
            let evaluation = extensions.remove::<PolicyEvaluation>();
            extensions.remove::<Arc<SecurityHeadersConfig>>();
            drop(extensions);

            let state =
                state.unwrap_or_else(|| RequestSecurityState::new(config.nonce_generator().clone()));
            let mut evaluation = evaluation.unwrap_or_else(|| {
                PolicyEvaluation::new(resolve_policy(&config, res.request()).collection)
            });

            let path = res.request().path().to_owned();
            let content_type = res
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            let ctx = PolicyContext {
                path: &path,
                content_type: content_type.as_deref(),
                is_https,
                state: &state,
            };
            let outcome = evaluation.write_headers(&ctx, res.headers_mut());
            evaluation.finish();

            if state.has_nonce() {
                config.stats().increment_nonce_generation_count();
            }
            config.stats().record_outcome(&outcome);

            Ok(res)
        })
    }
}

#[inline]
pub fn security_headers() -> SecurityHeaders {
    SecurityHeaders::default()
}

#[inline]
pub fn security_headers_with(collection: HeaderPolicyCollection) -> SecurityHeaders {
    SecurityHeaders::new(SecurityHeadersConfig::new(collection))
}
