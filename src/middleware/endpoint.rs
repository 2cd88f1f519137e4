use crate::core::config::SecurityHeadersConfig;
use crate::engine::evaluation::PolicyEvaluation;
use crate::engine::resolution::{resolve_policy, EndpointPolicyMetadata};
use crate::security::state::RequestSecurityState;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, Ready};
use std::{borrow::Cow, sync::Arc};

/// Route-level marker selecting a named header policy collection.
///
/// Under [`SecurityHeaders`](crate::middleware::headers::SecurityHeaders) the
/// collection is resolved here, after routing and before the handler, and the
/// nonce is generated when that collection renders one.
///
/// ```ignore
/// web::resource("/embed")
///     .wrap(EndpointPolicy::new("CustomHeader"))
///     .route(web::get().to(embed))
/// ```
#[derive(Debug, Clone)]
pub struct EndpointPolicy {
    metadata: EndpointPolicyMetadata,
}

impl EndpointPolicy {
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            metadata: EndpointPolicyMetadata::new(name),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for EndpointPolicy
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = EndpointPolicyService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(EndpointPolicyService {
            service,
            metadata: self.metadata.clone(),
        }))
    }
}

pub struct EndpointPolicyService<S> {
    service: S,
    metadata: EndpointPolicyMetadata,
}

impl<S, B> Service<ServiceRequest> for EndpointPolicyService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = S::Future;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        req.extensions_mut().insert(self.metadata.clone());

        let config = req.extensions().get::<Arc<SecurityHeadersConfig>>().cloned();
        if let Some(config) = config {
            let mut evaluation =
                PolicyEvaluation::new(resolve_policy(&config, req.request()).collection);
            if let Some(state) = req.extensions().get::<RequestSecurityState>() {
                evaluation.begin(state);
            }
            req.extensions_mut().insert(evaluation);
        }

        self.service.call(req)
    }
}
