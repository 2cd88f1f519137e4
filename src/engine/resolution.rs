use crate::core::collection::HeaderPolicyCollection;
use crate::core::config::SecurityHeadersConfig;
use actix_web::{HttpMessage, HttpRequest};
use std::{borrow::Cow, sync::Arc};

/// Names the header policy collection a route wants. Placed in the request
/// extensions by [`EndpointPolicy`](crate::middleware::endpoint::EndpointPolicy).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointPolicyMetadata {
    name: Cow<'static, str>,
}

impl EndpointPolicyMetadata {
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Input to the optional policy selector hook.
#[derive(Debug, Clone, Copy)]
pub struct PolicySelectorContext<'a> {
    pub request: &'a HttpRequest,
    pub endpoint_policy: Option<&'a str>,
    /// The collection chosen before the hook ran.
    pub selected: &'a Arc<HeaderPolicyCollection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicySource {
    Default,
    Named,
    /// The endpoint named a collection that is not configured.
    UnknownName,
}

#[derive(Debug, Clone)]
pub struct ResolvedPolicy {
    pub collection: Arc<HeaderPolicyCollection>,
    pub source: PolicySource,
}

/// Looks up `name` in the configured collections. Unknown names fall back
/// to the default collection with a warning.
pub fn resolve_named_policy(config: &SecurityHeadersConfig, name: Option<&str>) -> ResolvedPolicy {
    let Some(name) = name else {
        return ResolvedPolicy {
            collection: config.default_policy().clone(),
            source: PolicySource::Default,
        };
    };

    match config.named_policy(name) {
        Some(collection) => ResolvedPolicy {
            collection: collection.clone(),
            source: PolicySource::Named,
        },
        None => {
            log::warn!(
                "Endpoint security header policy '{}' is not configured, using the default policy",
                name
            );
            config.stats().increment_policy_lookup_misses();
            ResolvedPolicy {
                collection: config.default_policy().clone(),
                source: PolicySource::UnknownName,
            }
        }
    }
}

/// The collection for `request`: endpoint metadata lookup, then the selector
/// hook when one is configured.
pub fn resolve_policy(config: &SecurityHeadersConfig, request: &HttpRequest) -> ResolvedPolicy {
    let metadata = request.extensions().get::<EndpointPolicyMetadata>().cloned();
    let endpoint_policy = metadata.as_ref().map(EndpointPolicyMetadata::name);

    let mut resolved = resolve_named_policy(config, endpoint_policy);

    if let Some(selector) = config.selector() {
        let ctx = PolicySelectorContext {
            request,
            endpoint_policy,
            selected: &resolved.collection,
        };
        resolved.collection = selector(&ctx);
    }

    resolved
}
