use crate::constants::DEFAULT_NONCE_LENGTH;
use crate::core::collection::HeaderPolicyCollection;
use crate::engine::resolution::PolicySelectorContext;
use crate::error::SecurityHeadersError;
use crate::monitoring::stats::SecurityHeadersStats;
use crate::security::nonce::{NonceGenerator, RandomSource};
use crate::utils::is_blank;
use rustc_hash::FxHashMap;
use std::{borrow::Cow, fmt, sync::Arc};

/// Picks the collection for a request after endpoint lookup.
pub type PolicySelector =
    Arc<dyn Fn(&PolicySelectorContext<'_>) -> Arc<HeaderPolicyCollection> + Send + Sync>;

/// Immutable middleware configuration shared by every worker.
#[derive(Clone)]
pub struct SecurityHeadersConfig {
    default_policy: Arc<HeaderPolicyCollection>,
    named_policies: Arc<FxHashMap<Cow<'static, str>, Arc<HeaderPolicyCollection>>>,
    selector: Option<PolicySelector>,
    nonce_generator: Arc<NonceGenerator>,
    stats: Arc<SecurityHeadersStats>,
}

impl SecurityHeadersConfig {
    /// A configuration serving `collection` to every request.
    pub fn new(collection: HeaderPolicyCollection) -> Self {
        Self {
            default_policy: Arc::new(collection),
            named_policies: Arc::new(FxHashMap::default()),
            selector: None,
            nonce_generator: Arc::new(NonceGenerator::default()),
            stats: Arc::new(SecurityHeadersStats::new()),
        }
    }

    #[inline]
    pub fn builder() -> SecurityHeadersConfigBuilder {
        SecurityHeadersConfigBuilder::new()
    }

    #[inline]
    pub fn default_policy(&self) -> &Arc<HeaderPolicyCollection> {
        &self.default_policy
    }

    #[inline]
    pub fn named_policy(&self, name: &str) -> Option<&Arc<HeaderPolicyCollection>> {
        self.named_policies.get(name)
    }

    pub fn policy_names(&self) -> impl Iterator<Item = &str> {
        self.named_policies.keys().map(|name| name.as_ref())
    }

    #[inline]
    pub fn selector(&self) -> Option<&PolicySelector> {
        self.selector.as_ref()
    }

    /// False when every request is served by the default collection, so the
    /// nonce can be generated before routing.
    #[inline]
    pub fn uses_endpoint_resolution(&self) -> bool {
        !self.named_policies.is_empty() || self.selector.is_some()
    }

    #[inline]
    pub fn nonce_generator(&self) -> &Arc<NonceGenerator> {
        &self.nonce_generator
    }

    #[inline]
    pub fn stats(&self) -> &Arc<SecurityHeadersStats> {
        &self.stats
    }
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self::new(HeaderPolicyCollection::default_security_headers())
    }
}

impl fmt::Debug for SecurityHeadersConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityHeadersConfig")
            .field("default_policy", &self.default_policy)
            .field("named_policies", &self.named_policies.keys().collect::<Vec<_>>())
            .field("selector", &self.selector.is_some())
            .field("nonce_generator", &self.nonce_generator)
            .finish()
    }
}

pub struct SecurityHeadersConfigBuilder {
    default_policy: Option<HeaderPolicyCollection>,
    named_policies: FxHashMap<Cow<'static, str>, Arc<HeaderPolicyCollection>>,
    selector: Option<PolicySelector>,
    nonce_length: Option<usize>,
    random_source: Option<Arc<dyn RandomSource>>,
}

impl Default for SecurityHeadersConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityHeadersConfigBuilder {
    pub fn new() -> Self {
        Self {
            default_policy: None,
            named_policies: FxHashMap::default(),
            selector: None,
            nonce_length: None,
            random_source: None,
        }
    }

    /// Collection for requests without endpoint metadata. Defaults to
    /// [`HeaderPolicyCollection::default_security_headers`].
    pub fn default_policy(mut self, collection: HeaderPolicyCollection) -> Self {
        self.default_policy = Some(collection);
        self
    }

    /// Registers a collection under `name`; a second registration with the
    /// same name replaces the first.
    pub fn add_policy(
        mut self,
        name: impl Into<Cow<'static, str>>,
        collection: HeaderPolicyCollection,
    ) -> Self {
        self.named_policies.insert(name.into(), Arc::new(collection));
        self
    }

    pub fn policy_selector<F>(mut self, selector: F) -> Self
    where
        F: Fn(&PolicySelectorContext<'_>) -> Arc<HeaderPolicyCollection> + Send + Sync + 'static,
    {
        self.selector = Some(Arc::new(selector));
        self
    }

    /// Nonce entropy in bytes.
    pub fn with_nonce_length(mut self, length: usize) -> Self {
        self.nonce_length = Some(length);
        self
    }

    pub fn with_random_source(mut self, source: Arc<dyn RandomSource>) -> Self {
        self.random_source = Some(source);
        self
    }

    pub fn build(self) -> Result<SecurityHeadersConfig, SecurityHeadersError> {
        if let Some(name) = self.named_policies.keys().find(|name| is_blank(name)) {
            return Err(SecurityHeadersError::InvalidArgument(format!(
                "policy name '{}' must not be empty",
                name
            )));
        }

        let length = self.nonce_length.unwrap_or(DEFAULT_NONCE_LENGTH);
        if length == 0 {
            return Err(SecurityHeadersError::ConfigError(
                "nonce length must be greater than zero".to_string(),
            ));
        }

        let nonce_generator = match self.random_source {
            Some(source) => NonceGenerator::with_source(length, source),
            None => NonceGenerator::new(length),
        };

        Ok(SecurityHeadersConfig {
            default_policy: Arc::new(
                self.default_policy
                    .unwrap_or_else(HeaderPolicyCollection::default_security_headers),
            ),
            named_policies: Arc::new(self.named_policies),
            selector: self.selector,
            nonce_generator: Arc::new(nonce_generator),
            stats: Arc::new(SecurityHeadersStats::new()),
        })
    }
}
