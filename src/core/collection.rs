use crate::constants::DEFAULT_DOCUMENT_CONTENT_TYPES;
use crate::core::cross_origin::{
    CrossOriginEmbedderPolicyBuilder, CrossOriginOpenerPolicyBuilder,
    CrossOriginResourcePolicyBuilder,
};
use crate::core::csp::{ContentSecurityPolicy, ContentSecurityPolicyBuilder};
use crate::core::directives::SourceListDirective;
use crate::core::headers::{
    CustomHeader, PermissionsPolicy, ReferrerPolicy, ReportingEndpoints, StrictTransportSecurity,
    XContentTypeOptions, XFrameOptions, XssProtection,
};
use crate::core::policy::HeaderPolicy;
use crate::error::SecurityHeadersError;
use crate::utils::{is_blank, starts_with_ignore_ascii_case};
use actix_web::http::header::HeaderName;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::borrow::Cow;

type ContentTypePrefixes = SmallVec<[Cow<'static, str>; 4]>;

/// An ordered set of header policies keyed by header name.
///
/// Built once at startup, then frozen inside an `Arc` by
/// [`SecurityHeadersConfigBuilder::build`](crate::core::config::SecurityHeadersConfigBuilder::build).
#[derive(Debug, Clone)]
pub struct HeaderPolicyCollection {
    policies: IndexMap<HeaderName, HeaderPolicy>,
    /// `None` applies document headers to every response.
    document_content_types: Option<ContentTypePrefixes>,
}

impl Default for HeaderPolicyCollection {
    fn default() -> Self {
        Self {
            policies: IndexMap::new(),
            document_content_types: Some(
                DEFAULT_DOCUMENT_CONTENT_TYPES
                    .iter()
                    .map(|prefix| Cow::Borrowed(*prefix))
                    .collect(),
            ),
        }
    }
}

impl HeaderPolicyCollection {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a policy, replacing any policy for the same header while
    /// keeping its original position.
    pub fn set(mut self, policy: impl Into<HeaderPolicy>) -> Self {
        let policy = policy.into();
        self.policies.insert(policy.header_name(), policy);
        self
    }

    pub fn add_frame_options_deny(self) -> Self {
        self.set(XFrameOptions::Deny)
    }

    pub fn add_frame_options_sameorigin(self) -> Self {
        self.set(XFrameOptions::SameOrigin)
    }

    pub fn add_content_type_options_nosniff(self) -> Self {
        self.set(XContentTypeOptions::NoSniff)
    }

    /// HSTS with the default one year max-age.
    pub fn add_strict_transport_security(self) -> Self {
        self.set(StrictTransportSecurity::default())
    }

    pub fn add_strict_transport_security_max_age(self, seconds: u64) -> Self {
        self.set(StrictTransportSecurity::max_age(seconds))
    }

    pub fn add_strict_transport_security_with(self, hsts: StrictTransportSecurity) -> Self {
        self.set(hsts)
    }

    /// `max-age=0`, telling browsers to forget an earlier HSTS policy.
    pub fn add_strict_transport_security_no_cache(self) -> Self {
        self.set(StrictTransportSecurity::no_cache())
    }

    pub fn add_referrer_policy(self, policy: ReferrerPolicy) -> Self {
        self.set(policy)
    }

    pub fn add_referrer_policy_no_referrer(self) -> Self {
        self.set(ReferrerPolicy::NoReferrer)
    }

    pub fn add_referrer_policy_same_origin(self) -> Self {
        self.set(ReferrerPolicy::SameOrigin)
    }

    pub fn add_referrer_policy_strict_origin(self) -> Self {
        self.set(ReferrerPolicy::StrictOrigin)
    }

    pub fn add_referrer_policy_strict_origin_when_cross_origin(self) -> Self {
        self.set(ReferrerPolicy::StrictOriginWhenCrossOrigin)
    }

    pub fn add_content_security_policy(self, policy: ContentSecurityPolicy) -> Self {
        self.set(policy)
    }

    /// Builds a CSP from `configure` and adds it.
    pub fn add_content_security_policy_with(
        self,
        configure: impl FnOnce(ContentSecurityPolicyBuilder) -> ContentSecurityPolicyBuilder,
    ) -> Result<Self, SecurityHeadersError> {
        let policy = configure(ContentSecurityPolicyBuilder::new()).build()?;
        Ok(self.set(policy))
    }

    pub fn add_cross_origin_opener_policy(
        self,
        configure: impl FnOnce(CrossOriginOpenerPolicyBuilder) -> CrossOriginOpenerPolicyBuilder,
    ) -> Result<Self, SecurityHeadersError> {
        let policy = configure(CrossOriginOpenerPolicyBuilder::new()).build()?;
        Ok(self.set(HeaderPolicy::CrossOriginOpenerPolicy(policy)))
    }

    pub fn add_cross_origin_embedder_policy(
        self,
        configure: impl FnOnce(CrossOriginEmbedderPolicyBuilder) -> CrossOriginEmbedderPolicyBuilder,
    ) -> Result<Self, SecurityHeadersError> {
        let policy = configure(CrossOriginEmbedderPolicyBuilder::new()).build()?;
        Ok(self.set(HeaderPolicy::CrossOriginEmbedderPolicy(policy)))
    }

    pub fn add_cross_origin_resource_policy(
        self,
        configure: impl FnOnce(CrossOriginResourcePolicyBuilder) -> CrossOriginResourcePolicyBuilder,
    ) -> Result<Self, SecurityHeadersError> {
        let policy = configure(CrossOriginResourcePolicyBuilder::new()).build()?;
        Ok(self.set(HeaderPolicy::CrossOriginResourcePolicy(policy)))
    }

    pub fn add_permissions_policy(self, policy: PermissionsPolicy) -> Self {
        self.set(policy)
    }

    pub fn add_xss_protection_disabled(self) -> Self {
        self.set(XssProtection::Disabled)
    }

    pub fn add_xss_protection_block(self) -> Self {
        self.set(XssProtection::Block)
    }

    pub fn add_reporting_endpoints(self, endpoints: ReportingEndpoints) -> Self {
        self.set(endpoints)
    }

    pub fn remove_server_header(self) -> Self {
        self.set(HeaderPolicy::remove_server_header())
    }

    pub fn remove_custom_header(self, name: &str) -> Result<Self, SecurityHeadersError> {
        let name = parse_header_name(name)?;
        Ok(self.set(HeaderPolicy::RemoveHeader(name)))
    }

    pub fn add_custom_header(self, name: &str, value: &str) -> Result<Self, SecurityHeadersError> {
        let header = CustomHeader::new(name, value)?;
        Ok(self.set(header))
    }

    /// Restricts document headers to responses whose content type starts
    /// with one of `prefixes` (ASCII case-insensitive).
    pub fn apply_document_headers_to_content_types<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        self.document_content_types = Some(prefixes.into_iter().map(Into::into).collect());
        self
    }

    pub fn apply_document_headers_to_all_responses(mut self) -> Self {
        self.document_content_types = None;
        self
    }

    /// Whether `policy` applies to a response with `content_type`. A
    /// response without a content type is not a document.
    pub fn is_applicable(&self, policy: &HeaderPolicy, content_type: Option<&str>) -> bool {
        if !policy.is_document_header() {
            return true;
        }
        let Some(prefixes) = &self.document_content_types else {
            return true;
        };
        content_type.map_or(false, |content_type| {
            let content_type = content_type.trim_start();
            prefixes
                .iter()
                .any(|prefix| starts_with_ignore_ascii_case(content_type, prefix))
        })
    }

    #[inline]
    pub fn document_content_types(&self) -> Option<&[Cow<'static, str>]> {
        self.document_content_types.as_deref()
    }

    /// Case-insensitive lookup by header name.
    pub fn get(&self, name: &str) -> Option<&HeaderPolicy> {
        let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
        self.policies.get(&name)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &HeaderPolicy> {
        self.policies.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn has_per_request_values(&self) -> bool {
        self.policies.values().any(HeaderPolicy::has_per_request_values)
    }

    pub fn requires_nonce(&self) -> bool {
        self.policies.values().any(HeaderPolicy::requires_nonce)
    }

    /// The baseline set: frame denial, nosniff, one year HSTS, a strict
    /// referrer policy, no `Server` header, a minimal CSP and COOP
    /// same-origin.
    pub fn default_security_headers() -> Self {
        let csp = ContentSecurityPolicyBuilder::new()
            .object_src(|d| d.none())
            .form_action(|d| d.self_())
            .frame_ancestors(|d| d.none())
            .build();

        let mut collection = Self::new()
            .add_frame_options_deny()
            .add_content_type_options_nosniff()
            .add_strict_transport_security()
            .add_referrer_policy_strict_origin_when_cross_origin()
            .remove_server_header();

        match csp {
            Ok(csp) => collection = collection.add_content_security_policy(csp),
            Err(e) => log::error!("Default content security policy is invalid: {}", e),
        }

        match CrossOriginOpenerPolicyBuilder::new().same_origin().build() {
            Ok(coop) => collection.set(HeaderPolicy::CrossOriginOpenerPolicy(coop)),
            Err(e) => {
                log::error!("Default cross-origin opener policy is invalid: {}", e);
                collection
            }
        }
    }
}

fn parse_header_name(name: &str) -> Result<HeaderName, SecurityHeadersError> {
    if is_blank(name) {
        return Err(SecurityHeadersError::InvalidArgument(
            "header name must not be empty".to_string(),
        ));
    }
    HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|e| SecurityHeadersError::InvalidHeader(format!("'{}': {}", name, e)))
}
