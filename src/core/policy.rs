use crate::constants::{HEADER_COEP, HEADER_COOP, HEADER_SERVER};
use crate::core::cross_origin::CrossOriginPolicy;
use crate::core::csp::ContentSecurityPolicy;
use crate::core::headers::{
    CustomHeader, PermissionsPolicy, ReferrerPolicy, ReportingEndpoints, StrictTransportSecurity,
    XContentTypeOptions, XFrameOptions, XssProtection,
};
use crate::engine::context::PolicyContext;
use actix_web::http::header::{HeaderName, HeaderValue};

/// What a policy asks the engine to do with its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderResult {
    Set(HeaderName, HeaderValue),
    Remove(HeaderName),
}

impl HeaderResult {
    #[inline]
    pub fn name(&self) -> &HeaderName {
        match self {
            HeaderResult::Set(name, _) | HeaderResult::Remove(name) => name,
        }
    }
}

/// One response header and how to produce it.
#[derive(Debug, Clone)]
pub enum HeaderPolicy {
    /// Content-Security-Policy or, when built report-only,
    /// Content-Security-Policy-Report-Only.
    ContentSecurityPolicy(ContentSecurityPolicy),
    CrossOriginOpenerPolicy(CrossOriginPolicy),
    CrossOriginEmbedderPolicy(CrossOriginPolicy),
    CrossOriginResourcePolicy(CrossOriginPolicy),
    StrictTransportSecurity(StrictTransportSecurity),
    XFrameOptions(XFrameOptions),
    XContentTypeOptions(XContentTypeOptions),
    ReferrerPolicy(ReferrerPolicy),
    PermissionsPolicy(PermissionsPolicy),
    XssProtection(XssProtection),
    ReportingEndpoints(ReportingEndpoints),
    /// Deletes the header; `server` by default.
    RemoveHeader(HeaderName),
    Custom(CustomHeader),
}

impl HeaderPolicy {
    #[inline]
    pub fn remove_server_header() -> Self {
        HeaderPolicy::RemoveHeader(HeaderName::from_static(HEADER_SERVER))
    }

    pub fn header_name(&self) -> HeaderName {
        match self {
            HeaderPolicy::ContentSecurityPolicy(csp) => csp.header_name(),
            HeaderPolicy::CrossOriginOpenerPolicy(policy)
            | HeaderPolicy::CrossOriginEmbedderPolicy(policy)
            | HeaderPolicy::CrossOriginResourcePolicy(policy) => policy.header_name().clone(),
            HeaderPolicy::StrictTransportSecurity(hsts) => hsts.header_name(),
            HeaderPolicy::XFrameOptions(xfo) => xfo.header_name(),
            HeaderPolicy::XContentTypeOptions(xcto) => xcto.header_name(),
            HeaderPolicy::ReferrerPolicy(referrer) => referrer.header_name(),
            HeaderPolicy::PermissionsPolicy(permissions) => permissions.header_name(),
            HeaderPolicy::XssProtection(xss) => xss.header_name(),
            HeaderPolicy::ReportingEndpoints(endpoints) => endpoints.header_name(),
            HeaderPolicy::RemoveHeader(name) => name.clone(),
            HeaderPolicy::Custom(custom) => custom.header_name().clone(),
        }
    }

    /// Headers that only make sense on documents and are subject to the
    /// collection's content-type gate.
    #[inline]
    pub fn is_document_header(&self) -> bool {
        matches!(
            self,
            HeaderPolicy::ContentSecurityPolicy(_)
                | HeaderPolicy::CrossOriginOpenerPolicy(_)
                | HeaderPolicy::CrossOriginEmbedderPolicy(_)
                | HeaderPolicy::CrossOriginResourcePolicy(_)
                | HeaderPolicy::XFrameOptions(_)
                | HeaderPolicy::ReferrerPolicy(_)
        )
    }

    #[inline]
    pub fn has_per_request_values(&self) -> bool {
        match self {
            HeaderPolicy::ContentSecurityPolicy(csp) => csp.has_per_request_values(),
            _ => false,
        }
    }

    #[inline]
    pub fn requires_nonce(&self) -> bool {
        match self {
            HeaderPolicy::ContentSecurityPolicy(csp) => csp.requires_nonce(),
            _ => false,
        }
    }

    /// Renders the header for one request. `None` means the policy does
    /// not apply to it; content-type gating is the collection's job.
    pub fn evaluate(&self, ctx: &PolicyContext<'_>) -> Option<HeaderResult> {
        let name = self.header_name();
        let value = match self {
            HeaderPolicy::ContentSecurityPolicy(csp) => match csp.header_value(ctx.state) {
                Ok(value) if !value.is_empty() => value,
                Ok(_) => return None,
                Err(e) => {
                    log::error!("Failed to render {}: {}", name, e);
                    return None;
                }
            },
            HeaderPolicy::CrossOriginOpenerPolicy(policy)
            | HeaderPolicy::CrossOriginEmbedderPolicy(policy)
            | HeaderPolicy::CrossOriginResourcePolicy(policy) => policy.header_value().clone(),
            HeaderPolicy::StrictTransportSecurity(hsts) => {
                if hsts.is_https_only() && !ctx.is_https {
                    return None;
                }
                hsts.header_value().clone()
            }
            HeaderPolicy::XFrameOptions(xfo) => xfo.header_value(),
            HeaderPolicy::XContentTypeOptions(xcto) => xcto.header_value(),
            HeaderPolicy::ReferrerPolicy(referrer) => referrer.header_value(),
            HeaderPolicy::PermissionsPolicy(permissions) => permissions.header_value().clone(),
            HeaderPolicy::XssProtection(xss) => xss.header_value(),
            HeaderPolicy::ReportingEndpoints(endpoints) => endpoints.header_value().clone(),
            HeaderPolicy::RemoveHeader(_) => return Some(HeaderResult::Remove(name)),
            HeaderPolicy::Custom(custom) => custom.header_value().clone(),
        };
        Some(HeaderResult::Set(name, value))
    }
}

impl From<ContentSecurityPolicy> for HeaderPolicy {
    fn from(csp: ContentSecurityPolicy) -> Self {
        HeaderPolicy::ContentSecurityPolicy(csp)
    }
}

impl From<CrossOriginPolicy> for HeaderPolicy {
    fn from(policy: CrossOriginPolicy) -> Self {
        match policy.header_name().as_str() {
            HEADER_COOP => HeaderPolicy::CrossOriginOpenerPolicy(policy),
            HEADER_COEP => HeaderPolicy::CrossOriginEmbedderPolicy(policy),
            _ => HeaderPolicy::CrossOriginResourcePolicy(policy),
        }
    }
}

impl From<StrictTransportSecurity> for HeaderPolicy {
    fn from(hsts: StrictTransportSecurity) -> Self {
        HeaderPolicy::StrictTransportSecurity(hsts)
    }
}

impl From<XFrameOptions> for HeaderPolicy {
    fn from(xfo: XFrameOptions) -> Self {
        HeaderPolicy::XFrameOptions(xfo)
    }
}

impl From<XContentTypeOptions> for HeaderPolicy {
    fn from(xcto: XContentTypeOptions) -> Self {
        HeaderPolicy::XContentTypeOptions(xcto)
    }
}

impl From<ReferrerPolicy> for HeaderPolicy {
    fn from(referrer: ReferrerPolicy) -> Self {
        HeaderPolicy::ReferrerPolicy(referrer)
    }
}

impl From<PermissionsPolicy> for HeaderPolicy {
    fn from(permissions: PermissionsPolicy) -> Self {
        HeaderPolicy::PermissionsPolicy(permissions)
    }
}

impl From<XssProtection> for HeaderPolicy {
    fn from(xss: XssProtection) -> Self {
        HeaderPolicy::XssProtection(xss)
    }
}

impl From<ReportingEndpoints> for HeaderPolicy {
    fn from(endpoints: ReportingEndpoints) -> Self {
        HeaderPolicy::ReportingEndpoints(endpoints)
    }
}

impl From<CustomHeader> for HeaderPolicy {
    fn from(custom: CustomHeader) -> Self {
        HeaderPolicy::Custom(custom)
    }
}
