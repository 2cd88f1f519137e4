pub mod collection;
pub mod config;
pub mod cross_origin;
pub mod csp;
pub mod directives;
pub mod headers;
pub mod policy;
pub mod source;

pub use collection::HeaderPolicyCollection;
pub use config::{PolicySelector, SecurityHeadersConfig, SecurityHeadersConfigBuilder};
pub use cross_origin::{
    CrossOriginDirective, CrossOriginEmbedderPolicyBuilder, CrossOriginOpenerPolicyBuilder,
    CrossOriginPolicy, CrossOriginPolicyBuilder, CrossOriginResourcePolicyBuilder, EmbedderPolicy,
    OpenerPolicy, ResourcePolicy,
};
pub use csp::{ContentSecurityPolicy, ContentSecurityPolicyBuilder};
pub use directives::*;
pub use headers::{
    Allowlist, CustomHeader, PermissionsFeature, PermissionsPolicy, PermissionsPolicyBuilder,
    ReferrerPolicy, ReportingEndpoints, ReportingEndpointsBuilder, StrictTransportSecurity,
    XContentTypeOptions, XFrameOptions, XssProtection,
};
pub use policy::{HeaderPolicy, HeaderResult};
pub use source::Source;
