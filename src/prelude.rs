pub use crate::core::{
    ContentSecurityPolicy, ContentSecurityPolicyBuilder, HashTagHelperDirective, HeaderPolicy,
    HeaderPolicyCollection, InlineSourceDirective, SecurityHeadersConfig,
    SecurityHeadersConfigBuilder, Source, SourceListDirective,
};
pub use crate::error::SecurityHeadersError;
pub use crate::middleware::{
    security_headers, security_headers_with, EndpointPolicy, SecurityHeaders,
    SecurityHeadersExtensions,
};
pub use crate::monitoring::SecurityHeadersStats;
pub use crate::security::{HashAlgorithm, InlineContext};
