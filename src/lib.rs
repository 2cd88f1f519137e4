mod macros;

pub mod constants;
pub mod core;
pub mod engine;
pub mod error;
pub mod middleware;
pub mod monitoring;
pub mod prelude;
pub mod security;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::{
    ContentSecurityPolicy, ContentSecurityPolicyBuilder, HeaderPolicy, HeaderPolicyCollection,
    SecurityHeadersConfig, SecurityHeadersConfigBuilder, Source,
};
pub use engine::{EndpointPolicyMetadata, PolicyEvaluation};
pub use error::SecurityHeadersError;
pub use middleware::{
    security_headers, security_headers_with, EndpointPolicy, SecurityHeaders,
    SecurityHeadersExtensions,
};
pub use monitoring::SecurityHeadersStats;
pub use security::{HashAlgorithm, HashGenerator, InlineContext, NonceGenerator, RandomSource};
