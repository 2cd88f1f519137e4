pub mod endpoint;
pub mod extensions;
pub mod headers;

pub use endpoint::{EndpointPolicy, EndpointPolicyService};
pub use extensions::SecurityHeadersExtensions;
pub use headers::{security_headers, security_headers_with, SecurityHeaders, SecurityHeadersService};
