//! Cross-Origin-Opener-Policy, Cross-Origin-Embedder-Policy and
//! Cross-Origin-Resource-Policy.
//!
//! None of these depend on the request, so the header value is rendered once
//! by [`CrossOriginPolicyBuilder::build`] and shared by every response.

use crate::constants::{HEADER_COEP, HEADER_COOP, HEADER_CORP};
use crate::error::SecurityHeadersError;
use crate::macros::string_enum;
use crate::utils::{has_line_break, is_blank};
use actix_web::http::header::{HeaderName, HeaderValue};
use std::{borrow::Cow, fmt};

/// A closed set of mutually exclusive values for one cross-origin header.
pub trait CrossOriginDirective: Copy + Default + fmt::Debug {
    const HEADER: &'static str;

    /// Whether the header accepts a `report-to` endpoint.
    const SUPPORTS_REPORTING: bool;

    fn as_str(&self) -> &'static str;
}

macro_rules! cross_origin_directive {
    (
        $(#[$meta:meta])*
        $name:ident, $header:expr, reporting = $reporting:expr, default = $default:ident,
        { $($variant:ident => $value:literal),+ $(,)? }
    ) => {
        string_enum!(
            $(#[$meta])*
            $name, $header,
            { $($variant => $value),+ }
        );

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl CrossOriginDirective for $name {
            const HEADER: &'static str = $header;
            const SUPPORTS_REPORTING: bool = $reporting;

            #[inline]
            fn as_str(&self) -> &'static str {
                $name::as_str(self)
            }
        }
    };
}

cross_origin_directive!(
    /// Cross-Origin-Opener-Policy values.
    OpenerPolicy, HEADER_COOP, reporting = true, default = SameOrigin,
    {
        UnsafeNone => "unsafe-none",
        SameOrigin => "same-origin",
        SameOriginAllowPopups => "same-origin-allow-popups",
    }
);

cross_origin_directive!(
    /// Cross-Origin-Embedder-Policy values.
    EmbedderPolicy, HEADER_COEP, reporting = true, default = RequireCorp,
    {
        UnsafeNone => "unsafe-none",
        RequireCorp => "require-corp",
        Credentialless => "credentialless",
    }
);

cross_origin_directive!(
    /// Cross-Origin-Resource-Policy values.
    ResourcePolicy, HEADER_CORP, reporting = false, default = SameOrigin,
    {
        SameSite => "same-site",
        SameOrigin => "same-origin",
        CrossOrigin => "cross-origin",
    }
);

/// A built cross-origin header with its value already rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossOriginPolicy {
    name: HeaderName,
    value: HeaderValue,
}

impl CrossOriginPolicy {
    #[inline]
    pub fn header_name(&self) -> &HeaderName {
        &self.name
    }

    #[inline]
    pub fn header_value(&self) -> &HeaderValue {
        &self.value
    }
}

#[derive(Debug, Clone)]
pub struct CrossOriginPolicyBuilder<D: CrossOriginDirective> {
    directive: D,
    report_endpoint: Option<Cow<'static, str>>,
}

pub type CrossOriginOpenerPolicyBuilder = CrossOriginPolicyBuilder<OpenerPolicy>;
pub type CrossOriginEmbedderPolicyBuilder = CrossOriginPolicyBuilder<EmbedderPolicy>;
pub type CrossOriginResourcePolicyBuilder = CrossOriginPolicyBuilder<ResourcePolicy>;

impl<D: CrossOriginDirective> Default for CrossOriginPolicyBuilder<D> {
    fn default() -> Self {
        Self {
            directive: D::default(),
            report_endpoint: None,
        }
    }
}

impl<D: CrossOriginDirective> CrossOriginPolicyBuilder<D> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the directive, replacing any earlier choice.
    #[inline]
    pub fn directive(mut self, directive: D) -> Self {
        self.directive = directive;
        self
    }

    /// Adds `report-to="{endpoint}"`.
    #[inline]
    pub fn report_to(mut self, endpoint: impl Into<Cow<'static, str>>) -> Self {
        self.report_endpoint = Some(endpoint.into());
        self
    }

    pub fn build(self) -> Result<CrossOriginPolicy, SecurityHeadersError> {
        let mut value = String::from(self.directive.as_str());

        if let Some(endpoint) = &self.report_endpoint {
            if !D::SUPPORTS_REPORTING {
                return Err(SecurityHeadersError::ConfigError(format!(
                    "{} does not support report-to",
                    D::HEADER
                )));
            }
            if is_blank(endpoint) || has_line_break(endpoint) || endpoint.contains('"') {
                return Err(SecurityHeadersError::InvalidArgument(format!(
                    "invalid {} report endpoint '{}'",
                    D::HEADER,
                    endpoint.escape_debug()
                )));
            }
            value.push_str("; report-to=\"");
            value.push_str(endpoint);
            value.push('"');
        }

        let value = HeaderValue::from_str(&value).map_err(|e| {
            SecurityHeadersError::InvalidHeader(format!("{}: {}", D::HEADER, e))
        })?;

        Ok(CrossOriginPolicy {
            name: HeaderName::from_static(D::HEADER),
            value,
        })
    }
}

impl CrossOriginPolicyBuilder<OpenerPolicy> {
    #[inline]
    pub fn unsafe_none(self) -> Self {
        self.directive(OpenerPolicy::UnsafeNone)
    }

    #[inline]
    pub fn same_origin(self) -> Self {
        self.directive(OpenerPolicy::SameOrigin)
    }

    #[inline]
    pub fn same_origin_allow_popups(self) -> Self {
        self.directive(OpenerPolicy::SameOriginAllowPopups)
    }
}

impl CrossOriginPolicyBuilder<EmbedderPolicy> {
    #[inline]
    pub fn unsafe_none(self) -> Self {
        self.directive(EmbedderPolicy::UnsafeNone)
    }

    #[inline]
    pub fn require_corp(self) -> Self {
        self.directive(EmbedderPolicy::RequireCorp)
    }

    #[inline]
    pub fn credentialless(self) -> Self {
        self.directive(EmbedderPolicy::Credentialless)
    }
}

impl CrossOriginPolicyBuilder<ResourcePolicy> {
    #[inline]
    pub fn same_site(self) -> Self {
        self.directive(ResourcePolicy::SameSite)
    }

    #[inline]
    pub fn same_origin(self) -> Self {
        self.directive(ResourcePolicy::SameOrigin)
    }

    #[inline]
    pub fn cross_origin(self) -> Self {
        self.directive(ResourcePolicy::CrossOrigin)
    }
}
