use crate::constants::{
    DEFAULT_HSTS_MAX_AGE_SECS, HEADER_HSTS, HEADER_PERMISSIONS_POLICY, HEADER_REFERRER_POLICY,
    HEADER_REPORTING_ENDPOINTS, HEADER_X_CONTENT_TYPE_OPTIONS, HEADER_X_FRAME_OPTIONS,
    HEADER_X_XSS_PROTECTION,
};
use crate::error::SecurityHeadersError;
use crate::macros::string_enum;
use crate::utils::{has_line_break, is_blank};
use actix_web::http::header::{HeaderName, HeaderValue};
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::borrow::Cow;

string_enum!(
    /// X-Frame-Options values.
    XFrameOptions, HEADER_X_FRAME_OPTIONS,
    {
        Deny => "DENY",
        SameOrigin => "SAMEORIGIN",
    }
);

string_enum!(
    /// X-Content-Type-Options values.
    XContentTypeOptions, HEADER_X_CONTENT_TYPE_OPTIONS,
    {
        NoSniff => "nosniff",
    }
);

string_enum!(
    /// Referrer-Policy values.
    ReferrerPolicy, HEADER_REFERRER_POLICY,
    {
        NoReferrer => "no-referrer",
        NoReferrerWhenDowngrade => "no-referrer-when-downgrade",
        Origin => "origin",
        OriginWhenCrossOrigin => "origin-when-cross-origin",
        SameOrigin => "same-origin",
        StrictOrigin => "strict-origin",
        StrictOriginWhenCrossOrigin => "strict-origin-when-cross-origin",
        UnsafeUrl => "unsafe-url",
    }
);

string_enum!(
    /// X-XSS-Protection values. Modern browsers ignore the filter, so `0`
    /// is the usual choice.
    XssProtection, HEADER_X_XSS_PROTECTION,
    {
        Disabled => "0",
        Block => "1; mode=block",
    }
);

macro_rules! static_header_value {
    ($name:ident, $header:expr) => {
        impl $name {
            #[inline]
            pub fn header_name(&self) -> HeaderName {
                HeaderName::from_static($header)
            }

            #[inline]
            pub fn header_value(&self) -> HeaderValue {
                HeaderValue::from_static(self.as_str())
            }
        }
    };
}

static_header_value!(XFrameOptions, HEADER_X_FRAME_OPTIONS);
static_header_value!(XContentTypeOptions, HEADER_X_CONTENT_TYPE_OPTIONS);
static_header_value!(ReferrerPolicy, HEADER_REFERRER_POLICY);
static_header_value!(XssProtection, HEADER_X_XSS_PROTECTION);

/// Strict-Transport-Security.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictTransportSecurity {
    max_age: u64,
    include_subdomains: bool,
    preload: bool,
    https_only: bool,
    value: HeaderValue,
}

impl StrictTransportSecurity {
    pub fn max_age(seconds: u64) -> Self {
        Self {
            max_age: seconds,
            include_subdomains: false,
            preload: false,
            https_only: false,
            value: HeaderValue::from_static(""),
        }
        .rendered()
    }

    /// `max-age=0`, telling browsers to forget a previous policy.
    #[inline]
    pub fn no_cache() -> Self {
        Self::max_age(0)
    }

    #[inline]
    pub fn include_subdomains(mut self) -> Self {
        self.include_subdomains = true;
        self.rendered()
    }

    #[inline]
    pub fn preload(mut self) -> Self {
        self.preload = true;
        self.rendered()
    }

    /// Only send the header on requests that arrived over HTTPS.
    #[inline]
    pub fn https_only(mut self) -> Self {
        self.https_only = true;
        self
    }

    #[inline]
    pub fn is_https_only(&self) -> bool {
        self.https_only
    }

    #[inline]
    pub fn max_age_secs(&self) -> u64 {
        self.max_age
    }

    #[inline]
    pub fn header_name(&self) -> HeaderName {
        HeaderName::from_static(HEADER_HSTS)
    }

    #[inline]
    pub fn header_value(&self) -> &HeaderValue {
        &self.value
    }

    fn rendered(mut self) -> Self {
        let mut value = format!("max-age={}", self.max_age);
        if self.max_age > 0 {
            if self.include_subdomains {
                value.push_str("; includeSubDomains");
            }
            if self.preload {
                value.push_str("; preload");
            }
        }
        // Digits and ASCII keywords only.
        self.value = HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static(""));
        self
    }
}

impl Default for StrictTransportSecurity {
    fn default() -> Self {
        Self::max_age(DEFAULT_HSTS_MAX_AGE_SECS)
    }
}

string_enum!(
    /// Features controllable through Permissions-Policy.
    PermissionsFeature, HEADER_PERMISSIONS_POLICY,
    {
        Accelerometer => "accelerometer",
        AmbientLightSensor => "ambient-light-sensor",
        Autoplay => "autoplay",
        Battery => "battery",
        Camera => "camera",
        DisplayCapture => "display-capture",
        DocumentDomain => "document-domain",
        EncryptedMedia => "encrypted-media",
        Fullscreen => "fullscreen",
        Geolocation => "geolocation",
        Gyroscope => "gyroscope",
        Magnetometer => "magnetometer",
        Microphone => "microphone",
        Midi => "midi",
        Payment => "payment",
        PictureInPicture => "picture-in-picture",
        PublickeyCredentialsGet => "publickey-credentials-get",
        ScreenWakeLock => "screen-wake-lock",
        SyncXhr => "sync-xhr",
        Usb => "usb",
        WebShare => "web-share",
        XrSpatialTracking => "xr-spatial-tracking",
    }
);

/// Who may use one Permissions-Policy feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    all: bool,
    self_: bool,
    origins: SmallVec<[Cow<'static, str>; 2]>,
}

impl Allowlist {
    /// `feature=()`; this is also what an untouched allowlist renders.
    #[inline]
    pub fn none(self) -> Self {
        Self::default()
    }

    /// `feature=*`
    #[inline]
    pub fn all(mut self) -> Self {
        self.all = true;
        self
    }

    #[inline]
    pub fn self_(mut self) -> Self {
        self.self_ = true;
        self
    }

    #[inline]
    pub fn from(mut self, origin: impl Into<Cow<'static, str>>) -> Self {
        self.origins.push(origin.into());
        self
    }

    fn render(&self, feature: &str, out: &mut String) {
        out.push_str(feature);
        out.push('=');
        if self.all {
            out.push('*');
            return;
        }
        out.push('(');
        let mut first = true;
        if self.self_ {
            out.push_str("self");
            first = false;
        }
        for origin in &self.origins {
            if !first {
                out.push(' ');
            }
            out.push('"');
            out.push_str(origin);
            out.push('"');
            first = false;
        }
        out.push(')');
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionsPolicy {
    value: HeaderValue,
}

impl PermissionsPolicy {
    #[inline]
    pub fn builder() -> PermissionsPolicyBuilder {
        PermissionsPolicyBuilder::new()
    }

    #[inline]
    pub fn header_name(&self) -> HeaderName {
        HeaderName::from_static(HEADER_PERMISSIONS_POLICY)
    }

    #[inline]
    pub fn header_value(&self) -> &HeaderValue {
        &self.value
    }
}

#[derive(Debug, Clone, Default)]
pub struct PermissionsPolicyBuilder {
    features: IndexMap<Cow<'static, str>, Allowlist>,
}

impl PermissionsPolicyBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures one feature; configuring it again replaces the allowlist.
    pub fn feature(
        self,
        feature: PermissionsFeature,
        configure: impl FnOnce(Allowlist) -> Allowlist,
    ) -> Self {
        self.custom_feature(feature.as_str(), configure)
    }

    /// A feature this crate does not enumerate yet.
    pub fn custom_feature(
        mut self,
        feature: impl Into<Cow<'static, str>>,
        configure: impl FnOnce(Allowlist) -> Allowlist,
    ) -> Self {
        self.features
            .insert(feature.into(), configure(Allowlist::default()));
        self
    }

    pub fn build(self) -> Result<PermissionsPolicy, SecurityHeadersError> {
        if self.features.is_empty() {
            return Err(SecurityHeadersError::ConfigError(
                "permissions-policy needs at least one feature".to_string(),
            ));
        }

        let mut value = String::new();
        for (feature, allowlist) in &self.features {
            if is_blank(feature) || has_line_break(feature) {
                return Err(SecurityHeadersError::InvalidArgument(format!(
                    "invalid permissions-policy feature '{}'",
                    feature.escape_debug()
                )));
            }
            if let Some(origin) = allowlist
                .origins
                .iter()
                .find(|o| is_blank(o) || has_line_break(o) || o.contains('"'))
            {
                return Err(SecurityHeadersError::InvalidArgument(format!(
                    "invalid origin '{}' for permissions-policy feature '{}'",
                    origin.escape_debug(),
                    feature
                )));
            }
            if !value.is_empty() {
                value.push_str(", ");
            }
            allowlist.render(feature, &mut value);
        }

        let value = HeaderValue::from_str(&value)
            .map_err(|e| SecurityHeadersError::InvalidHeader(format!("permissions-policy: {}", e)))?;
        Ok(PermissionsPolicy { value })
    }
}

/// Reporting-Endpoints: named endpoints that `report-to` refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingEndpoints {
    value: HeaderValue,
}

impl ReportingEndpoints {
    #[inline]
    pub fn builder() -> ReportingEndpointsBuilder {
        ReportingEndpointsBuilder::default()
    }

    #[inline]
    pub fn header_name(&self) -> HeaderName {
        HeaderName::from_static(HEADER_REPORTING_ENDPOINTS)
    }

    #[inline]
    pub fn header_value(&self) -> &HeaderValue {
        &self.value
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportingEndpointsBuilder {
    endpoints: IndexMap<Cow<'static, str>, Cow<'static, str>>,
}

impl ReportingEndpointsBuilder {
    pub fn add_endpoint(
        mut self,
        name: impl Into<Cow<'static, str>>,
        url: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.endpoints.insert(name.into(), url.into());
        self
    }

    pub fn build(self) -> Result<ReportingEndpoints, SecurityHeadersError> {
        if self.endpoints.is_empty() {
            return Err(SecurityHeadersError::ConfigError(
                "reporting-endpoints needs at least one endpoint".to_string(),
            ));
        }

        let mut value = String::new();
        for (name, url) in &self.endpoints {
            let valid_name = !is_blank(name)
                && name
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
            if !valid_name {
                return Err(SecurityHeadersError::InvalidArgument(format!(
                    "invalid reporting endpoint name '{}'",
                    name.escape_debug()
                )));
            }
            if is_blank(url) || has_line_break(url) || url.contains('"') {
                return Err(SecurityHeadersError::InvalidArgument(format!(
                    "invalid url for reporting endpoint '{}'",
                    name
                )));
            }
            if !value.is_empty() {
                value.push_str(", ");
            }
            value.push_str(name);
            value.push_str("=\"");
            value.push_str(url);
            value.push('"');
        }

        let value = HeaderValue::from_str(&value).map_err(|e| {
            SecurityHeadersError::InvalidHeader(format!("reporting-endpoints: {}", e))
        })?;
        Ok(ReportingEndpoints { value })
    }
}

/// An arbitrary header set verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomHeader {
    name: HeaderName,
    value: HeaderValue,
}

impl CustomHeader {
    pub fn new(name: &str, value: &str) -> Result<Self, SecurityHeadersError> {
        if is_blank(name) {
            return Err(SecurityHeadersError::InvalidArgument(
                "custom header name must not be empty".to_string(),
            ));
        }
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| SecurityHeadersError::InvalidHeader(format!("'{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| SecurityHeadersError::InvalidHeader(format!("{}: {}", name, e)))?;
        Ok(Self { name, value })
    }

    #[inline]
    pub fn header_name(&self) -> &HeaderName {
        &self.name
    }

    #[inline]
    pub fn header_value(&self) -> &HeaderValue {
        &self.value
    }
}
