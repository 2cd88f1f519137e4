use crate::constants::{
    BLOCK_ALL_MIXED_CONTENT, DEFAULT_BUFFER_CAPACITY, DYNAMIC_NONCE_ID, HEADER_CSP,
    HEADER_CSP_REPORT_ONLY, REPORT_TO, REPORT_URI, REQUIRE_TRUSTED_TYPES_FOR, SEMICOLON_SPACE,
    TRUSTED_TYPES_SCRIPT, UPGRADE_INSECURE_REQUESTS,
};
use crate::core::directives::{
    BaseUri, ChildSrc, ConnectSrc, DefaultSrc, Directive, DirectiveSpec, FontSrc, FormAction,
    FrameAncestors, FrameSrc, ImgSrc, ManifestSrc, MediaSrc, ObjectSrc, Sandbox, ScriptSrc,
    ScriptSrcAttr, ScriptSrcElem, StyleSrc, StyleSrcAttr, StyleSrcElem, WorkerSrc,
};
use crate::core::source::Source;
use crate::error::SecurityHeadersError;
use crate::security::state::RequestSecurityState;
use actix_web::http::header::{HeaderName, HeaderValue};
use bytes::BytesMut;
use indexmap::IndexMap;
use std::borrow::Cow;

/// A built Content-Security-Policy (or its report-only twin).
///
/// Policies without per-request sources render once at build time and reuse
/// that value for every response.
#[derive(Debug, Clone)]
pub struct ContentSecurityPolicy {
    directives: IndexMap<Cow<'static, str>, Directive>,
    report_only: bool,
    has_per_request_values: bool,
    requires_nonce: bool,
    cached_header_value: Option<HeaderValue>,
}

impl ContentSecurityPolicy {
    #[inline]
    pub fn builder() -> ContentSecurityPolicyBuilder {
        ContentSecurityPolicyBuilder::new()
    }

    #[inline]
    pub fn header_name(&self) -> HeaderName {
        if self.report_only {
            HeaderName::from_static(HEADER_CSP_REPORT_ONLY)
        } else {
            HeaderName::from_static(HEADER_CSP)
        }
    }

    #[inline]
    pub fn is_report_only(&self) -> bool {
        self.report_only
    }

    /// True when any directive holds a nonce or request hash source.
    #[inline]
    pub fn has_per_request_values(&self) -> bool {
        self.has_per_request_values
    }

    #[inline]
    pub fn requires_nonce(&self) -> bool {
        self.requires_nonce
    }

    #[inline]
    pub fn get_directive(&self, name: &str) -> Option<&Directive> {
        self.directives.get(name)
    }

    #[inline]
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.directives.values()
    }

    pub fn header_value(
        &self,
        state: &RequestSecurityState,
    ) -> Result<HeaderValue, SecurityHeadersError> {
        match &self.cached_header_value {
            Some(value) => Ok(value.clone()),
            None => self.generate_header_value(state),
        }
    }

    /// Header value as text, mostly for diagnostics.
    pub fn render(&self, state: &RequestSecurityState) -> String {
        let buffer = self.write_directives(state);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn write_directives(&self, state: &RequestSecurityState) -> BytesMut {
        let capacity = self
            .directives
            .values()
            .map(|d| d.estimated_size() + SEMICOLON_SPACE.len())
            .sum::<usize>()
            .max(DEFAULT_BUFFER_CAPACITY);
        let mut buffer = BytesMut::with_capacity(capacity);

        let mut first = true;
        for directive in self.directives.values() {
            let mark = buffer.len();
            if !first {
                buffer.extend_from_slice(SEMICOLON_SPACE);
            }
            if directive.write_to_buffer(&mut buffer, state) {
                first = false;
            } else {
                buffer.truncate(mark);
            }
        }
        buffer
    }

    fn generate_header_value(
        &self,
        state: &RequestSecurityState,
    ) -> Result<HeaderValue, SecurityHeadersError> {
        let bytes = self.write_directives(state).freeze();
        HeaderValue::from_maybe_shared(bytes).map_err(|e| {
            SecurityHeadersError::InvalidHeader(format!(
                "{} value could not be encoded: {}",
                self.header_name(),
                e
            ))
        })
    }
}

#[derive(Debug, Default)]
pub struct ContentSecurityPolicyBuilder {
    directives: IndexMap<Cow<'static, str>, Directive>,
    report_only: bool,
}

impl ContentSecurityPolicyBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directive; a directive with the same name is replaced in place.
    pub fn add_directive<D: DirectiveSpec>(self, directive_builder: D) -> Self {
        self.with_directive(directive_builder.build())
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        let name = directive.name().to_owned();
        self.directives.insert(Cow::Owned(name), directive);
        self
    }

    pub fn default_src(self, configure: impl FnOnce(DefaultSrc) -> DefaultSrc) -> Self {
        self.add_directive(configure(DefaultSrc::new()))
    }

    pub fn script_src(self, configure: impl FnOnce(ScriptSrc) -> ScriptSrc) -> Self {
        self.add_directive(configure(ScriptSrc::new()))
    }

    pub fn script_src_elem(self, configure: impl FnOnce(ScriptSrcElem) -> ScriptSrcElem) -> Self {
        self.add_directive(configure(ScriptSrcElem::new()))
    }

    pub fn script_src_attr(self, configure: impl FnOnce(ScriptSrcAttr) -> ScriptSrcAttr) -> Self {
        self.add_directive(configure(ScriptSrcAttr::new()))
    }

    pub fn style_src(self, configure: impl FnOnce(StyleSrc) -> StyleSrc) -> Self {
        self.add_directive(configure(StyleSrc::new()))
    }

    pub fn style_src_elem(self, configure: impl FnOnce(StyleSrcElem) -> StyleSrcElem) -> Self {
        self.add_directive(configure(StyleSrcElem::new()))
    }

    pub fn style_src_attr(self, configure: impl FnOnce(StyleSrcAttr) -> StyleSrcAttr) -> Self {
        self.add_directive(configure(StyleSrcAttr::new()))
    }

    pub fn img_src(self, configure: impl FnOnce(ImgSrc) -> ImgSrc) -> Self {
        self.add_directive(configure(ImgSrc::new()))
    }

    pub fn connect_src(self, configure: impl FnOnce(ConnectSrc) -> ConnectSrc) -> Self {
        self.add_directive(configure(ConnectSrc::new()))
    }

    pub fn font_src(self, configure: impl FnOnce(FontSrc) -> FontSrc) -> Self {
        self.add_directive(configure(FontSrc::new()))
    }

    pub fn object_src(self, configure: impl FnOnce(ObjectSrc) -> ObjectSrc) -> Self {
        self.add_directive(configure(ObjectSrc::new()))
    }

    pub fn media_src(self, configure: impl FnOnce(MediaSrc) -> MediaSrc) -> Self {
        self.add_directive(configure(MediaSrc::new()))
    }

    pub fn frame_src(self, configure: impl FnOnce(FrameSrc) -> FrameSrc) -> Self {
        self.add_directive(configure(FrameSrc::new()))
    }

    pub fn worker_src(self, configure: impl FnOnce(WorkerSrc) -> WorkerSrc) -> Self {
        self.add_directive(configure(WorkerSrc::new()))
    }

    pub fn manifest_src(self, configure: impl FnOnce(ManifestSrc) -> ManifestSrc) -> Self {
        self.add_directive(configure(ManifestSrc::new()))
    }

    pub fn child_src(self, configure: impl FnOnce(ChildSrc) -> ChildSrc) -> Self {
        self.add_directive(configure(ChildSrc::new()))
    }

    pub fn frame_ancestors(self, configure: impl FnOnce(FrameAncestors) -> FrameAncestors) -> Self {
        self.add_directive(configure(FrameAncestors::new()))
    }

    pub fn base_uri(self, configure: impl FnOnce(BaseUri) -> BaseUri) -> Self {
        self.add_directive(configure(BaseUri::new()))
    }

    pub fn form_action(self, configure: impl FnOnce(FormAction) -> FormAction) -> Self {
        self.add_directive(configure(FormAction::new()))
    }

    pub fn sandbox(self, sandbox_builder: Sandbox) -> Self {
        self.with_directive(sandbox_builder.build())
    }

    pub fn upgrade_insecure_requests(self) -> Self {
        self.with_directive(Directive::flag(UPGRADE_INSECURE_REQUESTS))
    }

    pub fn block_all_mixed_content(self) -> Self {
        self.with_directive(Directive::flag(BLOCK_ALL_MIXED_CONTENT))
    }

    pub fn require_trusted_types_for_script(self) -> Self {
        let mut directive = Directive::new(REQUIRE_TRUSTED_TYPES_FOR);
        directive.add_source(Source::Keyword(Cow::Borrowed(TRUSTED_TYPES_SCRIPT)));
        self.with_directive(directive)
    }

    pub fn report_uri(self, uri: impl Into<Cow<'static, str>>) -> Self {
        let mut directive = Directive::new(REPORT_URI);
        directive.add_source(Source::Host(uri.into()));
        self.with_directive(directive)
    }

    /// Reporting group name declared through `Reporting-Endpoints`.
    pub fn report_to(self, group: impl Into<Cow<'static, str>>) -> Self {
        let mut directive = Directive::new(REPORT_TO);
        directive.add_source(Source::Keyword(group.into()));
        self.with_directive(directive)
    }

    #[inline]
    pub fn report_only(mut self, enabled: bool) -> Self {
        self.report_only = enabled;
        self
    }

    pub fn build(self) -> Result<ContentSecurityPolicy, SecurityHeadersError> {
        for directive in self.directives.values() {
            directive.validate()?;
        }

        let has_per_request_values = self.directives.values().any(Directive::has_dynamic_sources);
        let requires_nonce = self.directives.values().any(|d| {
            d.has_dynamic_sources()
                && d.dynamic_sources()
                    .iter()
                    .any(|source| source.id() == DYNAMIC_NONCE_ID)
        });

        let mut policy = ContentSecurityPolicy {
            directives: self.directives,
            report_only: self.report_only,
            has_per_request_values,
            requires_nonce,
            cached_header_value: None,
        };

        // Rendering with an empty request state also checks that the static
        // part of a per-request policy is a legal header value.
        let value = policy.generate_header_value(&RequestSecurityState::default())?;
        if !has_per_request_values {
            policy.cached_header_value = Some(value);
        }

        Ok(policy)
    }
}
