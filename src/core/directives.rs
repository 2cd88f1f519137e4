use crate::constants::{
    self, DYNAMIC_NONCE_ID, DYNAMIC_SCRIPT_HASHES_ID, DYNAMIC_STYLE_HASHES_ID, NONCE_PREFIX,
    NONE_SOURCE, REPORT_SAMPLE_SOURCE, SUFFIX_QUOTE,
};
use crate::core::source::Source;
use crate::error::SecurityHeadersError;
use crate::security::hash::{HashAlgorithm, HashGenerator};
use crate::security::state::{InlineContext, RequestSecurityState};
use crate::utils::{has_line_break, is_blank, join_tokens, BufferWriter};
use bytes::BytesMut;
use indexmap::IndexSet;
use smallvec::SmallVec;
use std::{borrow::Cow, fmt, sync::Arc};

pub type DynamicSourceFn = Arc<dyn Fn(&RequestSecurityState) -> Option<String> + Send + Sync>;

/// A source token computed from request state when the header is written.
/// The id identifies the builder so that adding it twice keeps one copy.
#[derive(Clone)]
pub struct DynamicSource {
    id: Cow<'static, str>,
    render: DynamicSourceFn,
}

impl DynamicSource {
    pub fn new<F>(id: impl Into<Cow<'static, str>>, render: F) -> Self
    where
        F: Fn(&RequestSecurityState) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            render: Arc::new(render),
        }
    }

    /// `'nonce-{value}'` for the request nonce.
    pub fn nonce() -> Self {
        Self::new(DYNAMIC_NONCE_ID, |state| {
            state
                .current_nonce()
                .map(|nonce| format!("{}{}{}", NONCE_PREFIX, nonce, SUFFIX_QUOTE))
        })
    }

    /// Every hash token recorded for `context` during the request.
    pub fn hashes(context: InlineContext) -> Self {
        let id = match context {
            InlineContext::Script => DYNAMIC_SCRIPT_HASHES_ID,
            InlineContext::Style => DYNAMIC_STYLE_HASHES_ID,
        };
        Self::new(id, move |state| {
            let hashes = state.hash_sources(context);
            if hashes.is_empty() {
                None
            } else {
                Some(join_tokens(hashes.iter().map(String::as_str)))
            }
        })
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn render(&self, state: &RequestSecurityState) -> Option<String> {
        (self.render)(state).filter(|token| !token.is_empty())
    }
}

impl fmt::Debug for DynamicSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicSource").field("id", &self.id).finish()
    }
}

#[derive(Debug, Clone)]
pub struct Directive {
    name: Cow<'static, str>,
    sources: SmallVec<[Source; 4]>,
    dynamic_sources: SmallVec<[DynamicSource; 2]>,
    block_resources: bool,
    must_report_sample: bool,
    render_when_empty: bool,
    invalid_hash_algorithms: Vec<String>,
}

impl Directive {
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            sources: SmallVec::new(),
            dynamic_sources: SmallVec::new(),
            block_resources: false,
            must_report_sample: false,
            render_when_empty: false,
            invalid_hash_algorithms: Vec::new(),
        }
    }

    /// A directive that is meaningful without any value, such as
    /// `upgrade-insecure-requests` or a bare `sandbox`.
    #[inline]
    pub fn flag(name: impl Into<Cow<'static, str>>) -> Self {
        let mut directive = Self::new(name);
        directive.render_when_empty = true;
        directive
    }

    /// Appends a token. Duplicates are kept.
    pub fn add_source(&mut self, source: Source) -> &mut Self {
        self.sources.push(source);
        self
    }

    /// Appends raw token text, validated like a host when the policy is built.
    #[inline]
    pub fn add_token(&mut self, token: impl Into<Cow<'static, str>>) -> &mut Self {
        self.add_source(Source::Host(token.into()))
    }

    pub fn add_sources<I>(&mut self, sources: I) -> &mut Self
    where
        I: IntoIterator<Item = Source>,
    {
        self.sources.extend(sources);
        self
    }

    /// Appends a request dependent token unless one with the same id exists.
    pub fn add_dynamic(&mut self, source: DynamicSource) -> &mut Self {
        if !self.dynamic_sources.iter().any(|s| s.id == source.id) {
            self.dynamic_sources.push(source);
        }
        self
    }

    /// Resolves the directive to `'none'` whatever else it holds.
    #[inline]
    pub fn block(&mut self) -> &mut Self {
        self.block_resources = true;
        self
    }

    /// `'report-sample'` is kept apart from the sources and always renders
    /// first, wherever it was added.
    #[inline]
    pub fn report_sample(&mut self) -> &mut Self {
        self.must_report_sample = true;
        self
    }

    /// Records a hash whose algorithm arrives as text; an unknown algorithm
    /// is reported by [`validate`](Self::validate).
    pub fn add_hash(&mut self, algorithm: &str, hash: impl Into<Cow<'static, str>>) -> &mut Self {
        match HashAlgorithm::try_from(algorithm) {
            Ok(algorithm) => {
                self.sources.push(Source::Hash {
                    algorithm,
                    value: hash.into(),
                });
            }
            Err(_) => self.invalid_hash_algorithms.push(algorithm.to_string()),
        }
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    #[inline]
    pub fn dynamic_sources(&self) -> &[DynamicSource] {
        &self.dynamic_sources
    }

    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.block_resources
    }

    #[inline]
    pub fn must_report_sample(&self) -> bool {
        self.must_report_sample
    }

    #[inline]
    pub fn has_dynamic_sources(&self) -> bool {
        !self.block_resources && !self.dynamic_sources.is_empty()
    }

    #[inline]
    pub fn contains_hash(&self) -> bool {
        self.sources.iter().any(Source::is_hash)
    }

    pub fn validate(&self) -> Result<(), SecurityHeadersError> {
        if is_blank(&self.name) || has_line_break(&self.name) {
            return Err(SecurityHeadersError::InvalidArgument(format!(
                "invalid directive name '{}'",
                self.name
            )));
        }

        if let Some(algorithm) = self.invalid_hash_algorithms.first() {
            return Err(SecurityHeadersError::InvalidHashAlgorithm(algorithm.clone()));
        }

        for source in &self.sources {
            if let Some(text) = source.user_text() {
                if is_blank(text) {
                    return Err(SecurityHeadersError::InvalidArgument(format!(
                        "directive '{}' contains an empty source",
                        self.name
                    )));
                }
                if has_line_break(text) {
                    return Err(SecurityHeadersError::InvalidArgument(format!(
                        "directive '{}' contains a line break in source '{}'",
                        self.name,
                        text.escape_debug()
                    )));
                }
            }
        }

        Ok(())
    }

    /// The directive value for one request: `'none'` when blocked, otherwise
    /// `'report-sample'`, the static tokens and the dynamic tokens in order.
    pub fn render(&self, state: &RequestSecurityState) -> String {
        if self.block_resources {
            return NONE_SOURCE.to_string();
        }

        let mut value = String::with_capacity(self.estimated_size());
        let mut push = |token: &str| {
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(token);
        };

        if self.must_report_sample {
            push(REPORT_SAMPLE_SOURCE);
        }
        for source in &self.sources {
            push(&source.to_string());
        }
        for dynamic in &self.dynamic_sources {
            if let Some(token) = dynamic.render(state) {
                push(&token);
            }
        }

        value
    }

    /// Writes `name value` into `buffer`. Returns false and writes nothing
    /// when the directive has no value and is not a flag directive.
    pub(crate) fn write_to_buffer(
        &self,
        buffer: &mut BytesMut,
        state: &RequestSecurityState,
    ) -> bool {
        let mark = buffer.len();
        buffer.extend_from_slice(self.name.as_bytes());
        let name_end = buffer.len();

        if self.block_resources {
            buffer.extend_from_slice(b" ");
            buffer.extend_from_slice(NONE_SOURCE.as_bytes());
            return true;
        }

        if self.must_report_sample {
            buffer.extend_from_slice(b" ");
            buffer.extend_from_slice(REPORT_SAMPLE_SOURCE.as_bytes());
        }
        for source in &self.sources {
            buffer.extend_from_slice(b" ");
            source.write_to_buffer(buffer);
        }
        for dynamic in &self.dynamic_sources {
            if let Some(token) = dynamic.render(state) {
                buffer.extend_from_slice(b" ");
                buffer.extend_from_slice(token.as_bytes());
            }
        }

        if buffer.len() == name_end && !self.render_when_empty {
            buffer.truncate(mark);
            return false;
        }
        true
    }

    #[inline]
    pub fn estimated_size(&self) -> usize {
        let sources: usize = self.sources.iter().map(|s| s.estimated_size() + 1).sum();
        self.name.len() + sources + REPORT_SAMPLE_SOURCE.len() + 1
    }
}

/// Typed access to a [`Directive`] under a fixed name.
pub trait DirectiveSpec: Sized {
    const NAME: &'static str;

    fn inner_mut(&mut self) -> &mut Directive;

    fn build(self) -> Directive;
}

/// Sources every fetch and navigation directive accepts.
pub trait SourceListDirective: DirectiveSpec {
    /// Blocks every source; other tokens are ignored when rendering.
    fn none(mut self) -> Self {
        self.inner_mut().block();
        self
    }

    fn self_(mut self) -> Self {
        self.inner_mut().add_source(Source::Self_);
        self
    }

    /// A host source such as `https://cdn.example.com` or `*.example.com`.
    fn from(mut self, uri: impl Into<Cow<'static, str>>) -> Self {
        self.inner_mut().add_source(Source::Host(uri.into()));
        self
    }

    fn blob(mut self) -> Self {
        self.inner_mut().add_source(Source::Scheme(Cow::Borrowed("blob")));
        self
    }

    fn data(mut self) -> Self {
        self.inner_mut().add_source(Source::Scheme(Cow::Borrowed("data")));
        self
    }

    fn over_https(mut self) -> Self {
        self.inner_mut().add_source(Source::Scheme(Cow::Borrowed("https")));
        self
    }

    fn over_http(mut self) -> Self {
        self.inner_mut().add_source(Source::Scheme(Cow::Borrowed("http")));
        self
    }

    fn add_source(mut self, source: Source) -> Self {
        self.inner_mut().add_source(source);
        self
    }

    fn add_sources<I>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = Source>,
    {
        self.inner_mut().add_sources(sources);
        self
    }
}

/// Keywords, nonces and hashes for directives that govern inline content.
pub trait InlineSourceDirective: SourceListDirective {
    fn unsafe_inline(mut self) -> Self {
        self.inner_mut().add_source(Source::UnsafeInline);
        self
    }

    fn unsafe_eval(mut self) -> Self {
        self.inner_mut().add_source(Source::UnsafeEval);
        self
    }

    fn wasm_unsafe_eval(mut self) -> Self {
        self.inner_mut().add_source(Source::WasmUnsafeEval);
        self
    }

    fn unsafe_hashes(mut self) -> Self {
        self.inner_mut().add_source(Source::UnsafeHashes);
        self
    }

    fn strict_dynamic(mut self) -> Self {
        self.inner_mut().add_source(Source::StrictDynamic);
        self
    }

    /// Renders `'report-sample'` ahead of every other source, regardless of
    /// the order it was added in.
    fn report_sample(mut self) -> Self {
        self.inner_mut().report_sample();
        self
    }

    /// Adds the per-request nonce.
    fn with_nonce(mut self) -> Self {
        self.inner_mut().add_dynamic(DynamicSource::nonce());
        self
    }

    fn with_hash256(mut self, hash: impl Into<Cow<'static, str>>) -> Self {
        self.inner_mut().add_source(Source::Hash {
            algorithm: HashAlgorithm::Sha256,
            value: hash.into(),
        });
        self
    }

    fn with_hash384(mut self, hash: impl Into<Cow<'static, str>>) -> Self {
        self.inner_mut().add_source(Source::Hash {
            algorithm: HashAlgorithm::Sha384,
            value: hash.into(),
        });
        self
    }

    fn with_hash512(mut self, hash: impl Into<Cow<'static, str>>) -> Self {
        self.inner_mut().add_source(Source::Hash {
            algorithm: HashAlgorithm::Sha512,
            value: hash.into(),
        });
        self
    }

    /// `algorithm` must be one of `sha256`, `sha384`, `sha512`; anything
    /// else fails when the policy is built.
    fn with_hash(mut self, algorithm: &str, hash: impl Into<Cow<'static, str>>) -> Self {
        self.inner_mut().add_hash(algorithm, hash);
        self
    }

    /// Hashes `content` now and adds the resulting token.
    fn with_content_hash(mut self, algorithm: HashAlgorithm, content: &str) -> Self {
        self.inner_mut()
            .add_source(HashGenerator::generate_source(algorithm, content));
        self
    }
}

/// Directives that pick up the hashes recorded while rendering a request.
pub trait HashTagHelperDirective: InlineSourceDirective {
    const CONTEXT: InlineContext;

    fn with_hash_tag_helper(mut self) -> Self {
        self.inner_mut()
            .add_dynamic(DynamicSource::hashes(Self::CONTEXT));
        self
    }
}

macro_rules! define_directive {
    ($name:ident, $directive_name:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            directive: Directive,
        }

        impl $name {
            #[inline]
            pub fn new() -> Self {
                Self {
                    directive: Directive::new($directive_name),
                }
            }
        }

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                Self::new()
            }
        }

        impl DirectiveSpec for $name {
            const NAME: &'static str = $directive_name;

            #[inline]
            fn inner_mut(&mut self) -> &mut Directive {
                &mut self.directive
            }

            #[inline]
            fn build(self) -> Directive {
                self.directive
            }
        }

        impl SourceListDirective for $name {}
    };
    ($name:ident, $directive_name:expr, inline) => {
        define_directive!($name, $directive_name);

        impl InlineSourceDirective for $name {}
    };
    ($name:ident, $directive_name:expr, inline, $context:expr) => {
        define_directive!($name, $directive_name, inline);

        impl HashTagHelperDirective for $name {
            const CONTEXT: InlineContext = $context;
        }
    };
}

define_directive!(DefaultSrc, constants::DEFAULT_SRC, inline);
define_directive!(ScriptSrc, constants::SCRIPT_SRC, inline, InlineContext::Script);
define_directive!(ScriptSrcElem, constants::SCRIPT_SRC_ELEM, inline, InlineContext::Script);
define_directive!(ScriptSrcAttr, constants::SCRIPT_SRC_ATTR, inline, InlineContext::Script);
define_directive!(StyleSrc, constants::STYLE_SRC, inline, InlineContext::Style);
define_directive!(StyleSrcElem, constants::STYLE_SRC_ELEM, inline, InlineContext::Style);
define_directive!(StyleSrcAttr, constants::STYLE_SRC_ATTR, inline, InlineContext::Style);
define_directive!(ImgSrc, constants::IMG_SRC);
define_directive!(ConnectSrc, constants::CONNECT_SRC);
define_directive!(FontSrc, constants::FONT_SRC);
define_directive!(ObjectSrc, constants::OBJECT_SRC);
define_directive!(MediaSrc, constants::MEDIA_SRC);
define_directive!(FrameSrc, constants::FRAME_SRC);
define_directive!(WorkerSrc, constants::WORKER_SRC);
define_directive!(ManifestSrc, constants::MANIFEST_SRC);
define_directive!(ChildSrc, constants::CHILD_SRC);
define_directive!(FrameAncestors, constants::FRAME_ANCESTORS);
define_directive!(BaseUri, constants::BASE_URI);
define_directive!(FormAction, constants::FORM_ACTION);

#[derive(Debug, Default, Clone)]
pub struct Sandbox {
    values: IndexSet<Cow<'static, str>>,
}

impl Sandbox {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn allow_forms(self) -> Self {
        self.add_value("allow-forms")
    }

    #[inline]
    pub fn allow_same_origin(self) -> Self {
        self.add_value("allow-same-origin")
    }

    #[inline]
    pub fn allow_scripts(self) -> Self {
        self.add_value("allow-scripts")
    }

    #[inline]
    pub fn allow_popups(self) -> Self {
        self.add_value("allow-popups")
    }

    #[inline]
    pub fn allow_modals(self) -> Self {
        self.add_value("allow-modals")
    }

    #[inline]
    pub fn allow_downloads(self) -> Self {
        self.add_value("allow-downloads")
    }

    #[inline]
    pub fn allow_pointer_lock(self) -> Self {
        self.add_value("allow-pointer-lock")
    }

    #[inline]
    pub fn allow_presentation(self) -> Self {
        self.add_value("allow-presentation")
    }

    #[inline]
    pub fn allow_popups_to_escape_sandbox(self) -> Self {
        self.add_value("allow-popups-to-escape-sandbox")
    }

    #[inline]
    pub fn allow_top_navigation(self) -> Self {
        self.add_value("allow-top-navigation")
    }

    #[inline]
    pub fn allow_top_navigation_by_user_activation(self) -> Self {
        self.add_value("allow-top-navigation-by-user-activation")
    }

    pub fn add_value(mut self, value: impl Into<Cow<'static, str>>) -> Self {
        self.values.insert(value.into());
        self
    }

    /// An empty sandbox renders as the bare `sandbox` directive.
    pub fn build(self) -> Directive {
        let mut directive = Directive::flag(constants::SANDBOX);
        for value in self.values {
            directive.add_source(Source::Keyword(value));
        }
        directive
    }
}
