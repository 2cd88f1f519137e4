use crate::constants::{
    SELF_SOURCE, STRICT_DYNAMIC_SOURCE, SUFFIX_QUOTE, UNSAFE_EVAL_SOURCE, UNSAFE_HASHES_SOURCE,
    UNSAFE_INLINE_SOURCE, WASM_UNSAFE_EVAL_SOURCE,
};
use crate::security::hash::HashAlgorithm;
use crate::utils::BufferWriter;
use bytes::BytesMut;
use std::{borrow::Cow, fmt};

/// A static CSP source token. Request-dependent tokens (nonces, request
/// hashes) live in [`DynamicSource`](crate::core::directives::DynamicSource).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    Self_,
    UnsafeInline,
    UnsafeEval,
    StrictDynamic,
    WasmUnsafeEval,
    UnsafeHashes,
    Host(Cow<'static, str>),
    Scheme(Cow<'static, str>),
    Hash {
        algorithm: HashAlgorithm,
        value: Cow<'static, str>,
    },
    /// Raw token written verbatim, e.g. `'script'` for trusted types.
    Keyword(Cow<'static, str>),
}

impl Source {
    #[inline]
    pub fn host(host: impl Into<Cow<'static, str>>) -> Self {
        Source::Host(host.into())
    }

    #[inline]
    pub fn scheme(scheme: impl Into<Cow<'static, str>>) -> Self {
        Source::Scheme(scheme.into())
    }

    #[inline]
    pub const fn as_static_str(&self) -> Option<&'static str> {
        match self {
            Source::Self_ => Some(SELF_SOURCE),
            Source::UnsafeInline => Some(UNSAFE_INLINE_SOURCE),
            Source::UnsafeEval => Some(UNSAFE_EVAL_SOURCE),
            Source::StrictDynamic => Some(STRICT_DYNAMIC_SOURCE),
            Source::WasmUnsafeEval => Some(WASM_UNSAFE_EVAL_SOURCE),
            Source::UnsafeHashes => Some(UNSAFE_HASHES_SOURCE),
            _ => None,
        }
    }

    #[inline]
    pub fn estimated_size(&self) -> usize {
        match self.as_static_str() {
            Some(keyword) => keyword.len(),
            None => match self {
                Source::Host(host) => host.len(),
                Source::Scheme(scheme) => scheme.len() + 1,
                Source::Hash { algorithm, value } => {
                    algorithm.prefix().len() + value.len() + SUFFIX_QUOTE.len()
                }
                Source::Keyword(keyword) => keyword.len(),
                _ => 0,
            },
        }
    }

    #[inline]
    pub fn is_hash(&self) -> bool {
        matches!(self, Source::Hash { .. })
    }

    /// The raw text a configuration error would be about, if this token
    /// carries user supplied text.
    pub(crate) fn user_text(&self) -> Option<&str> {
        match self {
            Source::Host(text) | Source::Scheme(text) | Source::Keyword(text) => Some(text),
            Source::Hash { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(keyword) = self.as_static_str() {
            return f.write_str(keyword);
        }
        match self {
            Source::Host(host) => f.write_str(host),
            Source::Scheme(scheme) => write!(f, "{}:", scheme),
            Source::Hash { algorithm, value } => {
                write!(f, "{}{}{}", algorithm.prefix(), value, SUFFIX_QUOTE)
            }
            Source::Keyword(keyword) => f.write_str(keyword),
            _ => Ok(()),
        }
    }
}

impl BufferWriter for Source {
    fn write_to_buffer(&self, buffer: &mut BytesMut) {
        if let Some(keyword) = self.as_static_str() {
            buffer.extend_from_slice(keyword.as_bytes());
            return;
        }
        match self {
            Source::Host(host) => buffer.extend_from_slice(host.as_bytes()),
            Source::Scheme(scheme) => {
                buffer.extend_from_slice(scheme.as_bytes());
                buffer.extend_from_slice(b":");
            }
            Source::Hash { algorithm, value } => {
                let prefix = algorithm.prefix();
                buffer.reserve(prefix.len() + value.len() + SUFFIX_QUOTE.len());
                buffer.extend_from_slice(prefix.as_bytes());
                buffer.extend_from_slice(value.as_bytes());
                buffer.extend_from_slice(SUFFIX_QUOTE.as_bytes());
            }
            Source::Keyword(keyword) => buffer.extend_from_slice(keyword.as_bytes()),
            _ => {}
        }
    }
}
