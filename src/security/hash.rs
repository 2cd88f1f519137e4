use crate::constants::{HASH_PREFIX_SHA256, HASH_PREFIX_SHA384, HASH_PREFIX_SHA512, SUFFIX_QUOTE};
use crate::core::source::Source;
use crate::error::SecurityHeadersError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ring::digest::{self, Context, SHA256, SHA384, SHA512};
use std::{borrow::Cow, fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    #[inline(always)]
    pub fn digest_algorithm(&self) -> &'static digest::Algorithm {
        match self {
            HashAlgorithm::Sha256 => &SHA256,
            HashAlgorithm::Sha384 => &SHA384,
            HashAlgorithm::Sha512 => &SHA512,
        }
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    #[inline(always)]
    pub const fn prefix(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => HASH_PREFIX_SHA256,
            HashAlgorithm::Sha384 => HASH_PREFIX_SHA384,
            HashAlgorithm::Sha512 => HASH_PREFIX_SHA512,
        }
    }

    /// Formats `'{algorithm}-{hash}'`. The hash itself is not checked.
    #[inline]
    pub fn format_source(&self, hash: &str) -> String {
        let mut token = String::with_capacity(self.prefix().len() + hash.len() + 1);
        token.push_str(self.prefix());
        token.push_str(hash);
        token.push_str(SUFFIX_QUOTE);
        token
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<&str> for HashAlgorithm {
    type Error = SecurityHeadersError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(SecurityHeadersError::InvalidHashAlgorithm(s.to_string())),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = SecurityHeadersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// Replaces CR-LF pairs with LF so content hashes do not depend on the
/// platform a template was saved on.
pub fn normalize_line_endings(content: &str) -> Cow<'_, str> {
    if content.contains("\r\n") {
        Cow::Owned(content.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(content)
    }
}

#[derive(Debug)]
pub struct HashGenerator;

impl HashGenerator {
    /// Base64 digest of raw bytes.
    #[inline]
    pub fn generate(algorithm: HashAlgorithm, data: &[u8]) -> String {
        const CHUNK_SIZE: usize = 16384;

        if data.len() <= CHUNK_SIZE {
            let digest = digest::digest(algorithm.digest_algorithm(), data);
            return BASE64.encode(digest.as_ref());
        }

        let mut context = Context::new(algorithm.digest_algorithm());
        for chunk in data.chunks(CHUNK_SIZE) {
            context.update(chunk);
        }
        BASE64.encode(context.finish().as_ref())
    }

    /// Base64 digest of inline content, after line ending normalization.
    #[inline]
    pub fn content_hash(algorithm: HashAlgorithm, content: &str) -> String {
        let normalized = normalize_line_endings(content);
        Self::generate(algorithm, normalized.as_bytes())
    }

    /// `'{algorithm}-{digest}'` token for inline content.
    #[inline]
    pub fn content_hash_token(algorithm: HashAlgorithm, content: &str) -> String {
        algorithm.format_source(&Self::content_hash(algorithm, content))
    }

    #[inline]
    pub fn generate_source(algorithm: HashAlgorithm, content: &str) -> Source {
        Source::Hash {
            algorithm,
            value: Self::content_hash(algorithm, content).into(),
        }
    }

    /// Checks that `token` is a quoted `'{algorithm}-{digest}'` hash source
    /// with a supported algorithm and a base64 or base64url digest.
    pub fn validate_source_token(token: &str) -> Result<HashAlgorithm, SecurityHeadersError> {
        let invalid = || {
            SecurityHeadersError::InvalidArgument(format!(
                "invalid hash source '{}'",
                token.escape_debug()
            ))
        };

        let inner = token
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
            .ok_or_else(invalid)?;
        let (algorithm, digest) = inner.split_once('-').ok_or_else(invalid)?;
        if !algorithm.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(invalid());
        }
        let algorithm = HashAlgorithm::try_from(algorithm)?;

        let body = digest.trim_end_matches('=');
        let padding = digest.len() - body.len();
        let is_digest_byte =
            |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'-' | b'_');
        if body.is_empty() || padding > 2 || !body.bytes().all(is_digest_byte) {
            return Err(invalid());
        }
        Ok(algorithm)
    }

    #[inline]
    pub fn verify_hash(algorithm: HashAlgorithm, content: &str, hash: &str) -> bool {
        Self::content_hash(algorithm, content) == hash
    }
}
