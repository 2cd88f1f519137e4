use crate::error::SecurityHeadersError;
use crate::security::hash::{HashAlgorithm, HashGenerator};
use crate::security::nonce::NonceGenerator;
use std::{
    cell::{Cell, OnceCell},
    sync::Arc,
};

/// Which hash list an inline content hash belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineContext {
    Script,
    Style,
}

/// Values produced while a single request is processed and consumed when its
/// security headers are written. Owned by that request only.
#[derive(Debug)]
pub struct RequestSecurityState {
    generator: Arc<NonceGenerator>,
    nonce: OnceCell<String>,
    nonce_required: Cell<bool>,
    script_hashes: Vec<String>,
    style_hashes: Vec<String>,
}

impl RequestSecurityState {
    #[inline]
    pub fn new(generator: Arc<NonceGenerator>) -> Self {
        Self {
            generator,
            nonce: OnceCell::new(),
            nonce_required: Cell::new(false),
            script_hashes: Vec::new(),
            style_hashes: Vec::new(),
        }
    }

    /// The nonce for this request, generated on first use.
    pub fn get_or_create_nonce(&self) -> Result<&str, SecurityHeadersError> {
        if let Some(nonce) = self.nonce.get() {
            return Ok(nonce);
        }
        let generated = self.generator.generate()?;
        Ok(self.nonce.get_or_init(|| generated))
    }

    /// Set when request processing starts to whether the collection serving
    /// the request renders a nonce.
    #[inline]
    pub fn set_nonce_required(&self, required: bool) {
        self.nonce_required.set(required);
    }

    #[inline]
    pub fn nonce_required(&self) -> bool {
        self.nonce_required.get()
    }

    /// The nonce the response will carry, otherwise an empty string. When the
    /// serving collection renders a nonce that was not generated yet, it is
    /// generated here.
    pub fn nonce(&self) -> &str {
        if let Some(nonce) = self.nonce.get() {
            return nonce;
        }
        if !self.nonce_required.get() {
            return "";
        }
        match self.get_or_create_nonce() {
            Ok(nonce) => nonce,
            Err(e) => {
                log::error!("Failed to generate CSP nonce: {}", e);
                ""
            }
        }
    }

    /// The nonce if one was generated, without generating it.
    #[inline]
    pub fn current_nonce(&self) -> Option<&str> {
        self.nonce.get().map(String::as_str)
    }

    #[inline]
    pub fn has_nonce(&self) -> bool {
        self.nonce.get().is_some()
    }

    /// Appends an already formatted `'{algorithm}-{digest}'` token. Other
    /// shapes fail with `InvalidArgument`.
    pub fn add_hash_source(
        &mut self,
        context: InlineContext,
        token: impl Into<String>,
    ) -> Result<(), SecurityHeadersError> {
        let token = token.into();
        HashGenerator::validate_source_token(&token)?;
        self.push_hash(context, token);
        Ok(())
    }

    /// Hashes inline content and records the resulting token.
    pub fn add_content_hash(
        &mut self,
        context: InlineContext,
        algorithm: HashAlgorithm,
        content: &str,
    ) -> String {
        let token = HashGenerator::content_hash_token(algorithm, content);
        self.push_hash(context, token.clone());
        token
    }

    fn push_hash(&mut self, context: InlineContext, token: String) {
        match context {
            InlineContext::Script => self.script_hashes.push(token),
            InlineContext::Style => self.style_hashes.push(token),
        }
    }

    #[inline]
    pub fn hash_sources(&self, context: InlineContext) -> &[String] {
        match context {
            InlineContext::Script => &self.script_hashes,
            InlineContext::Style => &self.style_hashes,
        }
    }

    #[inline]
    pub fn script_hashes(&self) -> &[String] {
        &self.script_hashes
    }

    #[inline]
    pub fn style_hashes(&self) -> &[String] {
        &self.style_hashes
    }
}

impl Default for RequestSecurityState {
    fn default() -> Self {
        Self::new(Arc::new(NonceGenerator::default()))
    }
}
