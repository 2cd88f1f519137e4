use crate::error::SecurityHeadersError;
use crate::security::hash::HashAlgorithm;
use crate::security::state::{InlineContext, RequestSecurityState};
use actix_web::HttpMessage;

/// Request-scoped helpers for handlers and templates rendering inline
/// scripts and styles.
pub trait SecurityHeadersExtensions {
    /// The request nonce, generated on first use.
    fn csp_nonce(&self) -> Result<String, SecurityHeadersError>;

    /// The nonce the response's CSP will carry, or an empty string when the
    /// collection serving the request renders none.
    fn nonce(&self) -> String;

    /// Hashes `content` and adds it to the script hash list. Returns the
    /// `'{algorithm}-{digest}'` token.
    fn add_script_hash(
        &self,
        algorithm: HashAlgorithm,
        content: &str,
    ) -> Result<String, SecurityHeadersError>;

    fn add_style_hash(
        &self,
        algorithm: HashAlgorithm,
        content: &str,
    ) -> Result<String, SecurityHeadersError>;

    /// Adds an already formatted `'{algorithm}-{digest}'` token. Any other
    /// shape fails with `InvalidArgument`.
    fn add_hash_source(
        &self,
        context: InlineContext,
        token: String,
    ) -> Result<(), SecurityHeadersError>;
}

impl<T> SecurityHeadersExtensions for T
where
    T: HttpMessage,
{
    fn csp_nonce(&self) -> Result<String, SecurityHeadersError> {
        let extensions = self.extensions();
        let state = extensions
            .get::<RequestSecurityState>()
            .ok_or(SecurityHeadersError::MissingRequestState("csp_nonce"))?;
        let nonce = state.get_or_create_nonce()?.to_owned();
        Ok(nonce)
    }

    fn nonce(&self) -> String {
        self.extensions()
            .get::<RequestSecurityState>()
            .map(|state| state.nonce().to_owned())
            .unwrap_or_default()
    }

    fn add_script_hash(
        &self,
        algorithm: HashAlgorithm,
        content: &str,
    ) -> Result<String, SecurityHeadersError> {
        add_content_hash(self, InlineContext::Script, algorithm, content, "add_script_hash")
    }

    fn add_style_hash(
        &self,
        algorithm: HashAlgorithm,
        content: &str,
    ) -> Result<String, SecurityHeadersError> {
        add_content_hash(self, InlineContext::Style, algorithm, content, "add_style_hash")
    }

    fn add_hash_source(
        &self,
        context: InlineContext,
        token: String,
    ) -> Result<(), SecurityHeadersError> {
        let mut extensions = self.extensions_mut();
        let state = extensions
            .get_mut::<RequestSecurityState>()
            .ok_or(SecurityHeadersError::MissingRequestState("add_hash_source"))?;
        state.add_hash_source(context, token)
    }
}

fn add_content_hash<T: HttpMessage>(
    message: &T,
    context: InlineContext,
    algorithm: HashAlgorithm,
    content: &str,
    operation: &'static str,
) -> Result<String, SecurityHeadersError> {
    let mut extensions = message.extensions_mut();
    let state = extensions
        .get_mut::<RequestSecurityState>()
        .ok_or(SecurityHeadersError::MissingRequestState(operation))?;
    Ok(state.add_content_hash(context, algorithm, content))
}
