use crate::security::state::RequestSecurityState;

/// What a header policy may look at while rendering for one response.
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    pub path: &'a str,
    /// The response `Content-Type`, if the handler set one.
    pub content_type: Option<&'a str>,
    pub is_https: bool,
    pub state: &'a RequestSecurityState,
}

impl<'a> PolicyContext<'a> {
    #[inline]
    pub fn new(state: &'a RequestSecurityState) -> Self {
        Self {
            path: "/",
            content_type: None,
            is_https: false,
            state,
        }
    }

    #[inline]
    pub fn with_path(mut self, path: &'a str) -> Self {
        self.path = path;
        self
    }

    #[inline]
    pub fn with_content_type(mut self, content_type: &'a str) -> Self {
        self.content_type = Some(content_type);
        self
    }

    #[inline]
    pub fn with_https(mut self, is_https: bool) -> Self {
        self.is_https = is_https;
        self
    }
}
