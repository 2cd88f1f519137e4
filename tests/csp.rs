use actix_web_security_headers::core::{
    HashTagHelperDirective, InlineSourceDirective, Sandbox, SourceListDirective,
};
use actix_web_security_headers::security::{InlineContext, RequestSecurityState};
use actix_web_security_headers::{ContentSecurityPolicy, SecurityHeadersError};

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> ContentSecurityPolicy {
        ContentSecurityPolicy::builder()
            .object_src(|d| d.none())
            .form_action(|d| d.self_())
            .frame_ancestors(|d| d.none())
            .build()
            .unwrap()
    }

    #[test]
    fn test_static_policy_renders_once() {
        let policy = baseline();
        let state = RequestSecurityState::default();

        assert!(!policy.has_per_request_values());
        assert!(!policy.requires_nonce());
        assert_eq!(policy.header_name().as_str(), "content-security-policy");

        let first = policy.header_value(&state).unwrap();
        let second = policy.header_value(&RequestSecurityState::default()).unwrap();
        assert_eq!(
            first.to_str().unwrap(),
            "object-src 'none'; form-action 'self'; frame-ancestors 'none'"
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_directives_are_omitted() {
        let policy = ContentSecurityPolicy::builder()
            .default_src(|d| d.self_())
            .script_src(|d| d.with_nonce())
            .img_src(|d| d.self_())
            .build()
            .unwrap();

        let state = RequestSecurityState::default();
        assert_eq!(policy.render(&state), "default-src 'self'; img-src 'self'");

        let nonce = state.get_or_create_nonce().unwrap().to_owned();
        assert_eq!(
            policy.render(&state),
            format!(
                "default-src 'self'; script-src 'nonce-{}'; img-src 'self'",
                nonce
            )
        );
    }

    #[test]
    fn test_trailing_empty_directive_leaves_no_separator() {
        let policy = ContentSecurityPolicy::builder()
            .default_src(|d| d.self_())
            .style_src(|d| d.with_hash_tag_helper())
            .build()
            .unwrap();

        let value = policy.render(&RequestSecurityState::default());
        assert_eq!(value, "default-src 'self'");
        assert!(!value.ends_with("; "));
    }

    #[test]
    fn test_per_request_flags() {
        let nonce_policy = ContentSecurityPolicy::builder()
            .script_src(|d| d.self_().with_nonce())
            .build()
            .unwrap();
        assert!(nonce_policy.has_per_request_values());
        assert!(nonce_policy.requires_nonce());

        let hash_policy = ContentSecurityPolicy::builder()
            .script_src(|d| d.self_().with_hash_tag_helper())
            .build()
            .unwrap();
        assert!(hash_policy.has_per_request_values());
        assert!(!hash_policy.requires_nonce());
    }

    #[test]
    fn test_request_hashes_are_rendered() {
        let policy = ContentSecurityPolicy::builder()
            .script_src(|d| d.self_().with_hash_tag_helper())
            .style_src(|d| d.self_().with_hash_tag_helper())
            .build()
            .unwrap();

        let mut state = RequestSecurityState::default();
        let token = state.add_content_hash(
            InlineContext::Style,
            actix_web_security_headers::HashAlgorithm::Sha256,
            "color: red",
        );
        assert_eq!(token, "'sha256-NerDAUWfwD31YdZHveMrq0GLjsNFMwxLpZl0dPUeCcw='");

        assert_eq!(
            policy.header_value(&state).unwrap().to_str().unwrap(),
            "script-src 'self'; style-src 'self' 'sha256-NerDAUWfwD31YdZHveMrq0GLjsNFMwxLpZl0dPUeCcw='"
        );
    }

    #[test]
    fn test_malformed_hash_source_is_rejected() {
        let policy = ContentSecurityPolicy::builder()
            .default_src(|d| d.self_())
            .script_src(|d| d.self_().with_hash_tag_helper())
            .build()
            .unwrap();

        let mut state = RequestSecurityState::default();
        let result = state.add_hash_source(InlineContext::Script, "'sha256-x'\r\nx: y");
        assert!(matches!(result, Err(SecurityHeadersError::InvalidArgument(_))));
        assert!(state.script_hashes().is_empty());

        state
            .add_hash_source(InlineContext::Script, "'sha384-abc='")
            .unwrap();
        assert_eq!(
            policy.header_value(&state).unwrap().to_str().unwrap(),
            "default-src 'self'; script-src 'self' 'sha384-abc='"
        );
    }

    #[test]
    fn test_same_directive_replaces_in_place() {
        let policy = ContentSecurityPolicy::builder()
            .default_src(|d| d.self_())
            .img_src(|d| d.self_())
            .default_src(|d| d.none())
            .build()
            .unwrap();

        assert_eq!(
            policy.render(&RequestSecurityState::default()),
            "default-src 'none'; img-src 'self'"
        );
        assert_eq!(policy.directives().count(), 2);
    }

    #[test]
    fn test_report_only_header_name() {
        let policy = ContentSecurityPolicy::builder()
            .default_src(|d| d.self_())
            .report_only(true)
            .build()
            .unwrap();
        assert!(policy.is_report_only());
        assert_eq!(
            policy.header_name().as_str(),
            "content-security-policy-report-only"
        );
    }

    #[test]
    fn test_flag_and_reporting_directives() {
        let policy = ContentSecurityPolicy::builder()
            .default_src(|d| d.self_())
            .upgrade_insecure_requests()
            .block_all_mixed_content()
            .require_trusted_types_for_script()
            .sandbox(Sandbox::new())
            .report_uri("/csp-reports")
            .report_to("csp-endpoint")
            .build()
            .unwrap();

        assert_eq!(
            policy.render(&RequestSecurityState::default()),
            "default-src 'self'; upgrade-insecure-requests; block-all-mixed-content; \
             require-trusted-types-for 'script'; sandbox; report-uri /csp-reports; \
             report-to csp-endpoint"
        );
    }

    #[test]
    fn test_blank_report_uri_fails_at_build() {
        let result = ContentSecurityPolicy::builder()
            .default_src(|d| d.self_())
            .report_uri(" ")
            .build();
        assert!(matches!(result, Err(SecurityHeadersError::InvalidArgument(_))));
    }

    #[test]
    fn test_unknown_hash_algorithm_fails_at_build() {
        let result = ContentSecurityPolicy::builder()
            .script_src(|d| d.with_hash("sha1", "abc"))
            .build();
        assert!(matches!(
            result,
            Err(SecurityHeadersError::InvalidHashAlgorithm(_))
        ));
    }

    #[test]
    fn test_get_directive() {
        let policy = baseline();
        assert!(policy.get_directive("object-src").unwrap().is_blocked());
        assert!(policy.get_directive("script-src").is_none());
    }
}
