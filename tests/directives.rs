use actix_web_security_headers::core::{
    DefaultSrc, Directive, DirectiveSpec, DynamicSource, FrameAncestors, HashTagHelperDirective,
    ImgSrc, InlineSourceDirective, Sandbox, ScriptSrc, SourceListDirective, StyleSrc,
};
use actix_web_security_headers::security::{InlineContext, RequestSecurityState};
use actix_web_security_headers::{SecurityHeadersError, Source};
use proptest::prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_tokens_render_in_order() {
        let directive = ImgSrc::new()
            .self_()
            .from("https://cdn.example.com")
            .data()
            .blob()
            .build();

        let state = RequestSecurityState::default();
        assert_eq!(
            directive.render(&state),
            "'self' https://cdn.example.com data: blob:"
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let directive = ImgSrc::new().self_().self_().build();
        assert_eq!(
            directive.render(&RequestSecurityState::default()),
            "'self' 'self'"
        );
    }

    #[test]
    fn test_static_render_is_independent_of_request_state() {
        let directive = ScriptSrc::new()
            .self_()
            .strict_dynamic()
            .with_hash256("abc=")
            .build();

        let empty = RequestSecurityState::default();
        let mut busy = RequestSecurityState::default();
        busy.get_or_create_nonce().unwrap();
        busy.add_hash_source(InlineContext::Script, "'sha256-xyz='").unwrap();

        assert_eq!(directive.render(&empty), directive.render(&busy));
        assert_eq!(directive.render(&empty), directive.render(&empty));
    }

    #[test]
    fn test_none_ignores_other_tokens() {
        let directive = FrameAncestors::new()
            .self_()
            .from("https://a.example")
            .none()
            .build();
        assert_eq!(directive.render(&RequestSecurityState::default()), "'none'");
        assert!(directive.is_blocked());
    }

    #[test]
    fn test_report_sample_renders_first() {
        let directive = ScriptSrc::new().self_().report_sample().build();
        assert_eq!(
            directive.render(&RequestSecurityState::default()),
            "'report-sample' 'self'"
        );

        let added_last = StyleSrc::new()
            .self_()
            .unsafe_inline()
            .with_hash256("abc=")
            .report_sample()
            .build();
        assert_eq!(
            added_last.render(&RequestSecurityState::default()),
            "'report-sample' 'self' 'unsafe-inline' 'sha256-abc='"
        );
    }

    #[test]
    fn test_nonce_source_uses_request_nonce() {
        let directive = ScriptSrc::new().self_().with_nonce().build();
        let state = RequestSecurityState::default();

        assert_eq!(directive.render(&state), "'self'");

        let nonce = state.get_or_create_nonce().unwrap().to_owned();
        assert_eq!(
            directive.render(&state),
            format!("'self' 'nonce-{}'", nonce)
        );
    }

    #[test]
    fn test_dynamic_sources_are_deduplicated_by_id() {
        let directive = ScriptSrc::new().with_nonce().with_nonce().build();
        assert_eq!(directive.dynamic_sources().len(), 1);

        let mut directive = Directive::new("script-src");
        directive
            .add_dynamic(DynamicSource::new("static", |_| Some("'a'".to_string())))
            .add_dynamic(DynamicSource::new("static", |_| Some("'b'".to_string())));
        assert_eq!(directive.render(&RequestSecurityState::default()), "'a'");
    }

    #[test]
    fn test_empty_dynamic_results_are_skipped() {
        let mut directive = Directive::new("connect-src");
        directive
            .add_token("'self'")
            .add_dynamic(DynamicSource::new("empty", |_| None));
        assert_eq!(directive.render(&RequestSecurityState::default()), "'self'");
    }

    #[test]
    fn test_hash_tag_helper_reads_matching_context() {
        let script = ScriptSrc::new().self_().with_hash_tag_helper().build();
        let style = StyleSrc::new().with_hash_tag_helper().build();

        let mut state = RequestSecurityState::default();
        state.add_hash_source(InlineContext::Script, "'sha256-one='").unwrap();
        state.add_hash_source(InlineContext::Script, "'sha256-two='").unwrap();

        assert_eq!(script.render(&state), "'self' 'sha256-one=' 'sha256-two='");
        assert_eq!(style.render(&state), "");
    }

    #[test]
    fn test_hash_helpers_format_without_validation() {
        let directive = DefaultSrc::new()
            .with_hash256("a")
            .with_hash384("b")
            .with_hash512("c")
            .build();
        assert_eq!(
            directive.render(&RequestSecurityState::default()),
            "'sha256-a' 'sha384-b' 'sha512-c'"
        );
        assert!(directive.contains_hash());
    }

    #[test]
    fn test_with_hash_rejects_unknown_algorithm() {
        let directive = ScriptSrc::new().with_hash("md5", "abc").build();
        assert!(matches!(
            directive.validate(),
            Err(SecurityHeadersError::InvalidHashAlgorithm(algorithm)) if algorithm == "md5"
        ));

        let directive = ScriptSrc::new().with_hash("SHA384", "abc").build();
        assert!(directive.validate().is_ok());
        assert_eq!(
            directive.render(&RequestSecurityState::default()),
            "'sha384-abc'"
        );
    }

    #[test]
    fn test_blank_host_is_invalid() {
        let directive = ImgSrc::new().from("   ").build();
        assert!(matches!(
            directive.validate(),
            Err(SecurityHeadersError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_host_with_line_break_is_invalid() {
        let directive = ImgSrc::new().from("https://a.example\r\nx: y").build();
        assert!(directive.validate().is_err());
    }

    #[test]
    fn test_inline_keywords() {
        let directive = ScriptSrc::new()
            .unsafe_inline()
            .unsafe_eval()
            .wasm_unsafe_eval()
            .unsafe_hashes()
            .build();
        assert_eq!(
            directive.render(&RequestSecurityState::default()),
            "'unsafe-inline' 'unsafe-eval' 'wasm-unsafe-eval' 'unsafe-hashes'"
        );
    }

    #[test]
    fn test_scheme_sources() {
        let directive = ImgSrc::new()
            .over_https()
            .over_http()
            .add_source(Source::scheme("wss"))
            .build();
        assert_eq!(
            directive.render(&RequestSecurityState::default()),
            "https: http: wss:"
        );
    }

    #[test]
    fn test_sandbox_values() {
        let empty = Sandbox::new().build();
        assert_eq!(empty.render(&RequestSecurityState::default()), "");

        let sandbox = Sandbox::new()
            .allow_scripts()
            .allow_forms()
            .allow_scripts()
            .build();
        assert_eq!(
            sandbox.render(&RequestSecurityState::default()),
            "allow-scripts allow-forms"
        );
    }

    #[test]
    fn test_typed_directive_names() {
        assert_eq!(ScriptSrc::NAME, "script-src");
        assert_eq!(FrameAncestors::NAME, "frame-ancestors");
        assert_eq!(ImgSrc::new().build().name(), "img-src");
    }
}

fn apply(builder: ScriptSrc, op: u8) -> ScriptSrc {
    match op % 6 {
        0 => builder.self_(),
        1 => builder.unsafe_inline(),
        2 => builder.from("https://cdn.example.com"),
        3 => builder.with_nonce(),
        4 => builder.report_sample(),
        _ => builder.with_hash_tag_helper(),
    }
}

proptest! {
    #[test]
    fn prop_none_wins_in_any_order(
        ops in proptest::collection::vec(any::<u8>(), 0..12),
        position in any::<prop::sample::Index>(),
    ) {
        let none_at = position.index(ops.len() + 1);
        let mut builder = ScriptSrc::new();
        for (i, op) in ops.iter().enumerate() {
            if i == none_at {
                builder = builder.none();
            }
            builder = apply(builder, *op);
        }
        if none_at == ops.len() {
            builder = builder.none();
        }

        let directive = builder.build();
        let mut state = RequestSecurityState::default();
        state.get_or_create_nonce().unwrap();
        state.add_hash_source(InlineContext::Script, "'sha256-x='").unwrap();

        prop_assert_eq!(directive.render(&state), "'none'");
    }
}
