use actix_web_security_headers::core::{
    CrossOriginEmbedderPolicyBuilder, CrossOriginOpenerPolicyBuilder,
    CrossOriginResourcePolicyBuilder, EmbedderPolicy, OpenerPolicy, ResourcePolicy,
};
use actix_web_security_headers::{HeaderPolicy, SecurityHeadersError};

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let coop = CrossOriginOpenerPolicyBuilder::new().build().unwrap();
        let coep = CrossOriginEmbedderPolicyBuilder::new().build().unwrap();
        let corp = CrossOriginResourcePolicyBuilder::new().build().unwrap();

        assert_eq!(coop.header_name().as_str(), "cross-origin-opener-policy");
        assert_eq!(coop.header_value(), "same-origin");
        assert_eq!(coep.header_name().as_str(), "cross-origin-embedder-policy");
        assert_eq!(coep.header_value(), "require-corp");
        assert_eq!(corp.header_name().as_str(), "cross-origin-resource-policy");
        assert_eq!(corp.header_value(), "same-origin");
    }

    #[test]
    fn test_last_directive_wins() {
        let coop = CrossOriginOpenerPolicyBuilder::new()
            .unsafe_none()
            .same_origin_allow_popups()
            .build()
            .unwrap();
        assert_eq!(coop.header_value(), "same-origin-allow-popups");
    }

    #[test]
    fn test_report_to_is_quoted() {
        let coep = CrossOriginEmbedderPolicyBuilder::new()
            .credentialless()
            .report_to("coep-endpoint")
            .build()
            .unwrap();
        assert_eq!(
            coep.header_value(),
            "credentialless; report-to=\"coep-endpoint\""
        );
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "whitespace")]
    #[test_case("a\"b" ; "quote")]
    fn test_invalid_report_endpoint(endpoint: &'static str) {
        let result = CrossOriginOpenerPolicyBuilder::new()
            .report_to(endpoint)
            .build();
        assert!(matches!(result, Err(SecurityHeadersError::InvalidArgument(_))));
    }

    #[test]
    fn test_resource_policy_has_no_reporting() {
        let result = CrossOriginResourcePolicyBuilder::new()
            .same_site()
            .report_to("corp")
            .build();
        assert!(matches!(result, Err(SecurityHeadersError::ConfigError(_))));
    }

    #[test_case("same-origin", OpenerPolicy::SameOrigin)]
    #[test_case("Unsafe-None", OpenerPolicy::UnsafeNone)]
    #[test_case("same-origin-allow-popups", OpenerPolicy::SameOriginAllowPopups)]
    fn test_opener_policy_parsing(input: &str, expected: OpenerPolicy) {
        assert_eq!(input.parse::<OpenerPolicy>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_values_fail() {
        assert!(matches!(
            "require-everything".parse::<EmbedderPolicy>(),
            Err(SecurityHeadersError::InvalidEnumValue { .. })
        ));
        assert!("same-site ".parse::<ResourcePolicy>().is_ok());
        assert!("cross-site".parse::<ResourcePolicy>().is_err());
    }

    #[test]
    fn test_policy_conversion_keeps_header_kind() {
        let coep = CrossOriginEmbedderPolicyBuilder::new().build().unwrap();
        let corp = CrossOriginResourcePolicyBuilder::new()
            .cross_origin()
            .build()
            .unwrap();

        assert!(matches!(
            HeaderPolicy::from(coep),
            HeaderPolicy::CrossOriginEmbedderPolicy(_)
        ));
        assert!(matches!(
            HeaderPolicy::from(corp),
            HeaderPolicy::CrossOriginResourcePolicy(_)
        ));
    }
}
