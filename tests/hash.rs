use actix_web_security_headers::security::{normalize_line_endings, HashAlgorithm, HashGenerator};
use actix_web_security_headers::{SecurityHeadersError, Source};

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_sha256_of_inline_style() {
        assert_eq!(
            HashGenerator::content_hash(HashAlgorithm::Sha256, "color: red"),
            "NerDAUWfwD31YdZHveMrq0GLjsNFMwxLpZl0dPUeCcw="
        );
        assert_eq!(
            HashGenerator::content_hash_token(HashAlgorithm::Sha256, "color: red"),
            "'sha256-NerDAUWfwD31YdZHveMrq0GLjsNFMwxLpZl0dPUeCcw='"
        );
    }

    #[test]
    fn test_sha384_of_inline_script() {
        assert_eq!(
            HashGenerator::content_hash(HashAlgorithm::Sha384, "console.log(1)"),
            "vuz+yO71bcb30P4dMUNzy6/D2y+6d/n0KcOnt5clJtTBxEDoKAqGay0stFlC8Dpr"
        );
    }

    #[test]
    fn test_crlf_is_normalized_before_hashing() {
        let unix = HashGenerator::content_hash(HashAlgorithm::Sha256, "\ncolor: red;\n");
        let windows = HashGenerator::content_hash(HashAlgorithm::Sha256, "\r\ncolor: red;\r\n");
        assert_eq!(unix, "oFeF3HUOtMI/Z3EY7S8hyzN6XDjhGfwfpIMkFnF4BgA=");
        assert_eq!(unix, windows);
    }

    #[test]
    fn test_normalize_borrows_when_unchanged() {
        assert!(matches!(
            normalize_line_endings("a\nb"),
            std::borrow::Cow::Borrowed(_)
        ));
        assert_eq!(normalize_line_endings("a\r\nb\r\n"), "a\nb\n");
        // A lone CR is not a line ending pair.
        assert_eq!(normalize_line_endings("a\rb"), "a\rb");
    }

    #[test]
    fn test_large_input_matches_single_shot_digest() {
        let content = "x".repeat(50_000);
        let chunked = HashGenerator::generate(HashAlgorithm::Sha512, content.as_bytes());
        assert_eq!(
            chunked,
            HashGenerator::content_hash(HashAlgorithm::Sha512, &content)
        );
        assert_eq!(chunked.len(), 88);
    }

    #[test]
    fn test_generate_source_and_verify() {
        let source = HashGenerator::generate_source(HashAlgorithm::Sha256, "color: red");
        assert_eq!(
            source,
            Source::Hash {
                algorithm: HashAlgorithm::Sha256,
                value: "NerDAUWfwD31YdZHveMrq0GLjsNFMwxLpZl0dPUeCcw=".into(),
            }
        );
        assert!(HashGenerator::verify_hash(
            HashAlgorithm::Sha256,
            "color: red",
            "NerDAUWfwD31YdZHveMrq0GLjsNFMwxLpZl0dPUeCcw="
        ));
        assert!(!HashGenerator::verify_hash(
            HashAlgorithm::Sha256,
            "color: blue",
            "NerDAUWfwD31YdZHveMrq0GLjsNFMwxLpZl0dPUeCcw="
        ));
    }

    #[test_case("sha256", HashAlgorithm::Sha256 ; "lowercase sha256")]
    #[test_case("SHA384", HashAlgorithm::Sha384 ; "uppercase sha384")]
    #[test_case(" Sha512 ", HashAlgorithm::Sha512 ; "padded sha512")]
    fn test_algorithm_parsing(input: &str, expected: HashAlgorithm) {
        assert_eq!(input.parse::<HashAlgorithm>().unwrap(), expected);
    }

    #[test_case("md5" ; "md5")]
    #[test_case("sha1" ; "sha1")]
    #[test_case("" ; "empty")]
    fn test_unknown_algorithms_are_rejected(input: &str) {
        assert!(HashAlgorithm::try_from(input).is_err());
    }

    #[test_case(HashAlgorithm::Sha256, "'sha256-abc'")]
    #[test_case(HashAlgorithm::Sha384, "'sha384-abc'")]
    #[test_case(HashAlgorithm::Sha512, "'sha512-abc'")]
    fn test_format_source(algorithm: HashAlgorithm, expected: &str) {
        assert_eq!(algorithm.format_source("abc"), expected);
    }

    #[test_case("'sha256-NerDAUWfwD31YdZHveMrq0GLjsNFMwxLpZl0dPUeCcw='", HashAlgorithm::Sha256 ; "padded sha256")]
    #[test_case("'sha384-abc'", HashAlgorithm::Sha384 ; "unpadded sha384")]
    #[test_case("'sha512-a_b-c=='", HashAlgorithm::Sha512 ; "base64url sha512")]
    fn test_valid_source_tokens(token: &str, expected: HashAlgorithm) {
        assert_eq!(HashGenerator::validate_source_token(token).unwrap(), expected);
    }

    #[test_case("sha256-abc=" ; "unquoted")]
    #[test_case("'sha256-'" ; "empty digest")]
    #[test_case("'sha256-abc==='" ; "too much padding")]
    #[test_case("'sha256-a=bc'" ; "padding inside digest")]
    #[test_case("'sha256-abc' 'unsafe-inline'" ; "two tokens")]
    #[test_case("'sha1-abc='" ; "unsupported algorithm")]
    #[test_case("' sha256-abc='" ; "space before algorithm")]
    fn test_invalid_source_tokens(token: &str) {
        assert!(HashGenerator::validate_source_token(token).is_err());
    }

    #[test]
    fn test_header_injection_is_rejected() {
        assert!(matches!(
            HashGenerator::validate_source_token("'sha256-x'\r\nx: y"),
            Err(SecurityHeadersError::InvalidArgument(_))
        ));
    }
}
