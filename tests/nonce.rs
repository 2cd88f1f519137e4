mod common;

use actix_web_security_headers::security::{NonceGenerator, RandomSource, RequestSecurityState};
use actix_web_security_headers::SecurityHeadersError;
use common::CountingRandom;
use mockall::mock;
use std::collections::HashSet;
use std::sync::Arc;

mock! {
    pub Random {}

    impl RandomSource for Random {
        fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), SecurityHeadersError>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_nonce_is_base64_of_32_bytes() {
        let generator = NonceGenerator::default();
        let nonce = generator.generate().unwrap();

        assert_eq!(generator.length(), 32);
        assert_eq!(nonce.len(), 44);
        assert!(nonce.ends_with('='));
        assert_eq!(generator.generated_count(), 1);
    }

    #[test]
    fn test_nonces_are_unique() {
        let generator = NonceGenerator::new(16);
        let nonces: HashSet<String> = (0..100).map(|_| generator.generate().unwrap()).collect();
        assert_eq!(nonces.len(), 100);
    }

    #[test]
    fn test_nonce_encodes_random_source_output() {
        let source = Arc::new(CountingRandom::default());
        let generator = NonceGenerator::with_source(16, source.clone());

        assert_eq!(generator.generate().unwrap(), "q6urq6urq6urq6urq6urqw==");
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn test_random_source_failure_is_propagated() {
        let mut source = MockRandom::new();
        source
            .expect_fill_bytes()
            .times(1)
            .returning(|_| Err(SecurityHeadersError::RandomSource("unavailable".into())));

        let generator = NonceGenerator::with_source(32, Arc::new(source));
        assert!(matches!(
            generator.generate(),
            Err(SecurityHeadersError::RandomSource(_))
        ));
        assert_eq!(generator.generated_count(), 0);
    }

    #[test]
    fn test_zero_length_is_rejected() {
        let mut source = MockRandom::new();
        source.expect_fill_bytes().never();

        let generator = NonceGenerator::with_source(0, Arc::new(source));
        assert!(generator.generate().is_err());
    }

    #[test]
    fn test_request_nonce_is_stable_within_a_request() {
        let mut source = MockRandom::new();
        source.expect_fill_bytes().times(1).returning(|dest| {
            dest.fill(0xAB);
            Ok(())
        });
        let state = RequestSecurityState::new(Arc::new(NonceGenerator::with_source(
            32,
            Arc::new(source),
        )));

        assert!(!state.has_nonce());
        assert_eq!(state.nonce(), "");

        let first = state.get_or_create_nonce().unwrap().to_owned();
        let second = state.get_or_create_nonce().unwrap().to_owned();
        assert_eq!(first, second);
        assert_eq!(first, "q6urq6urq6urq6urq6urq6urq6urq6urq6urq6urq6s=");
        assert_eq!(state.nonce(), first);
    }

    #[test]
    fn test_requests_get_different_nonces() {
        let generator = Arc::new(NonceGenerator::default());
        let a = RequestSecurityState::new(generator.clone());
        let b = RequestSecurityState::new(generator.clone());

        assert_ne!(
            a.get_or_create_nonce().unwrap(),
            b.get_or_create_nonce().unwrap()
        );
        assert_eq!(generator.generated_count(), 2);
    }

    #[test]
    fn test_required_nonce_is_generated_on_first_read() {
        let source = Arc::new(CountingRandom::default());
        let state = RequestSecurityState::new(Arc::new(NonceGenerator::with_source(
            16,
            source.clone(),
        )));

        state.set_nonce_required(true);
        assert_eq!(state.current_nonce(), None);
        assert_eq!(state.nonce(), "q6urq6urq6urq6urq6urqw==");
        assert_eq!(state.nonce(), "q6urq6urq6urq6urq6urqw==");
        assert_eq!(state.current_nonce(), Some("q6urq6urq6urq6urq6urqw=="));
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn test_nonce_read_without_requirement_generates_nothing() {
        let source = Arc::new(CountingRandom::default());
        let state = RequestSecurityState::new(Arc::new(NonceGenerator::with_source(
            16,
            source.clone(),
        )));

        assert!(!state.nonce_required());
        assert_eq!(state.nonce(), "");
        assert_eq!(source.calls(), 0);
    }
}
