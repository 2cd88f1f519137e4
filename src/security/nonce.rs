use crate::constants::DEFAULT_NONCE_LENGTH;
use crate::error::SecurityHeadersError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

/// Source of the random bytes behind each nonce.
pub trait RandomSource: Send + Sync {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), SecurityHeadersError>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    #[inline]
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), SecurityHeadersError> {
        getrandom::getrandom(dest).map_err(|e| SecurityHeadersError::RandomSource(e.to_string()))
    }
}

pub struct NonceGenerator {
    length: usize,
    source: Arc<dyn RandomSource>,
    generated: AtomicUsize,
}

impl NonceGenerator {
    #[inline]
    pub fn new(length: usize) -> Self {
        Self::with_source(length, Arc::new(OsRandom))
    }

    #[inline]
    pub fn with_source(length: usize, source: Arc<dyn RandomSource>) -> Self {
        Self {
            length,
            source,
            generated: AtomicUsize::new(0),
        }
    }

    /// `length` random bytes, standard base64.
    pub fn generate(&self) -> Result<String, SecurityHeadersError> {
        if self.length == 0 {
            return Err(SecurityHeadersError::ConfigError(
                "nonce length must be greater than zero".to_string(),
            ));
        }

        let mut buffer = vec![0u8; self.length];
        self.source.fill_bytes(&mut buffer)?;
        self.generated.fetch_add(1, Ordering::Relaxed);
        Ok(BASE64.encode(&buffer))
    }

    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn generated_count(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }
}

impl Default for NonceGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_NONCE_LENGTH)
    }
}

impl fmt::Debug for NonceGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonceGenerator")
            .field("length", &self.length)
            .field("generated", &self.generated_count())
            .finish()
    }
}
