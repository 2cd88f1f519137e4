use crate::engine::evaluation::EvaluationOutcome;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug)]
pub struct SecurityHeadersStats {
    request_count: AtomicUsize,
    nonce_generation_count: AtomicUsize,
    headers_written: AtomicUsize,
    headers_removed: AtomicUsize,
    dropped_writes: AtomicUsize,
    policy_lookup_misses: AtomicUsize,
    start_time: Instant,
}

impl Default for SecurityHeadersStats {
    fn default() -> Self {
        Self {
            request_count: Default::default(),
            nonce_generation_count: Default::default(),
            headers_written: Default::default(),
            headers_removed: Default::default(),
            dropped_writes: Default::default(),
            policy_lookup_misses: Default::default(),
            start_time: Instant::now(),
        }
    }
}

impl SecurityHeadersStats {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn nonce_generation_count(&self) -> usize {
        self.nonce_generation_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn headers_written(&self) -> usize {
        self.headers_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn headers_removed(&self) -> usize {
        self.headers_removed.load(Ordering::Relaxed)
    }

    /// Writes discarded because the response headers were already sent.
    #[inline]
    pub fn dropped_writes(&self) -> usize {
        self.dropped_writes.load(Ordering::Relaxed)
    }

    /// Endpoint policy names that matched no configured collection.
    #[inline]
    pub fn policy_lookup_misses(&self) -> usize {
        self.policy_lookup_misses.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    #[inline]
    pub fn requests_per_second(&self) -> f64 {
        let uptime = self.start_time.elapsed().as_secs_f64();
        if uptime > 0.0 {
            self.request_count() as f64 / uptime
        } else {
            0.0
        }
    }

    #[inline]
    pub(crate) fn increment_request_count(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_nonce_generation_count(&self) {
        self.nonce_generation_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_policy_lookup_misses(&self) {
        self.policy_lookup_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_outcome(&self, outcome: &EvaluationOutcome) {
        self.headers_written
            .fetch_add(outcome.written, Ordering::Relaxed);
        self.headers_removed
            .fetch_add(outcome.removed, Ordering::Relaxed);
        self.dropped_writes
            .fetch_add(outcome.dropped, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.request_count.store(0, Ordering::Relaxed);
        self.nonce_generation_count.store(0, Ordering::Relaxed);
        self.headers_written.store(0, Ordering::Relaxed);
        self.headers_removed.store(0, Ordering::Relaxed);
        self.dropped_writes.store(0, Ordering::Relaxed);
        self.policy_lookup_misses.store(0, Ordering::Relaxed);
    }
}

impl fmt::Display for SecurityHeadersStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Security Headers Statistics:")?;
        writeln!(f, "  Uptime: {} seconds", self.uptime_secs())?;
        writeln!(f, "  Requests processed: {}", self.request_count())?;
        writeln!(
            f,
            "  Requests per second: {:.2}",
            self.requests_per_second()
        )?;
        writeln!(f, "  Nonces generated: {}", self.nonce_generation_count())?;
        writeln!(f, "  Headers written: {}", self.headers_written())?;
        writeln!(f, "  Headers removed: {}", self.headers_removed())?;
        writeln!(f, "  Dropped writes: {}", self.dropped_writes())?;
        writeln!(f, "  Policy lookup misses: {}", self.policy_lookup_misses())?;
        Ok(())
    }
}
