use crate::core::collection::HeaderPolicyCollection;
use crate::core::policy::HeaderResult;
use crate::engine::context::PolicyContext;
use crate::security::state::RequestSecurityState;
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;

/// Where evaluated headers end up.
pub trait HeaderSink {
    /// Once true, writes are dropped without error.
    fn headers_sent(&self) -> bool {
        false
    }

    /// Sets `name`, replacing every existing value.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    fn remove_header(&mut self, name: &HeaderName);
}

impl HeaderSink for HeaderMap {
    #[inline]
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.insert(name, value);
    }

    #[inline]
    fn remove_header(&mut self, name: &HeaderName) {
        self.remove(name);
    }
}

/// Per-request progress of header evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationPhase {
    Idle,
    NonceMaybeGenerated,
    ResponseStarting,
    HeadersWritten,
    Done,
}

/// Counts from one [`PolicyEvaluation::write_headers`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationOutcome {
    pub written: usize,
    pub removed: usize,
    /// Policies gated out by content type or that chose not to apply.
    pub skipped: usize,
    /// Policies discarded because the headers were already sent.
    pub dropped: usize,
}

/// Applies one collection to one response, exactly once.
#[derive(Debug)]
pub struct PolicyEvaluation {
    collection: Arc<HeaderPolicyCollection>,
    phase: EvaluationPhase,
}

impl PolicyEvaluation {
    #[inline]
    pub fn new(collection: Arc<HeaderPolicyCollection>) -> Self {
        Self {
            collection,
            phase: EvaluationPhase::Idle,
        }
    }

    #[inline]
    pub fn phase(&self) -> EvaluationPhase {
        self.phase
    }

    #[inline]
    pub fn collection(&self) -> &Arc<HeaderPolicyCollection> {
        &self.collection
    }

    /// Request start: generates the nonce if the collection renders one.
    /// A generation failure is logged and the nonce source is left out.
    pub fn begin(&mut self, state: &RequestSecurityState) {
        if self.phase != EvaluationPhase::Idle {
            return;
        }
        let requires_nonce = self.collection.requires_nonce();
        state.set_nonce_required(requires_nonce);
        if requires_nonce {
            if let Err(e) = state.get_or_create_nonce() {
                log::error!("Failed to generate CSP nonce: {}", e);
            }
        }
        self.phase = EvaluationPhase::NonceMaybeGenerated;
    }

    /// Request start before routing, while a route may still select another
    /// collection. Only marks whether this collection needs a nonce; the
    /// first read of [`RequestSecurityState::nonce`] or [`begin`](Self::begin)
    /// generates it.
    pub fn prepare(&self, state: &RequestSecurityState) {
        if self.phase == EvaluationPhase::Idle {
            state.set_nonce_required(self.collection.requires_nonce());
        }
    }

    /// Response start: evaluates every policy in insertion order and writes
    /// the result into `sink`. Later calls do nothing.
    pub fn write_headers<H>(&mut self, ctx: &PolicyContext<'_>, sink: &mut H) -> EvaluationOutcome
    where
        H: HeaderSink + ?Sized,
    {
        let mut outcome = EvaluationOutcome::default();

        match self.phase {
            EvaluationPhase::Idle => self.begin(ctx.state),
            EvaluationPhase::NonceMaybeGenerated => {}
            _ => {
                log::trace!("Security headers already evaluated for {}", ctx.path);
                return outcome;
            }
        }
        self.phase = EvaluationPhase::ResponseStarting;

        if sink.headers_sent() {
            log::debug!(
                "Response headers for {} already sent, dropping {} security headers",
                ctx.path,
                self.collection.len()
            );
            outcome.dropped = self.collection.len();
            self.phase = EvaluationPhase::Done;
            return outcome;
        }

        for policy in self.collection.iter() {
            if !self.collection.is_applicable(policy, ctx.content_type) {
                outcome.skipped += 1;
                continue;
            }
            match policy.evaluate(ctx) {
                Some(HeaderResult::Set(name, value)) => {
                    sink.set_header(name, value);
                    outcome.written += 1;
                }
                Some(HeaderResult::Remove(name)) => {
                    sink.remove_header(&name);
                    outcome.removed += 1;
                }
                None => outcome.skipped += 1,
            }
        }

        self.phase = EvaluationPhase::HeadersWritten;
        outcome
    }

    #[inline]
    pub fn finish(&mut self) {
        self.phase = EvaluationPhase::Done;
    }
}
