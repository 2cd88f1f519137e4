pub mod context;
pub mod evaluation;
pub mod resolution;

pub use context::PolicyContext;
pub use evaluation::{EvaluationOutcome, EvaluationPhase, HeaderSink, PolicyEvaluation};
pub use resolution::{
    resolve_named_policy, resolve_policy, EndpointPolicyMetadata, PolicySelectorContext,
    PolicySource, ResolvedPolicy,
};
