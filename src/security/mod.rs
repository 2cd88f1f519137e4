pub mod hash;
pub mod nonce;
pub mod state;

pub use hash::{normalize_line_endings, HashAlgorithm, HashGenerator};
pub use nonce::{NonceGenerator, OsRandom, RandomSource};
pub use state::{InlineContext, RequestSecurityState};
