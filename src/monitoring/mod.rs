pub mod stats;

pub use stats::SecurityHeadersStats;
