//! Analyzer session: the exposed single-symbol and basket operations.

pub mod report;
pub mod session;

pub use report::AnalysisReport;
pub use session::{AnalysisError, AnalyzerOptions, AnalyzerSession, LeadershipEvaluation, MacdStrategy};

/// Benchmark used when none is configured (KOSPI composite).
pub const DEFAULT_BENCHMARK: &str = "^KS11";
