// ABOUTME: Benchmark and regression harness for the Promptsmith engine
// ABOUTME: Measures baseline versus optimized assembly and reports effectiveness trends

pub mod harness;
pub mod types;

pub use harness::{compare, BenchmarkHarness, MAX_HISTORY, RECENT_WINDOW, STABLE_BAND_PCT};
pub use types::{
    Algorithm, BenchmarkComparison, BenchmarkResult, BenchmarkScenario, ComparisonMetrics,
    TrendDirection, TrendReport,
};
