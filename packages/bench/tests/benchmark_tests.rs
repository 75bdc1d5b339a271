// ABOUTME: Integration tests for the benchmark harness over the embedded rule base
// ABOUTME: Covers comparison runs across provider classes, history bounds, and trend reports

use pretty_assertions::assert_eq;

use promptsmith_bench::{Algorithm, BenchmarkHarness, BenchmarkScenario, TrendDirection};
use promptsmith_core::{IntentCategory, VerbosityLevel};
use promptsmith_rules::RuleRegistry;

// ============================================================================
// Comparison Runs Across Provider Classes
// ============================================================================

#[test]
fn test_comparison_across_provider_classes() {
    let kb = RuleRegistry::embedded().unwrap();
    let mut harness = BenchmarkHarness::new(&kb);
    let scenario = BenchmarkScenario::new(
        "feature-request",
        "Add user profile editing with avatar upload",
    );

    let comparisons =
        harness.run_comparison(&scenario, &["gemini-1.5-pro", "claude-haiku", "ollama/llama3.1"]);

    assert_eq!(comparisons.len(), 3);
    for cmp in &comparisons {
        assert_eq!(cmp.scenario, "feature-request");
        assert_eq!(cmp.baseline.algorithm, Algorithm::StaticBaseline);
        assert_eq!(cmp.provider_tuned.algorithm, Algorithm::ProviderTuned);
        assert_eq!(cmp.optimized.algorithm, Algorithm::IntentOptimized);

        // The static baseline renders the whole rule base at detailed tier.
        assert_eq!(cmp.baseline.verbosity, VerbosityLevel::Detailed);
        assert_eq!(cmp.baseline.estimated_tokens, 2680);
        assert!(cmp.baseline.success);
        assert!(cmp.baseline.valid);

        assert_eq!(cmp.optimized.intent, IntentCategory::AddFeature);
        assert!(cmp.optimized.estimated_tokens < cmp.baseline.estimated_tokens);
        assert!(cmp.optimized.valid);

        assert!(cmp.metrics.size_reduction_pct > 50.0);
        assert!(cmp.metrics.recommendation.starts_with("Excellent optimization"));
        assert!((cmp.metrics.quality_score - 1.0).abs() < 1e-9);
        assert!(cmp.baseline.duration_ms >= 0.0);
    }

    println!("✓ Benchmark comparisons computed for three provider classes");
}

#[test]
fn test_provider_tuning_tracks_base_verbosity() {
    let kb = RuleRegistry::embedded().unwrap();
    let mut harness = BenchmarkHarness::new(&kb);
    let scenario = BenchmarkScenario::new(
        "feature-request",
        "Add user profile editing with avatar upload",
    );

    let comparisons =
        harness.run_comparison(&scenario, &["gemini-1.5-pro", "claude-haiku", "ollama/llama3.1"]);

    // Large-context providers render everything at detailed tier, so the
    // middle artifact matches the static baseline there.
    assert_eq!(comparisons[0].provider_tuned.estimated_tokens, 2680);
    // Speed-optimized providers start minimal, self-hosted start standard.
    assert_eq!(comparisons[1].provider_tuned.estimated_tokens, 665);
    assert_eq!(comparisons[2].provider_tuned.estimated_tokens, 1555);

    // Intent selection cuts the tuned renderings down further.
    assert_eq!(comparisons[1].optimized.estimated_tokens, 295);
    assert_eq!(comparisons[2].optimized.estimated_tokens, 675);

    println!("✓ Provider-tuned runs follow each provider's base verbosity");
}

#[test]
fn test_comparison_report_serializes_for_export() {
    let kb = RuleRegistry::embedded().unwrap();
    let mut harness = BenchmarkHarness::new(&kb);
    let scenario = BenchmarkScenario::new("export-check", "Add a search filter to the list page");

    let comparisons = harness.run_comparison(&scenario, &["claude-haiku"]);
    let value = serde_json::to_value(&comparisons[0]).unwrap();

    assert_eq!(value["provider"], "claude-haiku");
    assert_eq!(value["baseline"]["algorithm"], "static-baseline");
    assert_eq!(value["provider_tuned"]["algorithm"], "provider-tuned");
    assert_eq!(value["optimized"]["algorithm"], "intent-optimized");
    assert!(value["measured_at"].is_string());
    assert!(value["metrics"]["recommendation"].is_string());

    println!("✓ Comparison records serialize with kebab-case algorithm labels");
}

// ============================================================================
// History and Trends
// ============================================================================

#[test]
fn test_history_accumulates_and_resets() {
    let kb = RuleRegistry::embedded().unwrap();
    let mut harness = BenchmarkHarness::new(&kb);
    let scenario = BenchmarkScenario::new("history-check", "Add a search filter to the list page");

    harness.run_comparison(&scenario, &["claude-haiku", "mistral-7b"]);
    assert_eq!(harness.history().len(), 2);

    harness.run_comparison(&scenario, &["claude-haiku"]);
    assert_eq!(harness.history().len(), 3);

    harness.reset();
    assert!(harness.history().is_empty());
    assert!(harness.analyze_trends().is_none());

    println!("✓ History accumulates per comparison and clears on reset");
}

#[test]
fn test_trends_stable_for_repeated_identical_runs() {
    let kb = RuleRegistry::embedded().unwrap();
    let mut harness = BenchmarkHarness::new(&kb);
    let scenario = BenchmarkScenario::new(
        "repeat-run",
        "Add user profile editing with avatar upload",
    );

    for _ in 0..6 {
        harness.run_comparison(&scenario, &["claude-haiku"]);
    }

    let report = harness.analyze_trends().expect("six samples is enough history");
    assert_eq!(report.samples, 6);
    // Token estimates are deterministic, so prompt size cannot drift.
    assert!((report.recent_avg_tokens - 295.0).abs() < 1e-9);
    assert!((report.earlier_avg_tokens - 295.0).abs() < 1e-9);
    assert_eq!(report.size_trend, TrendDirection::Stable);

    println!("✓ Repeated identical runs report a stable size trend");
}
