// ABOUTME: Benchmark harness comparing baseline and optimized prompt assembly
// ABOUTME: Times each algorithm per provider, scores the results, and tracks rolling trends

use std::collections::VecDeque;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use promptsmith_core::{ProviderCategory, VerbosityLevel};
use promptsmith_engine::{ContentValidator, PromptAssembler};
use promptsmith_intent::{ClassifyOptions, IntentClassifier};
use promptsmith_rules::RuleRegistry;

use crate::types::{
    Algorithm, BenchmarkComparison, BenchmarkResult, BenchmarkScenario, ComparisonMetrics,
    TrendDirection, TrendReport,
};

/// Comparisons kept for trend analysis. Oldest entries fall off first.
pub const MAX_HISTORY: usize = 50;
/// Upper bound on the most-recent window when partitioning history.
pub const RECENT_WINDOW: usize = 5;
/// Relative change inside this band reads as stable, not a trend.
pub const STABLE_BAND_PCT: f64 = 2.0;

/// Runs the assembly algorithms against scenarios and accumulates a
/// bounded history of comparisons. Runs are sequential so timings stay
/// uncontaminated. Not synchronized; callers sharing a harness across
/// threads must add their own barrier.
pub struct BenchmarkHarness<'a> {
    kb: &'a RuleRegistry,
    history: VecDeque<BenchmarkComparison>,
}

impl<'a> BenchmarkHarness<'a> {
    pub fn new(kb: &'a RuleRegistry) -> Self {
        Self {
            kb,
            history: VecDeque::with_capacity(MAX_HISTORY),
        }
    }

    /// Benchmarks the scenario against each provider in turn. Every
    /// provider gets all three algorithm runs; the returned comparison
    /// scores the intent-optimized run against the static baseline and
    /// carries the provider-tuned run as an intermediate reference.
    pub fn run_comparison(
        &mut self,
        scenario: &BenchmarkScenario,
        providers: &[&str],
    ) -> Vec<BenchmarkComparison> {
        let mut comparisons = Vec::with_capacity(providers.len());
        for &provider in providers {
            let baseline = self.measure(scenario, provider, Algorithm::StaticBaseline);
            let provider_tuned = self.measure(scenario, provider, Algorithm::ProviderTuned);
            let optimized = self.measure(scenario, provider, Algorithm::IntentOptimized);
            let metrics = compare(&baseline, &optimized);
            info!(
                provider,
                scenario = scenario.name.as_str(),
                size_reduction_pct = metrics.size_reduction_pct,
                quality_score = metrics.quality_score,
                "benchmark comparison complete"
            );
            let comparison = BenchmarkComparison {
                scenario: scenario.name.clone(),
                provider: provider.to_string(),
                baseline,
                provider_tuned,
                optimized,
                metrics,
                measured_at: Utc::now(),
            };
            self.record(comparison.clone());
            comparisons.push(comparison);
        }
        comparisons
    }

    pub fn history(&self) -> &VecDeque<BenchmarkComparison> {
        &self.history
    }

    /// Clears the accumulated run history.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Partitions history into a most-recent window and everything
    /// earlier, then reports how average prompt size and average
    /// assembly latency moved between the two. Needs at least two
    /// entries per window.
    pub fn analyze_trends(&self) -> Option<TrendReport> {
        let total = self.history.len();
        if total < 4 {
            return None;
        }
        let recent_len = RECENT_WINDOW.min(total / 2);
        let entries: Vec<&BenchmarkComparison> = self.history.iter().collect();
        let (earlier, recent) = entries.split_at(total - recent_len);

        let recent_avg_tokens = average(recent, |c| f64::from(c.optimized.estimated_tokens));
        let earlier_avg_tokens = average(earlier, |c| f64::from(c.optimized.estimated_tokens));
        let recent_avg_ms = average(recent, |c| c.optimized.duration_ms);
        let earlier_avg_ms = average(earlier, |c| c.optimized.duration_ms);

        let size_trend = direction(earlier_avg_tokens, recent_avg_tokens);
        let latency_trend = direction(earlier_avg_ms, recent_avg_ms);

        let mut recommendations = Vec::new();
        if size_trend == TrendDirection::Worsening {
            recommendations.push(
                "Average prompt size is rising; review recent rule-text and estimate changes."
                    .to_string(),
            );
        }
        if latency_trend == TrendDirection::Worsening {
            recommendations
                .push("Average assembly time is rising; profile the assembly path.".to_string());
        }

        Some(TrendReport {
            samples: total,
            recent_avg_tokens,
            earlier_avg_tokens,
            size_trend,
            recent_avg_ms,
            earlier_avg_ms,
            latency_trend,
            recommendations,
        })
    }

    fn record(&mut self, comparison: BenchmarkComparison) {
        if self.history.len() == MAX_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(comparison);
    }

    fn measure(
        &self,
        scenario: &BenchmarkScenario,
        provider: &str,
        algorithm: Algorithm,
    ) -> BenchmarkResult {
        let category = ProviderCategory::categorize(provider);
        let started = Instant::now();
        let result = match algorithm {
            Algorithm::StaticBaseline => {
                self.render_flat(scenario, provider, category, VerbosityLevel::Detailed, algorithm)
            }
            Algorithm::ProviderTuned => {
                let base = self.kb.provider(category).base_verbosity;
                self.render_flat(scenario, provider, category, base, algorithm)
            }
            Algorithm::IntentOptimized => {
                let prompt = PromptAssembler::new(self.kb).assemble(&scenario.to_request(provider));
                BenchmarkResult {
                    algorithm,
                    provider: provider.to_string(),
                    provider_category: prompt.provider,
                    intent: prompt.intent.category,
                    verbosity: prompt.verbosity,
                    estimated_tokens: prompt.estimated_tokens,
                    rule_count: prompt.included_rules.len(),
                    duration_ms: 0.0,
                    success: true,
                    valid: prompt.validation.valid,
                }
            }
        };
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(
            provider,
            algorithm = algorithm.as_str(),
            tokens = result.estimated_tokens,
            duration_ms,
            "benchmark run measured"
        );
        BenchmarkResult {
            duration_ms,
            ..result
        }
    }

    /// Renders every rule category at one fixed verbosity, with no
    /// intent selection. The scenario is still classified so the
    /// comparison can check intent agreement.
    fn render_flat(
        &self,
        scenario: &BenchmarkScenario,
        provider: &str,
        category: ProviderCategory,
        verbosity: VerbosityLevel,
        algorithm: Algorithm,
    ) -> BenchmarkResult {
        let options = ClassifyOptions {
            chat_mode: scenario.chat_mode,
            has_existing_files: scenario.session.is_existing_project.unwrap_or(false),
            database_connected: scenario.connection.service_connected,
        };
        let intent = IntentClassifier::new(self.kb).classify(&scenario.messages, &options);

        let categories = self.kb.canonical_categories();
        let mut sections = Vec::with_capacity(categories.len());
        let mut estimated_tokens = 0u32;
        for cat in &categories {
            let Some(rule) = self.kb.rule(cat) else {
                continue;
            };
            let mut text = self.kb.expand_snippets(rule.text_for(verbosity));
            for (token, value) in scenario.placeholders.resolved() {
                text = text.replace(&format!("{{{token}}}"), value);
            }
            estimated_tokens += self.kb.estimate(cat, verbosity);
            sections.push(text);
        }
        let rendered = sections.join("\n\n");
        let report = ContentValidator::new(self.kb).validate(&rendered, &categories);

        BenchmarkResult {
            algorithm,
            provider: provider.to_string(),
            provider_category: category,
            intent: intent.category,
            verbosity,
            estimated_tokens,
            rule_count: sections.len(),
            duration_ms: 0.0,
            success: true,
            valid: report.valid,
        }
    }
}

/// Scores an optimized run against its baseline. Size reduction drives
/// the recommendation; the quality score credits safety validation and
/// intent agreement on top of a 0.5 base.
pub fn compare(baseline: &BenchmarkResult, optimized: &BenchmarkResult) -> ComparisonMetrics {
    let size_reduction_pct = if baseline.estimated_tokens == 0 {
        0.0
    } else {
        (f64::from(baseline.estimated_tokens) - f64::from(optimized.estimated_tokens))
            / f64::from(baseline.estimated_tokens)
            * 100.0
    };
    let speed_improvement_pct = if baseline.duration_ms <= 0.0 {
        0.0
    } else {
        (baseline.duration_ms - optimized.duration_ms) / baseline.duration_ms * 100.0
    };

    let mut quality_score = 0.5;
    if optimized.valid {
        quality_score += 0.3;
    }
    if optimized.intent == baseline.intent {
        quality_score += 0.2;
    }

    let mut recommendation = if size_reduction_pct > 50.0 {
        "Excellent optimization: the tuned prompt is less than half the baseline size.".to_string()
    } else if size_reduction_pct > 25.0 {
        "Good optimization: the tuned prompt delivers solid size savings.".to_string()
    } else if size_reduction_pct > 0.0 {
        "Minor optimization: the tuned prompt is only slightly smaller than the baseline."
            .to_string()
    } else {
        "Optimization ineffective: the tuned prompt is no smaller than the baseline.".to_string()
    };
    if speed_improvement_pct < 0.0 {
        recommendation.push_str(" Assembly was slower than the baseline; treat the timing as suspect until rerun.");
    }

    ComparisonMetrics {
        size_reduction_pct,
        speed_improvement_pct,
        quality_score,
        recommendation,
    }
}

fn average(window: &[&BenchmarkComparison], metric: fn(&BenchmarkComparison) -> f64) -> f64 {
    window.iter().map(|c| metric(c)).sum::<f64>() / window.len() as f64
}

fn direction(earlier: f64, recent: f64) -> TrendDirection {
    if earlier <= 0.0 {
        return TrendDirection::Stable;
    }
    let change_pct = (recent - earlier) / earlier * 100.0;
    if change_pct <= -STABLE_BAND_PCT {
        TrendDirection::Improving
    } else if change_pct >= STABLE_BAND_PCT {
        TrendDirection::Worsening
    } else {
        TrendDirection::Stable
    }
}
