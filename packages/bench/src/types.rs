// ABOUTME: Measurement records for benchmark runs and trend analysis
// ABOUTME: Scenarios, per-algorithm results, comparisons, and rolling-trend reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use promptsmith_core::{ChatMessage, ChatMode, IntentCategory, ProviderCategory, VerbosityLevel};
use promptsmith_engine::{AssembleRequest, ConnectionState, PlaceholderValues, SessionContext};

/// The three assembly strategies the harness measures against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Every rule category rendered at detailed verbosity, ignoring
    /// intent and provider profile. The unoptimized reference point.
    StaticBaseline,
    /// Every rule category rendered at the provider's base verbosity.
    ProviderTuned,
    /// The full pipeline: intent selection, verbosity resolution, and
    /// budget-driven degradation.
    IntentOptimized,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::StaticBaseline => "static-baseline",
            Algorithm::ProviderTuned => "provider-tuned",
            Algorithm::IntentOptimized => "intent-optimized",
        }
    }
}

/// One conversation plus session facts to benchmark across providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkScenario {
    pub name: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub chat_mode: ChatMode,
    #[serde(default)]
    pub session: SessionContext,
    #[serde(default)]
    pub connection: ConnectionState,
    #[serde(default)]
    pub placeholders: PlaceholderValues,
}

impl BenchmarkScenario {
    /// Single-user-turn scenario with default session facts.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: vec![ChatMessage::user(message)],
            chat_mode: ChatMode::default(),
            session: SessionContext::default(),
            connection: ConnectionState::default(),
            placeholders: PlaceholderValues::default(),
        }
    }

    pub fn to_request(&self, model: &str) -> AssembleRequest {
        AssembleRequest {
            messages: self.messages.clone(),
            model: model.to_string(),
            chat_mode: self.chat_mode,
            intent: None,
            session: self.session,
            connection: self.connection,
            placeholders: self.placeholders.clone(),
            verbosity_override: None,
        }
    }
}

/// One timed rendering of a scenario under one algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub algorithm: Algorithm,
    /// Provider or model name as supplied by the caller.
    pub provider: String,
    pub provider_category: ProviderCategory,
    pub intent: IntentCategory,
    pub verbosity: VerbosityLevel,
    pub estimated_tokens: u32,
    pub rule_count: usize,
    pub duration_ms: f64,
    /// Whether the run completed and produced a rendering.
    pub success: bool,
    /// Whether safety validation passed on the rendered text.
    pub valid: bool,
}

/// Scores for an optimized run measured against its baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetrics {
    pub size_reduction_pct: f64,
    pub speed_improvement_pct: f64,
    /// 0.5 base, plus 0.3 when validation passed, plus 0.2 when the
    /// optimized run agrees with the baseline on intent.
    pub quality_score: f64,
    pub recommendation: String,
}

/// Full record of one provider's benchmark: all three algorithm runs
/// plus the baseline-versus-optimized scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub scenario: String,
    pub provider: String,
    pub baseline: BenchmarkResult,
    pub provider_tuned: BenchmarkResult,
    pub optimized: BenchmarkResult,
    pub metrics: ComparisonMetrics,
    pub measured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Worsening,
}

/// Recent-window versus earlier-window averages over the run history.
/// Lower is better for both tracked metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub samples: usize,
    pub recent_avg_tokens: f64,
    pub earlier_avg_tokens: f64,
    pub size_trend: TrendDirection,
    pub recent_avg_ms: f64,
    pub earlier_avg_ms: f64,
    pub latency_trend: TrendDirection,
    pub recommendations: Vec<String>,
}
