// ABOUTME: Request and result types for prompt assembly
// ABOUTME: Session context, connection state, placeholders, and the assembled-prompt report

use serde::{Deserialize, Serialize};

use promptsmith_core::{
    ChatMessage, ChatMode, Complexity, Confidence, ExperienceLevel, IntentCategory,
    ProviderCategory, Severity, TimePressure, VerbosityLevel,
};
use promptsmith_intent::DetectedIntent;
use promptsmith_rules::VariantKey;

/// Session facts that drive verbosity adjustments. Every field is
/// optional; unset fields simply skip their adjustment lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub task_complexity: Option<Complexity>,
    pub user_experience: Option<ExperienceLevel>,
    pub time_pressure: Option<TimePressure>,
    pub is_existing_project: Option<bool>,
    pub is_debugging: Option<bool>,
}

impl SessionContext {
    /// Fields in canonical order. Adjustments are applied in this order
    /// and later fields win, so debugging always has the last word.
    pub fn fields(&self) -> [(&'static str, Option<String>); 5] {
        [
            (
                "task_complexity",
                self.task_complexity.map(|v| v.as_str().to_string()),
            ),
            (
                "user_experience",
                self.user_experience.map(|v| v.as_str().to_string()),
            ),
            (
                "time_pressure",
                self.time_pressure.map(|v| v.as_str().to_string()),
            ),
            (
                "is_existing_project",
                self.is_existing_project.map(|v| v.to_string()),
            ),
            ("is_debugging", self.is_debugging.map(|v| v.to_string())),
        ]
    }
}

/// Backend connection facts, used to pick rule variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub service_connected: bool,
    pub project_selected: bool,
    pub credentials_present: bool,
}

impl ConnectionState {
    /// Which variant of a connection-aware rule applies. Fully configured
    /// requires all three facts; a missing project or missing credentials
    /// both read as pending.
    pub fn variant(&self) -> VariantKey {
        if !self.service_connected {
            VariantKey::NeedsSetup
        } else if !self.project_selected || !self.credentials_present {
            VariantKey::ProjectPending
        } else {
            VariantKey::FullyConfigured
        }
    }
}

pub const DEFAULT_WORKING_DIR: &str = "the project workspace";
pub const DEFAULT_ALLOWED_ELEMENTS: &str = "plain prose and fenced code blocks";
pub const DEFAULT_DESIGN_SCHEME: &str = "the existing component library and design tokens";

/// Values substituted into rule-text placeholders. Unset values fall
/// back to neutral defaults so rendered text never shows raw tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderValues {
    pub working_dir: Option<String>,
    pub allowed_elements: Option<String>,
    pub design_scheme: Option<String>,
}

impl PlaceholderValues {
    pub fn resolved(&self) -> [(&'static str, &str); 3] {
        [
            (
                "working_dir",
                self.working_dir.as_deref().unwrap_or(DEFAULT_WORKING_DIR),
            ),
            (
                "allowed_elements",
                self.allowed_elements
                    .as_deref()
                    .unwrap_or(DEFAULT_ALLOWED_ELEMENTS),
            ),
            (
                "design_scheme",
                self.design_scheme
                    .as_deref()
                    .unwrap_or(DEFAULT_DESIGN_SCHEME),
            ),
        ]
    }
}

/// Everything the assembler needs for one prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembleRequest {
    pub messages: Vec<ChatMessage>,
    /// Free-form provider or model name, e.g. "gemini-1.5-pro".
    pub model: String,
    #[serde(default)]
    pub chat_mode: ChatMode,
    /// Pre-detected intent from an earlier classification pass. When set
    /// the assembler uses it as-is and skips the classifier.
    #[serde(default)]
    pub intent: Option<DetectedIntent>,
    #[serde(default)]
    pub session: SessionContext,
    #[serde(default)]
    pub connection: ConnectionState,
    #[serde(default)]
    pub placeholders: PlaceholderValues,
    /// Pin the verbosity tier instead of resolving it from the provider
    /// profile and session context.
    #[serde(default)]
    pub verbosity_override: Option<VerbosityLevel>,
}

impl AssembleRequest {
    pub fn new(messages: Vec<ChatMessage>, model: impl Into<String>) -> Self {
        Self {
            messages,
            model: model.into(),
            chat_mode: ChatMode::default(),
            intent: None,
            session: SessionContext::default(),
            connection: ConnectionState::default(),
            placeholders: PlaceholderValues::default(),
            verbosity_override: None,
        }
    }
}

/// How the resolved verbosity came to be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbosityResolution {
    pub verbosity: VerbosityLevel,
    pub provider: ProviderCategory,
    pub base: VerbosityLevel,
    /// Applied adjustments, e.g. "is_debugging: true -> minimal".
    pub adjustments: Vec<String>,
    pub reasoning: String,
}

/// Prompt size relative to the provider's budget at a verbosity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetStatus {
    WithinBudget,
    OverBudget,
    UnderBudget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAssessment {
    pub status: BudgetStatus,
    pub estimated_tokens: u32,
    pub budget: u32,
    /// Tier to move to: one step down when over, one step up when under.
    pub recommended: Option<VerbosityLevel>,
    pub note: Option<String>,
}

/// One safety-pattern hit in assembled text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub category: String,
    pub severity: Severity,
    pub description: String,
    /// The text span that triggered the pattern.
    pub matched: String,
}

/// Safety-validation outcome. Warnings and notes keep `valid` true;
/// only error-severity violations fail the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

/// Notable decisions made while assembling a prompt, in pipeline order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OptimizationFlag {
    IntentClassified {
        category: IntentCategory,
        confidence: Confidence,
    },
    VerbosityResolved {
        level: VerbosityLevel,
    },
    VerbosityForced {
        level: VerbosityLevel,
    },
    Degraded {
        from: VerbosityLevel,
        to: VerbosityLevel,
    },
    OverBudget {
        estimated_tokens: u32,
        budget: u32,
    },
    VariantInjected {
        category: String,
        variant: VariantKey,
    },
}

/// Final assembled system prompt plus everything decided along the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledPrompt {
    pub text: String,
    pub provider: ProviderCategory,
    pub intent: DetectedIntent,
    pub verbosity: VerbosityLevel,
    pub estimated_tokens: u32,
    pub token_budget: u32,
    /// Rule categories included, in render order.
    pub included_rules: Vec<String>,
    pub validation: ValidationReport,
    pub optimizations: Vec<OptimizationFlag>,
    /// Version of the rule knowledge base the prompt was built from.
    pub kb_version: String,
}
