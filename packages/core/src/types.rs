// ABOUTME: Closed enumerations for the prompt-optimization engine
// ABOUTME: Intent categories, verbosity tiers, provider classes, and session descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

/// User-intent category inferred from the latest chat message.
///
/// The set is closed: the rule knowledge base declares keyword tables and
/// rule mappings for exactly these categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentCategory {
    CreateProject,
    AddFeature,
    FixBug,
    RefactorCode,
    DatabaseOps,
    DesignUi,
    ExplainCode,
    DeployConfig,
    AddTests,
    GeneralDiscuss,
}

impl IntentCategory {
    /// Every category, in declaration order. Ranking ties during
    /// classification are broken by position in this array.
    pub const ALL: [IntentCategory; 10] = [
        IntentCategory::CreateProject,
        IntentCategory::AddFeature,
        IntentCategory::FixBug,
        IntentCategory::RefactorCode,
        IntentCategory::DatabaseOps,
        IntentCategory::DesignUi,
        IntentCategory::ExplainCode,
        IntentCategory::DeployConfig,
        IntentCategory::AddTests,
        IntentCategory::GeneralDiscuss,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::CreateProject => "create-project",
            IntentCategory::AddFeature => "add-feature",
            IntentCategory::FixBug => "fix-bug",
            IntentCategory::RefactorCode => "refactor-code",
            IntentCategory::DatabaseOps => "database-ops",
            IntentCategory::DesignUi => "design-ui",
            IntentCategory::ExplainCode => "explain-code",
            IntentCategory::DeployConfig => "deploy-config",
            IntentCategory::AddTests => "add-tests",
            IntentCategory::GeneralDiscuss => "general-discuss",
        }
    }

    /// Categories that produce code changes; boosted in build mode.
    pub fn is_implementation(&self) -> bool {
        matches!(
            self,
            IntentCategory::CreateProject | IntentCategory::AddFeature | IntentCategory::FixBug
        )
    }

    /// Categories that produce explanations; boosted in discussion mode.
    pub fn is_explanatory(&self) -> bool {
        matches!(
            self,
            IntentCategory::ExplainCode | IntentCategory::GeneralDiscuss
        )
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification confidence, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// One level weaker; already-low confidence stays low.
    pub fn downgraded(self) -> Confidence {
        match self {
            Confidence::High => Confidence::Medium,
            Confidence::Medium | Confidence::Low => Confidence::Low,
        }
    }
}

/// Task complexity derived from per-category indicator phrases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Moderate,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }
}

/// Instruction density tier, ordered by token cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbosityLevel {
    Minimal,
    Standard,
    Detailed,
}

impl VerbosityLevel {
    pub const ALL: [VerbosityLevel; 3] = [
        VerbosityLevel::Minimal,
        VerbosityLevel::Standard,
        VerbosityLevel::Detailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VerbosityLevel::Minimal => "minimal",
            VerbosityLevel::Standard => "standard",
            VerbosityLevel::Detailed => "detailed",
        }
    }

    /// Next tier down, if one exists.
    pub fn lower(self) -> Option<VerbosityLevel> {
        match self {
            VerbosityLevel::Minimal => None,
            VerbosityLevel::Standard => Some(VerbosityLevel::Minimal),
            VerbosityLevel::Detailed => Some(VerbosityLevel::Standard),
        }
    }

    /// Next tier up, if one exists.
    pub fn higher(self) -> Option<VerbosityLevel> {
        match self {
            VerbosityLevel::Minimal => Some(VerbosityLevel::Standard),
            VerbosityLevel::Standard => Some(VerbosityLevel::Detailed),
            VerbosityLevel::Detailed => None,
        }
    }
}

impl fmt::Display for VerbosityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inference-backend class. Each category owns a provider profile in the
/// rule knowledge base (base verbosity, token budgets, adjustment table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderCategory {
    LargeContext,
    ReasoningInternal,
    SpeedOptimized,
    SelfHosted,
    CodingSpecialized,
    GeneralPurpose,
}

impl ProviderCategory {
    pub const ALL: [ProviderCategory; 6] = [
        ProviderCategory::LargeContext,
        ProviderCategory::ReasoningInternal,
        ProviderCategory::SpeedOptimized,
        ProviderCategory::SelfHosted,
        ProviderCategory::CodingSpecialized,
        ProviderCategory::GeneralPurpose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderCategory::LargeContext => "large-context",
            ProviderCategory::ReasoningInternal => "reasoning-internal",
            ProviderCategory::SpeedOptimized => "speed-optimized",
            ProviderCategory::SelfHosted => "self-hosted",
            ProviderCategory::CodingSpecialized => "coding-specialized",
            ProviderCategory::GeneralPurpose => "general-purpose",
        }
    }

    /// Map a free-form provider or model name onto a category.
    ///
    /// Reasoning families are checked first because their names overlap with
    /// general-purpose ones, and coding models before self-hosted so that
    /// names like "qwen2.5-coder" land on the coding profile.
    pub fn categorize(name: &str) -> ProviderCategory {
        let name = name.to_lowercase();

        if name.contains("o1")
            || name.contains("o3")
            || name.contains("r1")
            || name.contains("reason")
            || name.contains("thinking")
        {
            ProviderCategory::ReasoningInternal
        } else if name.contains("gemini") || name.contains("opus") || name.contains("200k") {
            ProviderCategory::LargeContext
        } else if name.contains("flash")
            || name.contains("haiku")
            || name.contains("groq")
            || name.contains("turbo")
            || name.contains("mini")
            || name.contains("lite")
        {
            ProviderCategory::SpeedOptimized
        } else if name.contains("coder") || name.contains("codestral") || name.contains("code-") {
            ProviderCategory::CodingSpecialized
        } else if name.contains("ollama")
            || name.contains("llama")
            || name.contains("mistral")
            || name.contains("local")
            || name.contains("vllm")
        {
            ProviderCategory::SelfHosted
        } else {
            ProviderCategory::GeneralPurpose
        }
    }
}

impl fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session mode. Build sessions bias classification toward implementation
/// categories, discussion sessions toward explanatory ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    Discuss,
    #[default]
    Build,
}

/// Self-reported user experience level; feeds verbosity adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Expert => "expert",
        }
    }
}

/// How urgent the session is; feeds verbosity adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePressure {
    Relaxed,
    Normal,
    Urgent,
}

impl TimePressure {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimePressure::Relaxed => "relaxed",
            TimePressure::Normal => "normal",
            TimePressure::Urgent => "urgent",
        }
    }
}

/// Severity of a content-safety violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}
