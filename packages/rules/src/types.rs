// ABOUTME: Serde data model for the rule knowledge base JSON document
// ABOUTME: Tiered rule text, intent profiles, provider profiles, and safety patterns

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use promptsmith_core::{IntentCategory, ProviderCategory, Severity, VerbosityLevel};

/// Placeholders the engine substitutes into rendered rule text.
pub const DECLARED_PLACEHOLDERS: &[&str] = &["working_dir", "allowed_elements", "design_scheme"];

/// Session-context fields a provider profile may key adjustments on.
pub const CONTEXT_FIELDS: &[&str] = &[
    "task_complexity",
    "user_experience",
    "time_pressure",
    "is_existing_project",
    "is_debugging",
];

/// Rule categories injected into every assembled prompt.
pub const BASELINE_RULES: &[&str] = &["system-identity", "system-constraints", "output-format"];

/// One rule category's instruction text at each verbosity tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    pub minimal: String,
    pub standard: String,
    pub detailed: String,
}

impl RuleEntry {
    pub fn text_for(&self, level: VerbosityLevel) -> &str {
        match level {
            VerbosityLevel::Minimal => &self.minimal,
            VerbosityLevel::Standard => &self.standard,
            VerbosityLevel::Detailed => &self.detailed,
        }
    }

    /// All three tiers with their level, for load-time scans.
    pub fn tiers(&self) -> [(VerbosityLevel, &str); 3] {
        [
            (VerbosityLevel::Minimal, &self.minimal),
            (VerbosityLevel::Standard, &self.standard),
            (VerbosityLevel::Detailed, &self.detailed),
        ]
    }
}

/// Token counts for one rule category at each verbosity tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierTokens {
    pub minimal: u32,
    pub standard: u32,
    pub detailed: u32,
}

impl TierTokens {
    pub fn for_level(&self, level: VerbosityLevel) -> u32 {
        match level {
            VerbosityLevel::Minimal => self.minimal,
            VerbosityLevel::Standard => self.standard,
            VerbosityLevel::Detailed => self.detailed,
        }
    }
}

/// Connection-dependent variant of a rule category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantKey {
    NeedsSetup,
    ProjectPending,
    FullyConfigured,
}

impl VariantKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKey::NeedsSetup => "needs-setup",
            VariantKey::ProjectPending => "project-pending",
            VariantKey::FullyConfigured => "fully-configured",
        }
    }
}

/// Exhaustive variant table for one rule category. Deserialization fails
/// if any variant is missing, so lookups never need a fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantSet {
    #[serde(rename = "needs-setup")]
    pub needs_setup: RuleEntry,
    #[serde(rename = "project-pending")]
    pub project_pending: RuleEntry,
    #[serde(rename = "fully-configured")]
    pub fully_configured: RuleEntry,
}

impl VariantSet {
    pub fn get(&self, key: VariantKey) -> &RuleEntry {
        match key {
            VariantKey::NeedsSetup => &self.needs_setup,
            VariantKey::ProjectPending => &self.project_pending,
            VariantKey::FullyConfigured => &self.fully_configured,
        }
    }
}

/// Phrase lists that set the context flags on a detected intent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextIndicators {
    #[serde(default)]
    pub requires_database: Vec<String>,
    #[serde(default)]
    pub requires_file_changes: Vec<String>,
    #[serde(default)]
    pub requires_design: Vec<String>,
    #[serde(default)]
    pub requires_deployment: Vec<String>,
}

/// Phrase lists that grade a message's task complexity, checked
/// simple first so the mildest matching tier wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComplexityIndicators {
    #[serde(default)]
    pub simple: Vec<String>,
    #[serde(default)]
    pub moderate: Vec<String>,
    #[serde(default)]
    pub complex: Vec<String>,
}

/// Classification and rule-selection data for one intent category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntentProfile {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub exclusive_keywords: Vec<String>,
    pub required_rules: Vec<String>,
    #[serde(default)]
    pub optional_rules: Vec<String>,
    #[serde(default)]
    pub forbidden_rules: Vec<String>,
    #[serde(default)]
    pub context_indicators: ContextIndicators,
    #[serde(default)]
    pub complexity_indicators: ComplexityIndicators,
}

/// Exhaustive intent table. One field per [`IntentCategory`]; a knowledge
/// base missing any intent fails to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntentTable {
    #[serde(rename = "create-project")]
    pub create_project: IntentProfile,
    #[serde(rename = "add-feature")]
    pub add_feature: IntentProfile,
    #[serde(rename = "fix-bug")]
    pub fix_bug: IntentProfile,
    #[serde(rename = "refactor-code")]
    pub refactor_code: IntentProfile,
    #[serde(rename = "database-ops")]
    pub database_ops: IntentProfile,
    #[serde(rename = "design-ui")]
    pub design_ui: IntentProfile,
    #[serde(rename = "explain-code")]
    pub explain_code: IntentProfile,
    #[serde(rename = "deploy-config")]
    pub deploy_config: IntentProfile,
    #[serde(rename = "add-tests")]
    pub add_tests: IntentProfile,
    #[serde(rename = "general-discuss")]
    pub general_discuss: IntentProfile,
}

impl IntentTable {
    pub fn get(&self, category: IntentCategory) -> &IntentProfile {
        match category {
            IntentCategory::CreateProject => &self.create_project,
            IntentCategory::AddFeature => &self.add_feature,
            IntentCategory::FixBug => &self.fix_bug,
            IntentCategory::RefactorCode => &self.refactor_code,
            IntentCategory::DatabaseOps => &self.database_ops,
            IntentCategory::DesignUi => &self.design_ui,
            IntentCategory::ExplainCode => &self.explain_code,
            IntentCategory::DeployConfig => &self.deploy_config,
            IntentCategory::AddTests => &self.add_tests,
            IntentCategory::GeneralDiscuss => &self.general_discuss,
        }
    }
}

/// Verbosity behavior and budgets for one provider family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderProfile {
    pub base_verbosity: VerbosityLevel,
    pub token_budgets: TierTokens,
    /// Context field name -> field value -> verbosity override.
    #[serde(default)]
    pub adjustments: BTreeMap<String, BTreeMap<String, VerbosityLevel>>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub limitations: Vec<String>,
}

/// Exhaustive provider table, one field per [`ProviderCategory`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderTable {
    #[serde(rename = "large-context")]
    pub large_context: ProviderProfile,
    #[serde(rename = "reasoning-internal")]
    pub reasoning_internal: ProviderProfile,
    #[serde(rename = "speed-optimized")]
    pub speed_optimized: ProviderProfile,
    #[serde(rename = "self-hosted")]
    pub self_hosted: ProviderProfile,
    #[serde(rename = "coding-specialized")]
    pub coding_specialized: ProviderProfile,
    #[serde(rename = "general-purpose")]
    pub general_purpose: ProviderProfile,
}

impl ProviderTable {
    pub fn get(&self, category: ProviderCategory) -> &ProviderProfile {
        match category {
            ProviderCategory::LargeContext => &self.large_context,
            ProviderCategory::ReasoningInternal => &self.reasoning_internal,
            ProviderCategory::SpeedOptimized => &self.speed_optimized,
            ProviderCategory::SelfHosted => &self.self_hosted,
            ProviderCategory::CodingSpecialized => &self.coding_specialized,
            ProviderCategory::GeneralPurpose => &self.general_purpose,
        }
    }
}

/// Raw safety pattern as written in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSafetyPattern {
    pub pattern: String,
    #[serde(default)]
    pub flags: String,
    /// When set, a `pattern` match is only a violation if this
    /// expression does NOT also match somewhere in the text.
    #[serde(default)]
    pub requires: Option<String>,
    pub description: String,
    pub severity: Severity,
}

/// Compiled form of [`RawSafetyPattern`], built once at load time.
#[derive(Debug, Clone)]
pub struct SafetyPattern {
    pub matcher: regex::Regex,
    pub requires: Option<regex::Regex>,
    pub description: String,
    pub severity: Severity,
}

/// Top-level shape of the rule knowledge base document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleBaseDocument {
    pub version: String,
    pub rules: BTreeMap<String, RuleEntry>,
    #[serde(default)]
    pub snippets: BTreeMap<String, String>,
    #[serde(default)]
    pub variants: BTreeMap<String, VariantSet>,
    pub intents: IntentTable,
    pub providers: ProviderTable,
    #[serde(default)]
    pub validation_patterns: BTreeMap<String, Vec<RawSafetyPattern>>,
    pub token_estimates: BTreeMap<String, TierTokens>,
}
