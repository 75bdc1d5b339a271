// ABOUTME: Versioned rule knowledge base for prompt assembly
// ABOUTME: Loads tiered rule text, intent and provider profiles, and safety patterns from JSON

pub mod registry;
pub mod types;

pub use registry::{Result, RuleBaseError, RuleRegistry};
pub use types::{
    ComplexityIndicators, ContextIndicators, IntentProfile, IntentTable, ProviderProfile,
    ProviderTable, RawSafetyPattern, RuleEntry, SafetyPattern, TierTokens, VariantKey, VariantSet,
    BASELINE_RULES, CONTEXT_FIELDS, DECLARED_PLACEHOLDERS,
};
