// ABOUTME: Rule registry for loading and validating the rule knowledge base
// ABOUTME: Loads rule definitions from config/rulebase.json and compiles safety patterns

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::RegexBuilder;
use thiserror::Error;
use tracing::info;

use promptsmith_core::{IntentCategory, ProviderCategory, VerbosityLevel};

use crate::types::{
    IntentProfile, IntentTable, ProviderProfile, ProviderTable, RawSafetyPattern,
    RuleBaseDocument, RuleEntry, SafetyPattern, TierTokens, VariantSet, BASELINE_RULES,
    CONTEXT_FIELDS, DECLARED_PLACEHOLDERS,
};

#[derive(Error, Debug)]
pub enum RuleBaseError {
    #[error("failed to read rule base from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rule base: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("baseline rule category '{category}' is missing from the rule table")]
    MissingBaseline { category: String },
    #[error("rule category '{category}' has no token estimates")]
    MissingEstimate { category: String },
    #[error("token estimates target unknown rule category '{category}'")]
    UnknownEstimateTarget { category: String },
    #[error("intent '{intent}' references unknown rule category '{category}'")]
    UnknownRule { intent: String, category: String },
    #[error("variant table targets unknown rule category '{category}'")]
    UnknownVariantTarget { category: String },
    #[error("safety patterns target unknown rule category '{category}'")]
    UnknownPatternTarget { category: String },
    #[error("rule '{rule}' references unknown snippet '{snippet}'")]
    UnknownSnippet { rule: String, snippet: String },
    #[error("rule '{rule}' uses undeclared placeholder '{placeholder}'")]
    UnknownPlaceholder { rule: String, placeholder: String },
    #[error("snippet '{snippet}' must be literal text without tokens")]
    InvalidSnippet { snippet: String },
    #[error("provider '{provider}' adjusts unknown context field '{field}'")]
    UnknownAdjustmentField { provider: String, field: String },
    #[error("provider '{provider}' adjustment '{field}' has unknown value '{value}'")]
    UnknownAdjustmentValue {
        provider: String,
        field: String,
        value: String,
    },
    #[error("invalid safety pattern for '{category}': {message}")]
    InvalidPattern { category: String, message: String },
}

pub type Result<T> = std::result::Result<T, RuleBaseError>;

/// Where a registry's document came from, so it can be reloaded.
#[derive(Debug, Clone)]
enum RuleSource {
    Embedded,
    File(PathBuf),
}

/// Validated, immutable view of one rule knowledge base version.
///
/// All cross-references (rule names, snippets, placeholders, adjustment
/// fields) are checked at construction, so lookups after that point do
/// not need failure paths.
#[derive(Debug)]
pub struct RuleRegistry {
    source: RuleSource,
    version: String,
    rules: BTreeMap<String, RuleEntry>,
    snippets: BTreeMap<String, String>,
    variants: BTreeMap<String, VariantSet>,
    intents: IntentTable,
    providers: ProviderTable,
    safety_patterns: BTreeMap<String, Vec<SafetyPattern>>,
    token_estimates: BTreeMap<String, TierTokens>,
}

impl RuleRegistry {
    /// Create a registry from the rule base compiled into the binary.
    pub fn embedded() -> Result<Self> {
        let json = include_str!("../config/rulebase.json");
        Self::parse(json, RuleSource::Embedded)
    }

    /// Create a registry from a rule base JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let json = std::fs::read_to_string(&path).map_err(|source| RuleBaseError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&json, RuleSource::File(path))
    }

    /// Re-read the registry from its original source. On failure the
    /// current contents are left untouched.
    pub fn reload(&mut self) -> Result<()> {
        let next = match &self.source {
            RuleSource::Embedded => Self::embedded()?,
            RuleSource::File(path) => Self::from_path(path.clone())?,
        };
        *self = next;
        Ok(())
    }

    fn parse(json: &str, source: RuleSource) -> Result<Self> {
        let doc: RuleBaseDocument = serde_json::from_str(json)?;
        let safety_patterns = Self::validate(&doc)?;

        info!(
            version = %doc.version,
            rules = doc.rules.len(),
            snippets = doc.snippets.len(),
            "rule base loaded"
        );

        Ok(Self {
            source,
            version: doc.version,
            rules: doc.rules,
            snippets: doc.snippets,
            variants: doc.variants,
            intents: doc.intents,
            providers: doc.providers,
            safety_patterns,
            token_estimates: doc.token_estimates,
        })
    }

    /// Cross-reference checks that make later lookups infallible, plus
    /// compilation of the safety patterns.
    fn validate(doc: &RuleBaseDocument) -> Result<BTreeMap<String, Vec<SafetyPattern>>> {
        for category in BASELINE_RULES {
            if !doc.rules.contains_key(*category) {
                return Err(RuleBaseError::MissingBaseline {
                    category: (*category).to_string(),
                });
            }
        }

        for category in doc.rules.keys() {
            if !doc.token_estimates.contains_key(category) {
                return Err(RuleBaseError::MissingEstimate {
                    category: category.clone(),
                });
            }
        }

        for category in doc.token_estimates.keys() {
            if !doc.rules.contains_key(category) {
                return Err(RuleBaseError::UnknownEstimateTarget {
                    category: category.clone(),
                });
            }
        }

        for intent in IntentCategory::ALL {
            let profile = doc.intents.get(intent);
            let lists = [
                &profile.required_rules,
                &profile.optional_rules,
                &profile.forbidden_rules,
            ];
            for list in lists {
                for category in list {
                    if !doc.rules.contains_key(category) {
                        return Err(RuleBaseError::UnknownRule {
                            intent: intent.as_str().to_string(),
                            category: category.clone(),
                        });
                    }
                }
            }
        }

        for category in doc.variants.keys() {
            if !doc.rules.contains_key(category) {
                return Err(RuleBaseError::UnknownVariantTarget {
                    category: category.clone(),
                });
            }
        }

        for (snippet, body) in &doc.snippets {
            if !scan_tokens(body).is_empty() {
                return Err(RuleBaseError::InvalidSnippet {
                    snippet: snippet.clone(),
                });
            }
        }

        for (category, entry) in &doc.rules {
            Self::check_tokens(category, entry, doc)?;
        }
        for (category, set) in &doc.variants {
            for key in ["needs-setup", "project-pending", "fully-configured"] {
                let entry = match key {
                    "needs-setup" => &set.needs_setup,
                    "project-pending" => &set.project_pending,
                    _ => &set.fully_configured,
                };
                let label = format!("{category}[{key}]");
                Self::check_tokens(&label, entry, doc)?;
            }
        }

        for provider in ProviderCategory::ALL {
            let profile = doc.providers.get(provider);
            for (field, values) in &profile.adjustments {
                if !CONTEXT_FIELDS.contains(&field.as_str()) {
                    return Err(RuleBaseError::UnknownAdjustmentField {
                        provider: provider.as_str().to_string(),
                        field: field.clone(),
                    });
                }
                for value in values.keys() {
                    if !adjustment_value_allowed(field, value) {
                        return Err(RuleBaseError::UnknownAdjustmentValue {
                            provider: provider.as_str().to_string(),
                            field: field.clone(),
                            value: value.clone(),
                        });
                    }
                }
            }
        }

        let mut compiled = BTreeMap::new();
        for (category, patterns) in &doc.validation_patterns {
            if !doc.rules.contains_key(category) {
                return Err(RuleBaseError::UnknownPatternTarget {
                    category: category.clone(),
                });
            }
            let mut group = Vec::with_capacity(patterns.len());
            for raw in patterns {
                group.push(compile_pattern(category, raw)?);
            }
            compiled.insert(category.clone(), group);
        }

        Ok(compiled)
    }

    fn check_tokens(rule: &str, entry: &RuleEntry, doc: &RuleBaseDocument) -> Result<()> {
        for (_, text) in entry.tiers() {
            for token in scan_tokens(text) {
                if let Some(snippet) = token.strip_prefix("snippet:") {
                    if !doc.snippets.contains_key(snippet) {
                        return Err(RuleBaseError::UnknownSnippet {
                            rule: rule.to_string(),
                            snippet: snippet.to_string(),
                        });
                    }
                } else if !DECLARED_PLACEHOLDERS.contains(&token) {
                    return Err(RuleBaseError::UnknownPlaceholder {
                        rule: rule.to_string(),
                        placeholder: token.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Knowledge base version string, e.g. "1.4.0".
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up one rule category's tiered text.
    pub fn rule(&self, category: &str) -> Option<&RuleEntry> {
        self.rules.get(category)
    }

    /// Whether a rule category exists.
    pub fn has_rule(&self, category: &str) -> bool {
        self.rules.contains_key(category)
    }

    /// Every rule category: baseline first, the rest in sorted order.
    pub fn canonical_categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = BASELINE_RULES.to_vec();
        out.extend(
            self.rules
                .keys()
                .map(String::as_str)
                .filter(|c| !BASELINE_RULES.contains(c)),
        );
        out
    }

    /// Connection-dependent variants for a rule category, when defined.
    pub fn variant_set(&self, category: &str) -> Option<&VariantSet> {
        self.variants.get(category)
    }

    /// Classification profile for an intent category.
    pub fn intent(&self, category: IntentCategory) -> &IntentProfile {
        self.intents.get(category)
    }

    /// Verbosity profile for a provider category.
    pub fn provider(&self, category: ProviderCategory) -> &ProviderProfile {
        self.providers.get(category)
    }

    /// Compiled safety patterns for a rule category; empty if none declared.
    pub fn safety_patterns_for(&self, category: &str) -> &[SafetyPattern] {
        self.safety_patterns
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Estimated token cost of one rule category at a verbosity tier.
    /// Validation guarantees an estimate exists for every rule category.
    pub fn estimate(&self, category: &str, level: VerbosityLevel) -> u32 {
        self.token_estimates
            .get(category)
            .map(|t| t.for_level(level))
            .unwrap_or(0)
    }

    /// Replace `{snippet:name}` references with their snippet text.
    pub fn expand_snippets(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (name, body) in &self.snippets {
            let token = format!("{{snippet:{name}}}");
            if out.contains(&token) {
                out = out.replace(&token, body);
            }
        }
        out
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::embedded().expect("Failed to load embedded rule base")
    }
}

/// Extract `{token}` spans whose bodies look like placeholder or snippet
/// names. Other braced text is treated as literal content.
fn scan_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        rest = &rest[open + 1..];
        let Some(close) = rest.find('}') else {
            break;
        };
        let inner = &rest[..close];
        if !inner.is_empty()
            && inner
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_-:".contains(c))
        {
            tokens.push(inner);
        }
        rest = &rest[close + 1..];
    }
    tokens
}

fn adjustment_value_allowed(field: &str, value: &str) -> bool {
    match field {
        "task_complexity" => matches!(value, "simple" | "moderate" | "complex"),
        "user_experience" => matches!(value, "beginner" | "intermediate" | "expert"),
        "time_pressure" => matches!(value, "relaxed" | "normal" | "urgent"),
        "is_existing_project" | "is_debugging" => matches!(value, "true" | "false"),
        _ => false,
    }
}

fn compile_pattern(category: &str, raw: &RawSafetyPattern) -> Result<SafetyPattern> {
    if raw.flags.chars().any(|c| c != 'i' && c != 'm') {
        return Err(RuleBaseError::InvalidPattern {
            category: category.to_string(),
            message: format!("unsupported flags '{}'", raw.flags),
        });
    }

    let build = |expr: &str| {
        RegexBuilder::new(expr)
            .case_insensitive(raw.flags.contains('i'))
            .multi_line(raw.flags.contains('m'))
            .build()
            .map_err(|e| RuleBaseError::InvalidPattern {
                category: category.to_string(),
                message: e.to_string(),
            })
    };

    let matcher = build(&raw.pattern)?;
    let requires = match &raw.requires {
        Some(expr) => Some(build(expr)?),
        None => None,
    };

    Ok(SafetyPattern {
        matcher,
        requires,
        description: raw.description.clone(),
        severity: raw.severity,
    })
}
