// ABOUTME: Content-safety validation of assembled prompt text
// ABOUTME: Applies compiled knowledge-base patterns for the rule categories in play

use tracing::warn;

use promptsmith_core::Severity;
use promptsmith_rules::RuleRegistry;

use crate::types::{ValidationReport, Violation};

/// Checks assembled text against the safety patterns declared for the
/// rule categories it was built from. Substituted placeholder values are
/// part of the text, so injected content is caught here too.
pub struct ContentValidator<'a> {
    kb: &'a RuleRegistry,
}

impl<'a> ContentValidator<'a> {
    pub fn new(kb: &'a RuleRegistry) -> Self {
        Self { kb }
    }

    /// Validate `text` against the patterns of every category in
    /// `categories`. A forbid pattern violates on match; a pattern with a
    /// `requires` expression violates only when the requirement is absent
    /// from the whole text.
    pub fn validate(&self, text: &str, categories: &[&str]) -> ValidationReport {
        let mut violations = Vec::new();

        for category in categories {
            for pattern in self.kb.safety_patterns_for(category) {
                let Some(hit) = pattern.matcher.find(text) else {
                    continue;
                };
                if let Some(requires) = &pattern.requires {
                    if requires.is_match(text) {
                        continue;
                    }
                }
                violations.push(Violation {
                    category: (*category).to_string(),
                    severity: pattern.severity,
                    description: pattern.description.clone(),
                    matched: hit.as_str().to_string(),
                });
            }
        }

        let valid = !violations
            .iter()
            .any(|v| v.severity == Severity::Error);
        if !valid {
            warn!(count = violations.len(), "assembled prompt failed safety validation");
        }

        ValidationReport { valid, violations }
    }
}
