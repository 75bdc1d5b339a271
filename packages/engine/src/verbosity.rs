// ABOUTME: Maps provider profiles and session context onto a verbosity tier
// ABOUTME: Applies the adjustment cascade in canonical field order and grades budget fit

use tracing::debug;

use promptsmith_core::{ProviderCategory, VerbosityLevel};
use promptsmith_rules::RuleRegistry;

use crate::types::{BudgetAssessment, BudgetStatus, SessionContext, VerbosityResolution};

/// A prompt larger than this multiple of the budget is over budget.
pub const OVER_BUDGET_RATIO: f64 = 1.5;
/// A prompt smaller than this fraction of the budget is leaving room unused.
pub const UNDER_BUDGET_RATIO: f64 = 0.3;

/// Resolves verbosity from the knowledge base's provider profiles.
pub struct VerbosityMapper<'a> {
    kb: &'a RuleRegistry,
}

impl<'a> VerbosityMapper<'a> {
    pub fn new(kb: &'a RuleRegistry) -> Self {
        Self { kb }
    }

    /// Start from the provider's base verbosity and walk the session
    /// fields in canonical order. Each matching adjustment overwrites the
    /// current tier, so the last matching field wins outright.
    pub fn resolve(
        &self,
        provider: ProviderCategory,
        context: &SessionContext,
    ) -> VerbosityResolution {
        let profile = self.kb.provider(provider);
        let base = profile.base_verbosity;
        let mut verbosity = base;
        let mut adjustments = Vec::new();

        for (field, value) in context.fields() {
            let Some(value) = value else { continue };
            let Some(level) = profile
                .adjustments
                .get(field)
                .and_then(|values| values.get(&value))
            else {
                continue;
            };
            verbosity = *level;
            adjustments.push(format!("{field}: {value} -> {level}"));
        }

        let reasoning = if adjustments.is_empty() {
            format!("{provider} providers default to {base} instructions")
        } else {
            format!(
                "Base {base} for {provider}, adjusted by {}",
                adjustments.join(", ")
            )
        };

        debug!(%provider, %verbosity, "verbosity resolved");

        VerbosityResolution {
            verbosity,
            provider,
            base,
            adjustments,
            reasoning,
        }
    }

    /// Token budget for a provider at a verbosity tier.
    pub fn token_budget(&self, provider: ProviderCategory, verbosity: VerbosityLevel) -> u32 {
        self.kb.provider(provider).token_budgets.for_level(verbosity)
    }

    /// Grade an estimated prompt size against the provider's budget.
    /// Over recommends the next tier down, under the next tier up.
    /// Detailed prompts are never flagged as under budget; there is no
    /// higher tier to recommend. Advisory only; enforcement lives in
    /// the assembler.
    pub fn assess_budget(
        &self,
        provider: ProviderCategory,
        verbosity: VerbosityLevel,
        estimated_tokens: u32,
    ) -> BudgetAssessment {
        let budget = self.token_budget(provider, verbosity);
        let estimate = estimated_tokens as f64;
        let limit = budget as f64;

        let (status, recommended, note) = if estimate > limit * OVER_BUDGET_RATIO {
            (
                BudgetStatus::OverBudget,
                verbosity.lower(),
                Some(format!(
                    "Estimated {estimated_tokens} tokens exceeds the {budget}-token budget; lower the verbosity or drop optional guidance"
                )),
            )
        } else if verbosity < VerbosityLevel::Detailed && estimate < limit * UNDER_BUDGET_RATIO {
            let next = verbosity.higher();
            (
                BudgetStatus::UnderBudget,
                next,
                next.map(|n| {
                    format!(
                        "Estimated {estimated_tokens} tokens uses little of the {budget}-token budget; {n} instructions would fit"
                    )
                }),
            )
        } else {
            (BudgetStatus::WithinBudget, None, None)
        };

        BudgetAssessment {
            status,
            estimated_tokens,
            budget,
            recommended,
            note,
        }
    }
}
