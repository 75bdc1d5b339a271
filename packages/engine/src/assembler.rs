// ABOUTME: Prompt assembly pipeline from chat messages to a rendered system prompt
// ABOUTME: Classifies intent, resolves verbosity, selects rules, degrades for budget, validates

use tracing::{debug, info, warn};

use promptsmith_core::{IntentCategory, ProviderCategory, VerbosityLevel};
use promptsmith_intent::{ClassifyOptions, IntentClassifier};
use promptsmith_rules::{RuleEntry, RuleRegistry, BASELINE_RULES};

use crate::types::{
    AssembleRequest, AssembledPrompt, ConnectionState, OptimizationFlag, PlaceholderValues,
};
use crate::validator::ContentValidator;
use crate::verbosity::{VerbosityMapper, OVER_BUDGET_RATIO};

/// Builds provider-tuned system prompts from a chat conversation and the
/// rule knowledge base. Borrows the registry; carries no state of its own.
pub struct PromptAssembler<'a> {
    kb: &'a RuleRegistry,
}

impl<'a> PromptAssembler<'a> {
    pub fn new(kb: &'a RuleRegistry) -> Self {
        Self { kb }
    }

    /// Assemble one prompt. The pipeline: categorize the provider,
    /// classify intent unless the caller supplied one, resolve verbosity,
    /// select rule categories, degrade once if the estimate blows the
    /// budget, render, then validate.
    pub fn assemble(&self, request: &AssembleRequest) -> AssembledPrompt {
        let provider = ProviderCategory::categorize(&request.model);

        let mut optimizations = Vec::new();
        let intent = match &request.intent {
            Some(supplied) => supplied.clone(),
            None => {
                let classifier = IntentClassifier::new(self.kb);
                let detected = classifier.classify(
                    &request.messages,
                    &ClassifyOptions {
                        chat_mode: request.chat_mode,
                        has_existing_files: request.session.is_existing_project.unwrap_or(false),
                        database_connected: request.connection.service_connected,
                    },
                );
                optimizations.push(OptimizationFlag::IntentClassified {
                    category: detected.category,
                    confidence: detected.confidence,
                });
                detected
            }
        };

        // Session fields the caller left unset are filled from the
        // classification, so a bug report reads as debugging work and the
        // message's own complexity drives the adjustment cascade.
        let mut session = request.session;
        if session.task_complexity.is_none() {
            session.task_complexity = Some(intent.context.complexity);
        }
        if session.is_debugging.is_none() {
            session.is_debugging = Some(intent.category == IntentCategory::FixBug);
        }

        let mapper = VerbosityMapper::new(self.kb);
        let mut verbosity = match request.verbosity_override {
            Some(level) => {
                optimizations.push(OptimizationFlag::VerbosityForced { level });
                level
            }
            None => {
                let resolution = mapper.resolve(provider, &session);
                optimizations.push(OptimizationFlag::VerbosityResolved {
                    level: resolution.verbosity,
                });
                resolution.verbosity
            }
        };

        let categories = self.select_categories(intent.category);

        let mut estimated = self.estimate_total(&categories, verbosity);
        let mut budget = mapper.token_budget(provider, verbosity);

        // One degrade step; a prompt still over budget after that is
        // reported rather than stripped further.
        if estimated as f64 > budget as f64 * OVER_BUDGET_RATIO {
            if let Some(lower) = verbosity.lower() {
                info!(
                    %provider,
                    from = %verbosity,
                    to = %lower,
                    estimated,
                    budget,
                    "degrading verbosity to fit budget"
                );
                optimizations.push(OptimizationFlag::Degraded {
                    from: verbosity,
                    to: lower,
                });
                verbosity = lower;
                estimated = self.estimate_total(&categories, verbosity);
                budget = mapper.token_budget(provider, verbosity);
            }
        }
        if estimated as f64 > budget as f64 * OVER_BUDGET_RATIO {
            warn!(estimated, budget, "prompt remains over budget after degrade");
            optimizations.push(OptimizationFlag::OverBudget {
                estimated_tokens: estimated,
                budget,
            });
        }

        let text = self.render(
            &categories,
            verbosity,
            &request.connection,
            &request.placeholders,
            &mut optimizations,
        );

        let validator = ContentValidator::new(self.kb);
        let category_refs: Vec<&str> = categories.iter().map(String::as_str).collect();
        let validation = validator.validate(&text, &category_refs);

        debug!(
            %provider,
            intent = %intent.category,
            %verbosity,
            estimated,
            rules = categories.len(),
            "prompt assembled"
        );

        AssembledPrompt {
            text,
            provider,
            intent,
            verbosity,
            estimated_tokens: estimated,
            token_budget: budget,
            included_rules: categories,
            validation,
            optimizations,
            kb_version: self.kb.version().to_string(),
        }
    }

    /// Baseline categories, then the intent's required and optional rules
    /// in declaration order, with forbidden rules stripped and duplicates
    /// dropped. Baseline is immune to the deny-list.
    fn select_categories(&self, category: IntentCategory) -> Vec<String> {
        let profile = self.kb.intent(category);
        let mut selected: Vec<String> =
            BASELINE_RULES.iter().map(|s| (*s).to_string()).collect();

        for list in [&profile.required_rules, &profile.optional_rules] {
            for rule in list {
                if profile.forbidden_rules.contains(rule) || selected.contains(rule) {
                    continue;
                }
                selected.push(rule.clone());
            }
        }
        selected
    }

    fn estimate_total(&self, categories: &[String], verbosity: VerbosityLevel) -> u32 {
        categories
            .iter()
            .map(|c| self.kb.estimate(c, verbosity))
            .sum()
    }

    /// Render the selected categories at one verbosity tier: variant text
    /// where the category has variants, snippet expansion, then
    /// placeholder substitution. Sections join with blank lines.
    fn render(
        &self,
        categories: &[String],
        verbosity: VerbosityLevel,
        connection: &ConnectionState,
        placeholders: &PlaceholderValues,
        optimizations: &mut Vec<OptimizationFlag>,
    ) -> String {
        let mut sections = Vec::with_capacity(categories.len());

        for category in categories {
            let entry: &RuleEntry = match self.kb.variant_set(category) {
                Some(set) => {
                    let variant = connection.variant();
                    optimizations.push(OptimizationFlag::VariantInjected {
                        category: category.clone(),
                        variant,
                    });
                    set.get(variant)
                }
                None => match self.kb.rule(category) {
                    Some(entry) => entry,
                    None => continue,
                },
            };

            let mut text = self.kb.expand_snippets(entry.text_for(verbosity));
            for (token, value) in placeholders.resolved() {
                let needle = format!("{{{token}}}");
                if text.contains(&needle) {
                    text = text.replace(&needle, value);
                }
            }
            sections.push(text);
        }

        sections.join("\n\n")
    }
}
