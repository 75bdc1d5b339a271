// ABOUTME: Keyword-driven intent classification over chat conversations
// ABOUTME: Scores every intent category and grades confidence, complexity, and context flags

use tracing::debug;

use promptsmith_core::{
    latest_user_text, ChatMessage, ChatMode, Complexity, Confidence, IntentCategory,
};
use promptsmith_rules::RuleRegistry;

use crate::types::{ClassifyOptions, DetectedIntent, IntentContext};

/// Scoring weights. Phrase matches count double, exclusions count
/// triple against, and session boosts move single points.
// TODO: calibrate the weights against real session transcripts; nothing
// here was measured, and recorded benchmark history depends on them.
const MATCH_WEIGHT: i32 = 2;
const EXCLUSION_WEIGHT: i32 = 3;
const HIGH_CONFIDENCE_SCORE: i32 = 4;
const MEDIUM_CONFIDENCE_SCORE: i32 = 2;
const CLOSE_MARGIN: i32 = 1;

struct ScoredIntent {
    category: IntentCategory,
    score: i32,
    matched: Vec<String>,
}

/// Classifies the latest user message against the knowledge base's
/// intent profiles. Borrows the registry; does not cache anything.
pub struct IntentClassifier<'a> {
    kb: &'a RuleRegistry,
}

impl<'a> IntentClassifier<'a> {
    pub fn new(kb: &'a RuleRegistry) -> Self {
        Self { kb }
    }

    /// Classify a conversation. Only the most recent user turn is scored;
    /// earlier turns exist for context the caller may use elsewhere.
    pub fn classify(&self, messages: &[ChatMessage], options: &ClassifyOptions) -> DetectedIntent {
        let Some(message) = latest_user_text(messages) else {
            return Self::fallback(options);
        };
        let lower = message.to_lowercase();

        let scored: Vec<ScoredIntent> = IntentCategory::ALL
            .iter()
            .map(|&category| self.score_category(category, &lower, options))
            .collect();

        // Strict comparison keeps the earliest category on ties.
        let mut winner = 0usize;
        for (i, s) in scored.iter().enumerate().skip(1) {
            if s.score > scored[winner].score {
                winner = i;
            }
        }
        let mut runner = usize::from(winner == 0);
        for (i, s) in scored.iter().enumerate() {
            if i != winner && i != runner && s.score > scored[runner].score {
                runner = i;
            }
        }

        let top = &scored[winner];
        let second = &scored[runner];

        let mut confidence = if top.score >= HIGH_CONFIDENCE_SCORE {
            Confidence::High
        } else if top.score >= MEDIUM_CONFIDENCE_SCORE {
            Confidence::Medium
        } else {
            Confidence::Low
        };
        if top.score - second.score <= CLOSE_MARGIN {
            confidence = confidence.downgraded();
        }

        let context = self.extract_context(top.category, &lower, options);
        let reasoning = self.explain(top, second, options);

        debug!(
            category = %top.category,
            score = top.score,
            ?confidence,
            "intent classified"
        );

        DetectedIntent {
            category: top.category,
            confidence,
            score: top.score,
            matched_keywords: top.matched.clone(),
            context,
            reasoning,
        }
    }

    fn score_category(
        &self,
        category: IntentCategory,
        lower: &str,
        options: &ClassifyOptions,
    ) -> ScoredIntent {
        let profile = self.kb.intent(category);

        let matched: Vec<String> = profile
            .keywords
            .iter()
            .filter(|k| lower.contains(k.as_str()))
            .cloned()
            .collect();
        let exclusions = profile
            .exclusive_keywords
            .iter()
            .filter(|k| lower.contains(k.as_str()))
            .count();

        let mut score =
            (MATCH_WEIGHT * matched.len() as i32 - EXCLUSION_WEIGHT * exclusions as i32).max(0);

        match options.chat_mode {
            ChatMode::Build if category.is_implementation() => score += 1,
            ChatMode::Discuss if category.is_explanatory() => score += 1,
            _ => {}
        }
        if options.database_connected && category == IntentCategory::DatabaseOps {
            score += 1;
        }
        if options.has_existing_files {
            if category == IntentCategory::AddFeature {
                score += 1;
            }
            if category == IntentCategory::CreateProject {
                score -= 2;
            }
        }

        ScoredIntent {
            category,
            score,
            matched,
        }
    }

    /// Grade task complexity from the winner's indicator phrases,
    /// mildest tier first so "simple" wording wins over scarier words
    /// later in the message.
    fn grade_complexity(&self, category: IntentCategory, lower: &str) -> Complexity {
        let indicators = &self.kb.intent(category).complexity_indicators;
        let tiers = [
            (Complexity::Simple, &indicators.simple),
            (Complexity::Moderate, &indicators.moderate),
            (Complexity::Complex, &indicators.complex),
        ];
        for (level, phrases) in tiers {
            if phrases.iter().any(|p| lower.contains(p.as_str())) {
                return level;
            }
        }
        Complexity::default()
    }

    fn extract_context(
        &self,
        category: IntentCategory,
        lower: &str,
        options: &ClassifyOptions,
    ) -> IntentContext {
        let indicators = &self.kb.intent(category).context_indicators;
        let hit = |phrases: &[String]| phrases.iter().any(|p| lower.contains(p.as_str()));

        IntentContext {
            // Data work always touches the database, whatever the phrasing.
            requires_database: category == IntentCategory::DatabaseOps
                || hit(&indicators.requires_database),
            requires_file_changes: hit(&indicators.requires_file_changes),
            requires_design: hit(&indicators.requires_design),
            requires_deployment: hit(&indicators.requires_deployment),
            is_existing_project: options.has_existing_files,
            complexity: self.grade_complexity(category, lower),
        }
    }

    fn explain(&self, top: &ScoredIntent, second: &ScoredIntent, options: &ClassifyOptions) -> String {
        let mut notes = Vec::new();

        if !top.matched.is_empty() {
            notes.push(format!("matched: {}", top.matched.join(", ")));
        }
        match options.chat_mode {
            ChatMode::Build if top.category.is_implementation() => {
                notes.push("build mode favors implementation work".to_string());
            }
            ChatMode::Discuss if top.category.is_explanatory() => {
                notes.push("discussion mode favors explanatory work".to_string());
            }
            _ => {}
        }
        if options.database_connected && top.category == IntentCategory::DatabaseOps {
            notes.push("a connected database strengthens data work".to_string());
        }
        if options.has_existing_files && top.category == IntentCategory::AddFeature {
            notes.push("existing files favor extending over scaffolding".to_string());
        }

        format!(
            "Detected {} (score {}, runner-up {} at {}). {}",
            top.category,
            top.score,
            second.category,
            second.score,
            if notes.is_empty() {
                "No keyword evidence; score rests on session defaults".to_string()
            } else {
                notes.join(". ")
            }
        )
    }

    /// Nothing to classify: an empty conversation or one with no user
    /// turn. The default leans toward implementation in build mode and
    /// toward discussion otherwise.
    fn fallback(options: &ClassifyOptions) -> DetectedIntent {
        let category = match options.chat_mode {
            ChatMode::Build => IntentCategory::AddFeature,
            ChatMode::Discuss => IntentCategory::GeneralDiscuss,
        };
        DetectedIntent {
            category,
            confidence: Confidence::Low,
            score: 0,
            matched_keywords: Vec::new(),
            context: IntentContext {
                is_existing_project: options.has_existing_files,
                ..IntentContext::default()
            },
            reasoning: format!("No user message to classify; defaulting to {category}"),
        }
    }
}
