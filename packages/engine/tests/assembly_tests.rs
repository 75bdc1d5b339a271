// ABOUTME: End-to-end assembly tests over the embedded rule base
// ABOUTME: Covers provider tuning, budget degradation, variants, and validation wiring

use pretty_assertions::assert_eq;

use promptsmith_core::{
    ChatMessage, ChatMode, Complexity, Confidence, IntentCategory, ProviderCategory,
    VerbosityLevel,
};
use promptsmith_engine::{
    AssembleRequest, ConnectionState, OptimizationFlag, PlaceholderValues, PromptAssembler,
    SessionContext, OVER_BUDGET_RATIO,
};
use promptsmith_intent::{DetectedIntent, IntentContext};
use promptsmith_rules::{RuleRegistry, VariantKey};

fn request(message: &str, model: &str) -> AssembleRequest {
    AssembleRequest::new(vec![ChatMessage::user(message)], model)
}

// ============================================================================
// Provider-Tuned Assembly
// ============================================================================

#[test]
fn test_simple_project_on_general_model() {
    let kb = RuleRegistry::embedded().unwrap();
    let assembler = PromptAssembler::new(&kb);
    let prompt = assembler.assemble(&request(
        "I want to create a simple landing page for my bakery with a hero section and contact form",
        "gpt-4.1",
    ));

    assert_eq!(prompt.provider, ProviderCategory::GeneralPurpose);
    assert_eq!(prompt.intent.category, IntentCategory::CreateProject);
    // Simple task complexity pulls a standard-verbosity provider down.
    assert_eq!(prompt.verbosity, VerbosityLevel::Minimal);
    assert_eq!(prompt.estimated_tokens, 300);
    assert_eq!(
        &prompt.included_rules[..3],
        &["system-identity", "system-constraints", "output-format"]
    );
    assert!(prompt.included_rules.contains(&"project-scaffold".to_string()));
    assert!(prompt.text.contains("Scaffold the smallest runnable version"));
    assert!(prompt.validation.valid);
    assert_eq!(prompt.kb_version, "1.4.0");
    assert!(prompt.optimizations.contains(&OptimizationFlag::IntentClassified {
        category: IntentCategory::CreateProject,
        confidence: Confidence::High,
    }));
    assert!(prompt.optimizations.contains(&OptimizationFlag::VerbosityResolved {
        level: VerbosityLevel::Minimal,
    }));

    println!("✓ Simple project assembled at {} tokens", prompt.estimated_tokens);
}

#[test]
fn test_bug_report_forces_minimal_on_large_context() {
    let kb = RuleRegistry::embedded().unwrap();
    let assembler = PromptAssembler::new(&kb);
    let prompt = assembler.assemble(&request("Fix the broken navbar error", "gemini-1.5-pro"));

    assert_eq!(prompt.provider, ProviderCategory::LargeContext);
    assert_eq!(prompt.intent.category, IntentCategory::FixBug);
    // Debugging is derived from the intent and overrides the detailed base.
    assert_eq!(prompt.verbosity, VerbosityLevel::Minimal);
    assert!(prompt.included_rules.contains(&"debugging-protocol".to_string()));
    assert!(prompt.text.contains("Reproduce first"));

    println!("✓ Bug report pinned to minimal instructions");
}

#[test]
fn test_placeholders_render_with_caller_values() {
    let kb = RuleRegistry::embedded().unwrap();
    let assembler = PromptAssembler::new(&kb);
    let mut req = request("Explain how this works?", "claude-sonnet-4");
    req.placeholders = PlaceholderValues {
        working_dir: Some("/home/dev/bakery".to_string()),
        allowed_elements: Some("paragraphs, lists, and code blocks".to_string()),
        design_scheme: None,
    };
    let prompt = assembler.assemble(&req);

    assert!(prompt.text.contains("/home/dev/bakery"));
    assert!(prompt.text.contains("paragraphs, lists, and code blocks"));
    assert!(!prompt.text.contains('{'), "no unexpanded tokens may survive");

    println!("✓ Placeholder values rendered into the prompt");
}

#[test]
fn test_supplied_intent_skips_classification() {
    let kb = RuleRegistry::embedded().unwrap();
    let assembler = PromptAssembler::new(&kb);
    // The message reads as a bug report, but the caller already classified
    // this turn as design work and hands that result in.
    let mut req = request("Fix the broken navbar error", "claude-sonnet-4");
    req.intent = Some(DetectedIntent {
        category: IntentCategory::DesignUi,
        confidence: Confidence::High,
        score: 6,
        matched_keywords: vec!["design".to_string()],
        context: IntentContext {
            requires_design: true,
            complexity: Complexity::Simple,
            ..IntentContext::default()
        },
        reasoning: "carried over from the previous turn".to_string(),
    });
    let prompt = assembler.assemble(&req);

    assert_eq!(prompt.intent.category, IntentCategory::DesignUi);
    assert!(prompt.included_rules.contains(&"design-system".to_string()));
    assert!(!prompt.included_rules.contains(&"debugging-protocol".to_string()));
    assert!(
        !prompt
            .optimizations
            .iter()
            .any(|f| matches!(f, OptimizationFlag::IntentClassified { .. })),
        "no classification flag when the intent came in with the request"
    );

    println!("✓ Supplied intent carried through without reclassification");
}

// ============================================================================
// Budget Degradation
// ============================================================================

#[test]
fn test_tight_budget_degrades_one_step() {
    let kb = RuleRegistry::embedded().unwrap();
    let assembler = PromptAssembler::new(&kb);
    // A complex new build resolves to detailed on self-hosted models, and
    // the full create-project selection does not fit a 750-token budget.
    let prompt = assembler.assemble(&request(
        "Create a marketplace platform with payments",
        "ollama/llama3.1",
    ));

    assert_eq!(prompt.provider, ProviderCategory::SelfHosted);
    assert_eq!(prompt.verbosity, VerbosityLevel::Standard);
    assert_eq!(prompt.estimated_tokens, 690);
    assert!(prompt.optimizations.contains(&OptimizationFlag::Degraded {
        from: VerbosityLevel::Detailed,
        to: VerbosityLevel::Standard,
    }));
    assert!(
        !prompt
            .optimizations
            .iter()
            .any(|f| matches!(f, OptimizationFlag::OverBudget { .. })),
        "one degrade step must be enough here"
    );

    println!("✓ Budget degrade landed at {} tokens", prompt.estimated_tokens);
}

#[test]
fn test_forced_verbosity_still_respects_budget() {
    let kb = RuleRegistry::embedded().unwrap();
    let assembler = PromptAssembler::new(&kb);
    let mut req = request("Create a marketplace platform with payments", "mistral-7b");
    req.verbosity_override = Some(VerbosityLevel::Detailed);
    let prompt = assembler.assemble(&req);

    assert!(prompt.optimizations.contains(&OptimizationFlag::VerbosityForced {
        level: VerbosityLevel::Detailed,
    }));
    assert!(
        !prompt
            .optimizations
            .iter()
            .any(|f| matches!(f, OptimizationFlag::VerbosityResolved { .. })),
        "forcing skips resolution"
    );
    assert_eq!(
        prompt.verbosity,
        VerbosityLevel::Standard,
        "degrade applies to forced tiers too"
    );

    println!("✓ Forced verbosity degraded for budget");
}

#[test]
fn test_every_intent_provider_pairing_lands_in_budget() {
    let kb = RuleRegistry::embedded().unwrap();
    let assembler = PromptAssembler::new(&kb);
    let messages = [
        (
            "I want to create a simple landing page for my bakery with a hero section and contact form",
            IntentCategory::CreateProject,
        ),
        ("Add user profile editing with avatar upload", IntentCategory::AddFeature),
        (
            "The login form is showing an undefined error when users enter invalid credentials",
            IntentCategory::FixBug,
        ),
        ("refactor the payment module into smaller functions", IntentCategory::RefactorCode),
        ("create a table for customer orders", IntentCategory::DatabaseOps),
        ("redesign the landing page layout with better spacing", IntentCategory::DesignUi),
        ("Can you explain how this works?", IntentCategory::ExplainCode),
        ("deploy this to production when the build passes", IntentCategory::DeployConfig),
        ("write unit tests for the checkout flow", IntentCategory::AddTests),
        ("what do you think about this approach?", IntentCategory::GeneralDiscuss),
    ];
    let models = [
        "gemini-1.5-pro",
        "o1-preview",
        "claude-haiku",
        "qwen2.5-coder",
        "ollama/llama3.1",
        "gpt-4.1",
    ];

    for (message, expected) in messages {
        for model in models {
            let prompt = assembler.assemble(&request(message, model));
            assert_eq!(prompt.intent.category, expected, "{message:?} on {model}");

            let degrades = prompt
                .optimizations
                .iter()
                .filter(|f| matches!(f, OptimizationFlag::Degraded { .. }))
                .count();
            assert!(degrades <= 1, "at most one degrade step for {message:?} on {model}");

            let within = f64::from(prompt.estimated_tokens)
                <= f64::from(prompt.token_budget) * OVER_BUDGET_RATIO;
            let reported = prompt
                .optimizations
                .iter()
                .any(|f| matches!(f, OptimizationFlag::OverBudget { .. }));
            assert!(
                within || reported,
                "{} tokens against a {} budget went unreported for {message:?} on {model}",
                prompt.estimated_tokens,
                prompt.token_budget
            );
        }
    }

    println!("✓ Every intent and provider pairing fit its budget");
}

// ============================================================================
// Connection Variants
// ============================================================================

#[test]
fn test_backend_variant_tracks_connection_state() {
    let kb = RuleRegistry::embedded().unwrap();
    let assembler = PromptAssembler::new(&kb);
    let message = "Add user registration and login using the connected backend";

    let mut disconnected = request(message, "claude-sonnet-4");
    disconnected.session.is_existing_project = Some(true);
    let prompt = assembler.assemble(&disconnected);
    assert_eq!(prompt.intent.category, IntentCategory::DatabaseOps);
    assert!(prompt.text.contains("No backend is connected yet"));
    assert!(prompt.optimizations.contains(&OptimizationFlag::VariantInjected {
        category: "backend-integration".to_string(),
        variant: VariantKey::NeedsSetup,
    }));

    let mut live = request(message, "claude-sonnet-4");
    live.session.is_existing_project = Some(true);
    live.connection = ConnectionState {
        service_connected: true,
        project_selected: true,
        credentials_present: true,
    };
    let prompt = assembler.assemble(&live);
    assert!(prompt.text.contains("The backend connection is live"));
    assert!(prompt.validation.valid, "knowledge-base text must pass its own patterns");
    assert_eq!(
        prompt.included_rules,
        vec![
            "system-identity",
            "system-constraints",
            "output-format",
            "database-safety",
            "backend-integration",
            "feature-workflow"
        ]
    );

    println!("✓ Connection state selects the backend variant");
}

#[test]
fn test_missing_credentials_read_as_pending() {
    let connection = ConnectionState {
        service_connected: true,
        project_selected: true,
        credentials_present: false,
    };
    assert_eq!(connection.variant(), VariantKey::ProjectPending);
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_empty_conversation_still_assembles() {
    let kb = RuleRegistry::embedded().unwrap();
    let assembler = PromptAssembler::new(&kb);

    // Build sessions default to feature work when there is nothing to read.
    let prompt = assembler.assemble(&AssembleRequest::new(Vec::new(), "claude-sonnet-4"));
    assert_eq!(prompt.intent.category, IntentCategory::AddFeature);
    assert!(prompt.included_rules.contains(&"feature-workflow".to_string()));
    assert!(!prompt.text.is_empty());
    assert!(prompt.validation.valid);

    // Discussion sessions default to conversation rules instead.
    let mut req = AssembleRequest::new(Vec::new(), "claude-sonnet-4");
    req.chat_mode = ChatMode::Discuss;
    let prompt = assembler.assemble(&req);
    assert_eq!(prompt.intent.category, IntentCategory::GeneralDiscuss);
    assert!(prompt.included_rules.contains(&"discussion-mode".to_string()));
    assert!(prompt.validation.valid);

    println!("✓ Empty conversation produced a usable prompt");
}

#[test]
fn test_request_deserializes_with_defaults() {
    let kb = RuleRegistry::embedded().unwrap();
    let assembler = PromptAssembler::new(&kb);
    let json = r#"{
        "messages": [{"role": "user", "content": "Add a dark mode toggle"}],
        "model": "claude-haiku"
    }"#;
    let req: AssembleRequest = serde_json::from_str(json).unwrap();
    let prompt = assembler.assemble(&req);

    assert_eq!(prompt.provider, ProviderCategory::SpeedOptimized);
    assert!(!prompt.text.is_empty());

    println!("✓ Request defaults cover optional fields");
}

#[test]
fn test_caller_session_values_take_precedence() {
    let kb = RuleRegistry::embedded().unwrap();
    let assembler = PromptAssembler::new(&kb);
    let mut req = request("Fix the broken navbar error", "gemini-1.5-pro");
    // The caller insists this is not a debugging session.
    req.session = SessionContext {
        is_debugging: Some(false),
        ..SessionContext::default()
    };
    let prompt = assembler.assemble(&req);

    assert_eq!(
        prompt.verbosity,
        VerbosityLevel::Detailed,
        "explicit session facts beat derived ones"
    );

    println!("✓ Caller-set session fields win over derived values");
}
