// ABOUTME: Classification inputs and the detected-intent report
// ABOUTME: Typed context flags extracted alongside the winning category

use serde::{Deserialize, Serialize};

use promptsmith_core::{ChatMode, Complexity, Confidence, IntentCategory};

/// Session facts that bias classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyOptions {
    pub chat_mode: ChatMode,
    /// Whether the project already has files on disk.
    pub has_existing_files: bool,
    /// Whether a backend database connection is configured.
    pub database_connected: bool,
}

/// What the detected intent implies about the work ahead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentContext {
    pub requires_database: bool,
    pub requires_file_changes: bool,
    pub requires_design: bool,
    pub requires_deployment: bool,
    /// Mirrors the caller's session flag so the report is self-contained.
    pub is_existing_project: bool,
    pub complexity: Complexity,
}

/// Classification result for one user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedIntent {
    pub category: IntentCategory,
    pub confidence: Confidence,
    /// Winning score after keyword matches, exclusions, and boosts.
    pub score: i32,
    pub matched_keywords: Vec<String>,
    pub context: IntentContext,
    pub reasoning: String,
}
