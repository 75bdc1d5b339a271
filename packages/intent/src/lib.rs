// ABOUTME: Intent classification for the Promptsmith engine
// ABOUTME: Scores chat messages against knowledge-base intent profiles

pub mod classifier;
pub mod types;

pub use classifier::IntentClassifier;
pub use types::{ClassifyOptions, DetectedIntent, IntentContext};
