// ABOUTME: Core types shared across the Promptsmith engine
// ABOUTME: Closed enumerations and chat-message types used by every other package

pub mod message;
pub mod types;

pub use message::{latest_user_text, ChatMessage, MessageContent, MessageRole, MessageSegment};
pub use types::{
    ChatMode, Complexity, Confidence, ExperienceLevel, IntentCategory, ProviderCategory, Severity,
    TimePressure, VerbosityLevel,
};
