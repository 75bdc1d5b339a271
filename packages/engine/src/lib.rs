// ABOUTME: Prompt-assembly engine for Promptsmith
// ABOUTME: Verbosity mapping, content-safety validation, and the assembly pipeline

pub mod assembler;
pub mod types;
pub mod validator;
pub mod verbosity;

pub use assembler::PromptAssembler;
pub use types::{
    AssembleRequest, AssembledPrompt, BudgetAssessment, BudgetStatus, ConnectionState,
    OptimizationFlag, PlaceholderValues, SessionContext, ValidationReport, VerbosityResolution,
    Violation, DEFAULT_ALLOWED_ELEMENTS, DEFAULT_DESIGN_SCHEME, DEFAULT_WORKING_DIR,
};
pub use validator::ContentValidator;
pub use verbosity::{VerbosityMapper, OVER_BUDGET_RATIO, UNDER_BUDGET_RATIO};
