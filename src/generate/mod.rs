pub mod backend;
pub mod context;
pub mod parse;
pub mod prompts;

pub use backend::{
    GenerationOutcome, GenerationRequest, MockGenerator, OllamaGenerator, ScenarioGenerator,
};
pub use context::{ContextLimits, build_context, format_comments};
pub use parse::{extract_first_json_object, parse_scenarios};
pub use prompts::{TaskKind, classify_task};
