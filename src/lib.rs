//! dragnet: declarative automation rules that judge observability trace
//! records, with an LLM-as-judge pipeline as the flagship evaluator kind.

pub mod checks;
pub mod embedded_rules;
pub mod judge;
pub mod logger;
pub mod output;
pub mod registry;
pub mod rules;
pub mod types;
