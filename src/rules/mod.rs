pub mod config;
pub mod validate;
pub mod views;

pub use config::{
    load_embedded_rules, load_rules, Audit, AutomationRule, EvaluatorCode, RuleKind, RulesFile,
};
pub use validate::{ValidationError, Violation};
pub use views::{PublicRule, WriteRule};
