//! # strata-rules
//!
//! One rule engine for every call site. Conditions are evaluated over an
//! entity's field map; actions are dispatched through an [`ActionExecutor`].
//!
//! [`ActionExecutor`]: strata_core::traits::ActionExecutor

pub mod accessor;
pub mod conditions;
pub mod engine;
pub mod executor;
pub mod report;
pub mod validation;

pub use accessor::FieldError;
pub use conditions::{ConditionEvaluator, ConditionResult, RuleEvaluation};
pub use engine::RuleEngine;
pub use executor::{StoreActionExecutor, TracingNotificationSink};
pub use report::{DryRunReport, RuleExecution, RuleRunReport};
pub use validation::validate_rule;
