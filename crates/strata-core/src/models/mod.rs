pub mod audit;
pub mod entity;
pub mod placement;
pub mod relation;
pub mod routing;
pub mod rule;
pub mod signals;
pub mod stream;

pub use audit::{AuditEntry, AuditOperation};
pub use entity::{Contact, Deal, Entity, Message, ResourceType, Task};
pub use placement::{DerivedEntity, DerivedKind, Placement};
pub use relation::{InheritanceRule, Permission, Relation, RelationType};
pub use routing::{RoutingResult, RoutingStage, SuggestedAction};
pub use rule::{
    ActionOutcome, ActionType, Condition, ConditionOperator, ExecutionState, Rule, RuleAction,
    RuleExecutionRecord,
};
pub use signals::{Context, EnergyLevel, Priority};
pub use stream::{type_tags, NewStream, Stream, StreamRole, StreamStatus};
