use crate::errors::StrataResult;
use crate::models::{Context, Entity, Priority};

/// Applies rule actions. One method per action type; each returns an output
/// document recorded in the action outcome.
pub trait ActionExecutor: Send + Sync {
    fn move_to_stream(&self, entity: &Entity, stream_id: &str) -> StrataResult<serde_json::Value>;
    fn assign_context(&self, entity: &Entity, context: Context) -> StrataResult<serde_json::Value>;
    fn set_priority(&self, entity: &Entity, priority: Priority) -> StrataResult<serde_json::Value>;
    fn create_task(
        &self,
        entity: &Entity,
        config: &serde_json::Value,
    ) -> StrataResult<serde_json::Value>;
    fn create_project(
        &self,
        entity: &Entity,
        config: &serde_json::Value,
    ) -> StrataResult<serde_json::Value>;
    fn send_notification(
        &self,
        entity: &Entity,
        config: &serde_json::Value,
    ) -> StrataResult<serde_json::Value>;
}

/// Outbound notification delivery.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, channel: &str, message: &str, entity_id: &str) -> StrataResult<()>;
}
