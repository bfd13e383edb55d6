//! Default action executor: writes placements and derived items to storage
//! and hands notifications to a [`NotificationSink`].

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use strata_core::errors::{StrataError, StrataResult};
use strata_core::models::{Context, DerivedEntity, DerivedKind, Entity, Placement, Priority};
use strata_core::traits::{ActionExecutor, IGraphStorage, IPlacementStorage, NotificationSink};

/// Channel used when a notification action names none.
const DEFAULT_CHANNEL: &str = "default";

pub struct StoreActionExecutor {
    graph: Arc<dyn IGraphStorage>,
    placements: Arc<dyn IPlacementStorage>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl StoreActionExecutor {
    pub fn new(graph: Arc<dyn IGraphStorage>, placements: Arc<dyn IPlacementStorage>) -> Self {
        Self {
            graph,
            placements,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    fn update_placement(
        &self,
        entity: &Entity,
        apply: impl FnOnce(&mut Placement),
    ) -> StrataResult<Placement> {
        let mut placement = self
            .placements
            .get_placement(entity.id())?
            .unwrap_or_else(|| Placement::empty(entity.id(), entity.resource_type()));
        apply(&mut placement);
        placement.updated_at = Utc::now();
        self.placements.upsert_placement(&placement)?;
        Ok(placement)
    }

    fn derive(&self, kind: DerivedKind, entity: &Entity, config: &Value) -> StrataResult<Value> {
        let template = config.get("title").and_then(Value::as_str).unwrap_or("{label}");
        let stream_id = config
            .get("streamId")
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(id) = &stream_id {
            self.require_active(id)?;
        }
        let derived = DerivedEntity {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            source_entity_id: entity.id().to_string(),
            stream_id,
            title: render(template, entity),
            created_at: Utc::now(),
        };
        self.placements.create_derived(&derived)?;
        Ok(json!({ "derivedId": derived.id, "kind": kind.as_str(), "title": derived.title }))
    }

    fn require_active(&self, stream_id: &str) -> StrataResult<()> {
        let stream = self
            .graph
            .get_stream(stream_id)?
            .ok_or_else(|| StrataError::not_found("stream", stream_id))?;
        if !stream.is_active() {
            return Err(StrataError::invalid(
                "streamId",
                format!("stream {stream_id} is {}", stream.status),
            ));
        }
        Ok(())
    }
}

/// Replace `{label}` and `{id}` with the entity's values.
fn render(template: &str, entity: &Entity) -> String {
    template
        .replace("{label}", entity.label())
        .replace("{id}", entity.id())
}

impl ActionExecutor for StoreActionExecutor {
    fn move_to_stream(&self, entity: &Entity, stream_id: &str) -> StrataResult<Value> {
        self.require_active(stream_id)?;
        let mut previous = None;
        self.update_placement(entity, |p| {
            previous = p.stream_id.replace(stream_id.to_string());
        })?;
        Ok(json!({ "streamId": stream_id, "previousStreamId": previous }))
    }

    fn assign_context(&self, entity: &Entity, context: Context) -> StrataResult<Value> {
        self.update_placement(entity, |p| p.context = Some(context))?;
        Ok(json!({ "context": context.as_str() }))
    }

    fn set_priority(&self, entity: &Entity, priority: Priority) -> StrataResult<Value> {
        self.update_placement(entity, |p| p.priority = Some(priority))?;
        Ok(json!({ "priority": priority.as_str() }))
    }

    fn create_task(&self, entity: &Entity, config: &Value) -> StrataResult<Value> {
        self.derive(DerivedKind::Task, entity, config)
    }

    fn create_project(&self, entity: &Entity, config: &Value) -> StrataResult<Value> {
        self.derive(DerivedKind::Project, entity, config)
    }

    fn send_notification(&self, entity: &Entity, config: &Value) -> StrataResult<Value> {
        let Some(sink) = &self.sink else {
            return Err(StrataError::ExternalServiceUnavailable {
                service: "notifications".to_string(),
                reason: "no notification sink configured".to_string(),
            });
        };
        let channel = config
            .get("channel")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_CHANNEL);
        let template = config.get("message").and_then(Value::as_str).unwrap_or("{label}");
        let message = render(template, entity);
        sink.deliver(channel, &message, entity.id())?;
        Ok(json!({ "channel": channel, "message": message }))
    }
}

/// Sink that only logs. Useful where delivery is handled downstream of the logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn deliver(&self, channel: &str, message: &str, entity_id: &str) -> StrataResult<()> {
        tracing::info!(
            event = "notification",
            channel = %channel,
            entity_id = %entity_id,
            message = %message,
            "notification queued"
        );
        Ok(())
    }
}
