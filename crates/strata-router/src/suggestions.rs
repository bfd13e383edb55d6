//! Follow-up actions derived from a decision. The router only suggests them.

use serde_json::json;
use strata_core::config::RoutingConfig;
use strata_core::models::{ActionType, Entity, Priority, Rule, SuggestedAction};

use crate::policy::near_close;
use crate::signals::{NormalizedText, Signals};

const REPLY_PHRASES: &[&str] = &["please", "can you", "could you", "let me know", "reply", "respond"];

pub fn suggest(
    entity: &Entity,
    signals: &Signals,
    rule: Option<&Rule>,
    config: &RoutingConfig,
) -> Vec<SuggestedAction> {
    let mut out = Vec::new();

    // Everything the winning rule would do besides the move itself.
    if let Some(rule) = rule {
        for action in rule
            .actions
            .iter()
            .filter(|a| a.action_type != ActionType::MoveToStream)
        {
            out.push(SuggestedAction {
                action_type: action.action_type,
                config: action.config.clone(),
                reason: format!("rule \"{}\"", rule.name),
            });
        }
    }

    let current_priority = match entity {
        Entity::Task(t) => t.priority,
        _ => None,
    };
    if signals.urgency >= config.urgent_threshold
        && current_priority.map_or(true, |p| p < Priority::High)
        && !has(&out, ActionType::SetPriority)
    {
        out.push(SuggestedAction {
            action_type: ActionType::SetPriority,
            config: json!({ "priority": Priority::High.as_str() }),
            reason: format!("urgency {:.2}", signals.urgency),
        });
    }

    if signals.context_matched && !has(&out, ActionType::AssignContext) {
        out.push(SuggestedAction {
            action_type: ActionType::AssignContext,
            config: json!({ "context": signals.context.as_str() }),
            reason: "context keywords".to_string(),
        });
    }

    match entity {
        Entity::Message(m) if NormalizedText::new(&entity.text()).has_any(REPLY_PHRASES) => {
            out.push(SuggestedAction {
                action_type: ActionType::CreateTask,
                config: json!({ "title": format!("Reply: {}", m.subject) }),
                reason: "message asks for a response".to_string(),
            });
        }
        Entity::Deal(d) if d.value.is_some_and(|v| v >= config.high_value_deal) || near_close(d, config) => {
            out.push(SuggestedAction {
                action_type: ActionType::CreateProject,
                config: json!({ "title": format!("Close: {}", d.title) }),
                reason: "priority deal".to_string(),
            });
        }
        _ => {}
    }

    out
}

fn has(actions: &[SuggestedAction], action_type: ActionType) -> bool {
    actions.iter().any(|a| a.action_type == action_type)
}
