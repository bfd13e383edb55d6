//! Per-resource-type routing policy.
//!
//! Maps an entity and its signals to the structural role it belongs under
//! and a confidence. Resolving the role to an actual stream (and falling
//! back when it is missing) is the router's job.

use chrono::Utc;
use strata_core::config::RoutingConfig;
use strata_core::models::{Contact, Deal, Entity, Message, Priority, StreamRole, Task};

use crate::signals::{NormalizedText, Signals};

const WAITING_PHRASES: &[&str] = &[
    "waiting for",
    "waiting on",
    "awaiting",
    "follow up",
    "pending reply",
    "get back to",
    "delegated",
];
const SOMEDAY_PHRASES: &[&str] = &["someday", "maybe", "eventually", "one day", "nice to have", "idea"];
const PROJECT_PHRASES: &[&str] = &["project", "plan", "launch", "initiative", "roadmap", "migrate"];
const ACTION_PHRASES: &[&str] = &[
    "please",
    "can you",
    "could you",
    "action required",
    "request",
    "need you",
    "let me know",
];
const REFERENCE_PHRASES: &[&str] = &[
    "fyi",
    "for your information",
    "newsletter",
    "receipt",
    "documentation",
    "no action",
];

/// Where the policy wants an entity to go.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyMatch {
    pub role: StreamRole,
    pub confidence: f64,
    pub reason: String,
}

impl PolicyMatch {
    fn new(role: StreamRole, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            role,
            confidence,
            reason: reason.into(),
        }
    }
}

/// `None` when no branch of the entity's policy applies.
pub fn classify(entity: &Entity, signals: &Signals, config: &RoutingConfig) -> Option<PolicyMatch> {
    let text = NormalizedText::new(&entity.text());
    match entity {
        Entity::Task(task) => classify_task(task, &text, signals, config),
        Entity::Message(message) => classify_message(message, &text, signals, config),
        Entity::Contact(contact) => Some(classify_contact(contact, config)),
        Entity::Deal(deal) => classify_deal(deal, config),
    }
}

fn classify_task(
    task: &Task,
    text: &NormalizedText,
    signals: &Signals,
    config: &RoutingConfig,
) -> Option<PolicyMatch> {
    let c = &config.confidences;
    if let Some(hours) = task.estimated_hours {
        if hours <= config.quick_task_max_hours {
            return Some(PolicyMatch::new(
                StreamRole::NextActions,
                c.quick_task,
                format!("quick task ({hours}h <= {}h)", config.quick_task_max_hours),
            ));
        }
    }
    if signals.urgency >= config.urgent_threshold || task.priority == Some(Priority::Urgent) {
        return Some(PolicyMatch::new(
            StreamRole::NextActions,
            c.urgent,
            format!("urgent task (urgency {:.2})", signals.urgency),
        ));
    }
    if text.has_any(WAITING_PHRASES) {
        return Some(PolicyMatch::new(StreamRole::WaitingFor, c.waiting_for, "waiting-for language"));
    }
    if text.has_any(SOMEDAY_PHRASES) {
        return Some(PolicyMatch::new(StreamRole::SomedayMaybe, c.someday, "someday language"));
    }
    let long = task
        .estimated_hours
        .is_some_and(|h| h > config.long_task_min_hours);
    if long || text.has_any(PROJECT_PHRASES) {
        return Some(PolicyMatch::new(
            StreamRole::Projects,
            c.project,
            if long { "multi-session task" } else { "project language" },
        ));
    }
    None
}

fn classify_message(
    _message: &Message,
    text: &NormalizedText,
    signals: &Signals,
    config: &RoutingConfig,
) -> Option<PolicyMatch> {
    let c = &config.confidences;
    if signals.urgency >= config.urgent_threshold {
        return Some(PolicyMatch::new(
            StreamRole::NextActions,
            c.urgent,
            format!("urgent message (urgency {:.2})", signals.urgency),
        ));
    }
    if text.has_any(WAITING_PHRASES) {
        return Some(PolicyMatch::new(
            StreamRole::WaitingFor,
            c.waiting_for,
            "waiting-for language in message",
        ));
    }
    if text.has_any(REFERENCE_PHRASES) {
        return Some(PolicyMatch::new(StreamRole::Reference, c.reference, "informational message"));
    }
    if text.has_any(ACTION_PHRASES) {
        return Some(PolicyMatch::new(
            StreamRole::NextActions,
            c.actionable_message,
            "actionable request",
        ));
    }
    None
}

fn classify_contact(contact: &Contact, config: &RoutingConfig) -> PolicyMatch {
    let c = &config.confidences;
    match contact.company.as_deref().map(str::trim) {
        Some(company) if !company.is_empty() => PolicyMatch::new(
            StreamRole::Areas,
            c.contact_area,
            format!("business contact at {company}"),
        ),
        _ => PolicyMatch::new(StreamRole::Reference, c.contact_reference, "personal contact"),
    }
}

fn classify_deal(deal: &Deal, config: &RoutingConfig) -> Option<PolicyMatch> {
    let c = &config.confidences;
    if let Some(value) = deal.value.filter(|v| *v >= config.high_value_deal) {
        return Some(PolicyMatch::new(
            StreamRole::Projects,
            c.priority_deal,
            format!("high-value deal ({value})"),
        ));
    }
    if near_close(deal, config) {
        return Some(PolicyMatch::new(StreamRole::Projects, c.priority_deal, "deal near close"));
    }
    if deal.stage.is_some() || deal.probability.is_some() {
        return Some(PolicyMatch::new(
            StreamRole::NextActions,
            c.pipeline_deal,
            "open pipeline deal needs a next step",
        ));
    }
    None
}

/// Likely to win and closing within the configured window.
pub(crate) fn near_close(deal: &Deal, config: &RoutingConfig) -> bool {
    let likely = deal
        .probability
        .is_some_and(|p| p >= config.deal_high_probability);
    let soon = deal.expected_close_date.is_some_and(|close| {
        let days = (close - Utc::now()).num_days();
        (0..=config.deal_close_window_days).contains(&days)
    });
    likely && soon
}
