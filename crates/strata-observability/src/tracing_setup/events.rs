//! Structured log events for hierarchy mutations, rule firings, and routing.
//!
//! Each function emits a `tracing` event with an `event` field naming it.

pub fn stream_created(stream_id: &str, organization_id: &str, role: Option<&str>) {
    tracing::info!(
        event = "stream_created",
        stream_id = %stream_id,
        organization_id = %organization_id,
        role = role.unwrap_or("-"),
        "stream created"
    );
}

pub fn stream_moved(stream_id: &str, old_parents: usize, new_parent: Option<&str>, actor: &str) {
    tracing::info!(
        event = "stream_moved",
        stream_id = %stream_id,
        old_parents = old_parents,
        new_parent = new_parent.unwrap_or("<root>"),
        actor = %actor,
        "stream moved"
    );
}

pub fn cycle_rejected(parent_id: &str, child_id: &str) {
    tracing::warn!(
        event = "cycle_rejected",
        parent_id = %parent_id,
        child_id = %child_id,
        "edge rejected: would create a cycle"
    );
}

pub fn subtree_frozen(root_id: &str, changed: usize) {
    tracing::info!(
        event = "subtree_frozen",
        root_id = %root_id,
        changed = changed,
        "subtree frozen"
    );
}

pub fn subtree_unfrozen(root_id: &str, changed: usize) {
    tracing::info!(
        event = "subtree_unfrozen",
        root_id = %root_id,
        changed = changed,
        "stream and frozen ancestors reactivated"
    );
}

pub fn rule_fired(rule_id: &str, entity_id: &str, state: &str, success: bool) {
    tracing::info!(
        event = "rule_fired",
        rule_id = %rule_id,
        entity_id = %entity_id,
        state = %state,
        success = success,
        "rule fired"
    );
}

pub fn routing_decided(entity_id: &str, target_stream_id: &str, stage: &str, confidence: f64, fallback_used: bool) {
    tracing::info!(
        event = "routing_decided",
        entity_id = %entity_id,
        target_stream_id = %target_stream_id,
        stage = %stage,
        confidence = confidence,
        fallback_used = fallback_used,
        "routing decided"
    );
}

pub fn similarity_degraded(entity_id: &str, reason: &str) {
    tracing::warn!(
        event = "similarity_degraded",
        entity_id = %entity_id,
        reason = %reason,
        "similarity stage skipped"
    );
}

pub fn embedding_fallback(primary: &str, fallback: &str, reason: &str) {
    tracing::warn!(
        event = "embedding_fallback",
        primary = %primary,
        fallback = %fallback,
        reason = %reason,
        "embedding provider fell back"
    );
}
