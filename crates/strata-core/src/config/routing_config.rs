use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Confidence assigned by each heuristic routing branch.
///
/// These are policy defaults, tuned by hand. Organizations may override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfidences {
    pub quick_task: f64,
    pub urgent: f64,
    pub waiting_for: f64,
    pub someday: f64,
    pub project: f64,
    pub reference: f64,
    pub actionable_message: f64,
    pub contact_area: f64,
    pub contact_reference: f64,
    pub priority_deal: f64,
    pub pipeline_deal: f64,
    /// Role node missing; a generic node tagged for the resource type was used.
    pub generic_fallback: f64,
    /// Role node and generic node missing; the inbox was used.
    pub inbox_fallback: f64,
}

impl Default for HeuristicConfidences {
    fn default() -> Self {
        Self {
            quick_task: 0.9,
            urgent: 0.85,
            waiting_for: 0.8,
            someday: 0.75,
            project: 0.7,
            reference: 0.7,
            actionable_message: 0.6,
            contact_area: 0.6,
            contact_reference: 0.5,
            priority_deal: 0.85,
            pipeline_deal: 0.6,
            generic_fallback: 0.45,
            inbox_fallback: 0.4,
        }
    }
}

/// Content router configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Minimum confidence a stage must reach to stop the pipeline.
    pub confidence_threshold: f64,
    /// Confidence of a custom-rule decision.
    pub custom_rule_confidence: f64,
    /// Confidence of the default inbox decision.
    pub default_confidence: f64,
    /// Upper bound on a single embedding call during similarity search.
    pub similarity_timeout_ms: u64,
    /// Candidates fetched from the similarity index.
    pub similarity_top_k: usize,
    /// Tasks at or under this estimate are "quick" and go straight to next actions.
    pub quick_task_max_hours: f64,
    /// Tasks under this estimate are low-energy.
    pub short_task_max_hours: f64,
    /// Tasks over this estimate are high-energy, project-sized work.
    pub long_task_min_hours: f64,
    /// Urgency score at which an item is treated as urgent.
    pub urgent_threshold: f64,
    /// Deal value at which a deal is high-value.
    pub high_value_deal: f64,
    /// Days before expected close at which a deal is "near close".
    pub deal_close_window_days: i64,
    /// Win probability at which a deal is near close.
    pub deal_high_probability: f64,
    pub confidences: HeuristicConfidences,
    /// Keyword to urgency weight. Matched weights are summed and capped at 1.
    pub urgency_keywords: BTreeMap<String, f64>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: defaults::DEFAULT_CONFIDENCE_THRESHOLD,
            custom_rule_confidence: defaults::DEFAULT_CUSTOM_RULE_CONFIDENCE,
            default_confidence: defaults::DEFAULT_INBOX_CONFIDENCE,
            similarity_timeout_ms: defaults::DEFAULT_SIMILARITY_TIMEOUT_MS,
            similarity_top_k: defaults::DEFAULT_SIMILARITY_TOP_K,
            quick_task_max_hours: defaults::DEFAULT_QUICK_TASK_MAX_HOURS,
            short_task_max_hours: defaults::DEFAULT_SHORT_TASK_MAX_HOURS,
            long_task_min_hours: defaults::DEFAULT_LONG_TASK_MIN_HOURS,
            urgent_threshold: defaults::DEFAULT_URGENT_THRESHOLD,
            high_value_deal: defaults::DEFAULT_HIGH_VALUE_DEAL,
            deal_close_window_days: defaults::DEFAULT_DEAL_CLOSE_WINDOW_DAYS,
            deal_high_probability: defaults::DEFAULT_DEAL_HIGH_PROBABILITY,
            confidences: HeuristicConfidences::default(),
            urgency_keywords: defaults::DEFAULT_URGENCY_KEYWORDS
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect(),
        }
    }
}
