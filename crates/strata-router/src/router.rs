//! ContentRouter: custom rules → heuristics → similarity → default inbox.
//!
//! Stages run strictly in order for one entity. A stage wins when it
//! produces an active target at or above the confidence threshold. The best
//! below-threshold candidate is kept and only returned when the default stage
//! cannot resolve an inbox.

use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use strata_core::config::RoutingConfig;
use strata_core::constants::{MAX_BULK_BATCH_SIZE, SYSTEM_ACTOR};
use strata_core::errors::{StrataError, StrataResult};
use strata_core::models::{
    Entity, NewStream, Rule, RoutingResult, RoutingStage, Stream, StreamRole, StreamStatus,
};
use strata_core::traits::IRoutingLog;
use strata_embeddings::SimilarityIndex;
use strata_hierarchy::HierarchyEngine;
use strata_inheritance::ConfigInheritance;
use strata_observability::events;
use strata_rules::RuleEngine;
use tracing::{debug, warn};

use crate::options::RoutingOptions;
use crate::policy;
use crate::signals::{self, Signals};
use crate::suggestions;

/// A placement the pipeline settled on, before enrichment.
#[derive(Debug, Clone)]
struct Candidate {
    stream: Stream,
    confidence: f64,
    stage: RoutingStage,
    /// Rule that produced the candidate, for suggested actions.
    rule: Option<Rule>,
    /// The stage had to settle for a generic or inbox node.
    degraded: bool,
}

/// Reasoning trail plus the best candidate below the threshold.
struct Trail {
    threshold: f64,
    reasoning: Vec<String>,
    best_below: Option<Candidate>,
}

impl Trail {
    fn note(&mut self, line: String) {
        debug!(reason = %line, "routing");
        self.reasoning.push(line);
    }

    /// `Some` when the candidate clears the threshold; otherwise remembered.
    fn offer(&mut self, candidate: Candidate) -> Option<Candidate> {
        if candidate.confidence >= self.threshold {
            return Some(candidate);
        }
        self.note(format!(
            "{}: {} at {:.2} is below the threshold {:.2}",
            candidate.stage, candidate.stream.id, candidate.confidence, self.threshold
        ));
        let better = self
            .best_below
            .as_ref()
            .map_or(true, |b| candidate.confidence > b.confidence);
        if better {
            self.best_below = Some(candidate);
        }
        None
    }
}

pub struct ContentRouter {
    hierarchy: Arc<HierarchyEngine>,
    inheritance: ConfigInheritance,
    rules: Option<Arc<RuleEngine>>,
    similarity: Option<Arc<SimilarityIndex>>,
    log: Option<Arc<dyn IRoutingLog>>,
    config: RoutingConfig,
}

impl ContentRouter {
    pub fn new(hierarchy: Arc<HierarchyEngine>, config: RoutingConfig) -> Self {
        Self {
            inheritance: ConfigInheritance::new(Arc::clone(&hierarchy)),
            hierarchy,
            rules: None,
            similarity: None,
            log: None,
            config,
        }
    }

    pub fn with_rules(mut self, rules: Arc<RuleEngine>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_similarity(mut self, index: Arc<SimilarityIndex>) -> Self {
        self.similarity = Some(index);
        self
    }

    pub fn with_log(mut self, log: Arc<dyn IRoutingLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn with_inheritance(mut self, inheritance: ConfigInheritance) -> Self {
        self.inheritance = inheritance;
        self
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Decide where `entity` belongs. Nothing is moved.
    pub fn route(&self, entity: &Entity, options: &RoutingOptions) -> StrataResult<RoutingResult> {
        let threshold = options
            .confidence_threshold
            .unwrap_or(self.config.confidence_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(StrataError::invalid(
                "confidenceThreshold",
                format!("must be within [0, 1], got {threshold}"),
            ));
        }

        let org = options.organization_id.as_str();
        let signals = signals::analyze(entity, &self.config);
        let mut trail = Trail {
            threshold,
            reasoning: Vec::new(),
            best_below: None,
        };

        let mut winner = self.custom_rules(org, entity, &mut trail)?;
        if winner.is_none() {
            winner = self.heuristics(org, entity, &signals, &mut trail)?;
        }
        if winner.is_none() {
            winner = self.similarity(org, entity, options, &mut trail)?;
        }
        let winner = match winner {
            Some(w) => w,
            None => self.default_stage(org, options, &mut trail)?,
        };

        let result = self.finish(entity, winner, &signals, trail)?;
        events::routing_decided(
            &result.entity_id,
            &result.target_stream_id,
            result.stage.as_str(),
            result.confidence,
            result.fallback_used,
        );
        if options.record {
            self.record(org, &result);
        }
        Ok(result)
    }

    /// Route independent entities in parallel. Results keep input order.
    pub fn route_batch(
        &self,
        entities: &[Entity],
        options: &RoutingOptions,
    ) -> StrataResult<Vec<StrataResult<RoutingResult>>> {
        if entities.len() > MAX_BULK_BATCH_SIZE {
            return Err(StrataError::invalid(
                "entities",
                format!("at most {MAX_BULK_BATCH_SIZE} entities per batch, got {}", entities.len()),
            ));
        }
        Ok(entities
            .par_iter()
            .map(|entity| self.route(entity, options))
            .collect())
    }

    /// Previously recorded decisions for an entity, oldest first.
    pub fn history(&self, entity_id: &str) -> StrataResult<Vec<RoutingResult>> {
        match &self.log {
            Some(log) => log.routing_history(entity_id),
            None => Ok(Vec::new()),
        }
    }

    // --- Stages ---

    fn custom_rules(
        &self,
        org: &str,
        entity: &Entity,
        trail: &mut Trail,
    ) -> StrataResult<Option<Candidate>> {
        let Some(engine) = &self.rules else {
            trail.note("custom rules: no rule engine configured".to_string());
            return Ok(None);
        };
        let rules = engine.candidate_rules(org, entity)?;
        if rules.is_empty() {
            trail.note(format!("custom rules: none apply to {}", entity.resource_type()));
            return Ok(None);
        }

        for rule in rules {
            let evaluation = engine.evaluate(&rule, entity);
            if !evaluation.satisfied {
                continue;
            }
            let Some(target) = rule.move_target() else {
                trail.note(format!(
                    "custom rules: \"{}\" matched but moves nothing",
                    rule.name
                ));
                continue;
            };
            let Some(stream) = self.usable(org, target, trail, "custom rules")? else {
                continue;
            };
            trail.note(format!(
                "custom rules: \"{}\" ({}) matched, target {}",
                rule.name, rule.id, stream.name
            ));
            let candidate = Candidate {
                stream,
                confidence: self.config.custom_rule_confidence,
                stage: RoutingStage::CustomRule,
                rule: Some(rule),
                degraded: false,
            };
            return Ok(trail.offer(candidate));
        }
        trail.note("custom rules: no rule matched".to_string());
        Ok(None)
    }

    fn heuristics(
        &self,
        org: &str,
        entity: &Entity,
        signals: &Signals,
        trail: &mut Trail,
    ) -> StrataResult<Option<Candidate>> {
        let Some(matched) = policy::classify(entity, signals, &self.config) else {
            trail.note(format!(
                "heuristics: no {} policy branch applies",
                entity.resource_type()
            ));
            return Ok(None);
        };
        trail.note(format!(
            "heuristics: {} suggests {} at {:.2}",
            matched.reason, matched.role, matched.confidence
        ));

        if let Some(stream) = self.hierarchy.find_by_role(org, matched.role)? {
            if let Some(stream) = self.usable(org, &stream.id, trail, "heuristics")? {
                return Ok(trail.offer(Candidate {
                    stream,
                    confidence: matched.confidence,
                    stage: RoutingStage::Heuristic,
                    rule: None,
                    degraded: false,
                }));
            }
        } else {
            trail.note(format!("heuristics: no {} stream", matched.role));
        }

        let c = &self.config.confidences;
        let tag = entity.resource_type().default_type_tag();
        if let Some(stream) = self.hierarchy.find_by_type_tag(org, tag)? {
            if let Some(stream) = self.usable(org, &stream.id, trail, "heuristics")? {
                trail.note(format!("heuristics: fell back to generic '{tag}' stream {}", stream.name));
                return Ok(trail.offer(Candidate {
                    stream,
                    confidence: c.generic_fallback,
                    stage: RoutingStage::Heuristic,
                    rule: None,
                    degraded: true,
                }));
            }
        }
        if let Some(stream) = self.hierarchy.find_by_role(org, StreamRole::Inbox)? {
            if let Some(stream) = self.usable(org, &stream.id, trail, "heuristics")? {
                trail.note(format!("heuristics: no '{tag}' stream, fell back to the inbox"));
                return Ok(trail.offer(Candidate {
                    stream,
                    confidence: c.inbox_fallback,
                    stage: RoutingStage::Heuristic,
                    rule: None,
                    degraded: true,
                }));
            }
        }
        trail.note("heuristics: no fallback stream available".to_string());
        Ok(None)
    }

    fn similarity(
        &self,
        org: &str,
        entity: &Entity,
        options: &RoutingOptions,
        trail: &mut Trail,
    ) -> StrataResult<Option<Candidate>> {
        if !options.use_similarity {
            trail.note("similarity: disabled for this call".to_string());
            return Ok(None);
        }
        let Some(index) = &self.similarity else {
            trail.note("similarity: no index configured".to_string());
            return Ok(None);
        };
        let text = entity.text();
        if text.trim().is_empty() {
            trail.note("similarity: entity has no text".to_string());
            return Ok(None);
        }

        let timeout = Duration::from_millis(self.config.similarity_timeout_ms);
        let hits = match index.search(org, &text, self.config.similarity_top_k, timeout) {
            Ok(hits) => hits,
            Err(e) => {
                events::similarity_degraded(entity.id(), &e.to_string());
                trail.note(format!("similarity: unavailable ({e})"));
                return Ok(None);
            }
        };

        for hit in hits {
            let Some(stream) = self.usable(org, &hit.stream_id, trail, "similarity")? else {
                continue;
            };
            trail.note(format!(
                "similarity: closest stream {} scored {:.2}",
                stream.name, hit.score
            ));
            return Ok(trail.offer(Candidate {
                stream,
                confidence: hit.score.clamp(0.0, 1.0),
                stage: RoutingStage::Similarity,
                rule: None,
                degraded: false,
            }));
        }
        trail.note("similarity: no similar stream".to_string());
        Ok(None)
    }

    fn default_stage(
        &self,
        org: &str,
        options: &RoutingOptions,
        trail: &mut Trail,
    ) -> StrataResult<Candidate> {
        let inbox = match self.hierarchy.find_by_role(org, StreamRole::Inbox)? {
            Some(existing) => self.usable(org, &existing.id, trail, "default")?,
            None if options.create_stream_if_needed => {
                let stream = self.create_inbox(org)?;
                trail.note(format!("default: created inbox {}", stream.id));
                Some(stream)
            }
            None => {
                trail.note("default: organization has no inbox".to_string());
                None
            }
        };

        if let Some(stream) = inbox {
            trail.note(format!("default: inbox {} for human triage", stream.name));
            return Ok(Candidate {
                stream,
                confidence: self.config.default_confidence,
                stage: RoutingStage::Default,
                rule: None,
                degraded: true,
            });
        }
        match trail.best_below.take() {
            Some(candidate) => {
                trail.note(format!(
                    "default: settling for {} candidate {}",
                    candidate.stage, candidate.stream.id
                ));
                Ok(candidate)
            }
            None => Err(StrataError::not_found("inbox stream", org)),
        }
    }

    // --- Helpers ---

    /// The stream, if it exists in `org` and is ACTIVE. Rejections are noted.
    fn usable(
        &self,
        org: &str,
        stream_id: &str,
        trail: &mut Trail,
        stage: &str,
    ) -> StrataResult<Option<Stream>> {
        let stream = match self.hierarchy.get_stream(stream_id) {
            Ok(s) => s,
            Err(StrataError::NotFound { .. }) => {
                trail.note(format!("{stage}: target {stream_id} does not exist"));
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if stream.organization_id != org {
            trail.note(format!("{stage}: target {stream_id} belongs to another organization"));
            return Ok(None);
        }
        if !stream.is_active() {
            trail.note(format!("{stage}: target {} is {}", stream.id, stream.status));
            return Ok(None);
        }
        Ok(Some(stream))
    }

    /// New INBOX under the organization's oldest active role-less root, or top level.
    fn create_inbox(&self, org: &str) -> StrataResult<Stream> {
        let mut parent = None;
        for stream in self.hierarchy.streams_in(org)? {
            if stream.role.is_none()
                && stream.status == StreamStatus::Active
                && self.hierarchy.primary_parent(&stream.id)?.is_none()
            {
                parent = Some(stream.id);
                break;
            }
        }
        self.hierarchy.create_stream(
            NewStream::new(org, "Inbox").with_role(StreamRole::Inbox),
            parent.as_deref(),
            SYSTEM_ACTOR,
        )
    }

    fn finish(
        &self,
        entity: &Entity,
        winner: Candidate,
        signals: &Signals,
        mut trail: Trail,
    ) -> StrataResult<RoutingResult> {
        let path = self.hierarchy.get_path(&winner.stream.id)?;
        let target_config = self.inheritance.resolve(&winner.stream.id)?;
        let fallback_used = winner.degraded || winner.confidence < trail.threshold;
        trail.note(format!(
            "decision: {} via {} at {:.2}",
            path.breadcrumb, winner.stage, winner.confidence
        ));

        Ok(RoutingResult {
            entity_id: entity.id().to_string(),
            target_stream_id: winner.stream.id.clone(),
            target_stream_name: winner.stream.name.clone(),
            breadcrumb: path.breadcrumb,
            target_config,
            confidence: winner.confidence,
            stage: winner.stage,
            reasoning: trail.reasoning,
            fallback_used,
            suggested_context: Some(signals.context),
            suggested_energy: Some(signals.energy),
            urgency: signals.urgency,
            suggested_actions: suggestions::suggest(
                entity,
                signals,
                winner.rule.as_ref(),
                &self.config,
            ),
        })
    }

    fn record(&self, org: &str, result: &RoutingResult) {
        if let Some(log) = &self.log {
            if let Err(e) = log.append_routing(org, result) {
                warn!(entity_id = %result.entity_id, error = %e, "routing log append failed");
            }
        }
    }
}
