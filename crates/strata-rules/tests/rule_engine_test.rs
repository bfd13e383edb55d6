//! RuleEngine with the store-backed executor over seeded storage.

use std::sync::{Arc, Mutex};

use serde_json::json;
use strata_core::models::*;
use strata_core::traits::{IPlacementStorage, IRuleStorage, NotificationSink};
use strata_core::{StrataError, StrataResult};
use strata_rules::{RuleEngine, StoreActionExecutor};
use strata_storage::StorageEngine;
use test_fixtures::{load_fixture, load_organization};

#[derive(Default)]
struct RecordingSink {
    delivered: Mutex<Vec<(String, String, String)>>,
}

impl NotificationSink for RecordingSink {
    fn deliver(&self, channel: &str, message: &str, entity_id: &str) -> StrataResult<()> {
        self.delivered
            .lock()
            .unwrap()
            .push((channel.into(), message.into(), entity_id.into()));
        Ok(())
    }
}

struct Harness {
    storage: Arc<StorageEngine>,
    sink: Arc<RecordingSink>,
    engine: RuleEngine,
}

fn make_harness() -> Harness {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    load_organization("acme").seed(storage.as_ref()).unwrap();
    let sink = Arc::new(RecordingSink::default());
    let executor = StoreActionExecutor::new(storage.clone(), storage.clone()).with_sink(sink.clone());
    let engine = RuleEngine::new(storage.clone(), Arc::new(executor));
    Harness {
        storage,
        sink,
        engine,
    }
}

fn make_task(id: &str, title: &str) -> Entity {
    Entity::Task(Task {
        id: id.into(),
        title: title.into(),
        description: None,
        estimated_hours: None,
        priority: None,
        due_date: None,
    })
}

fn make_deal(id: &str, title: &str, value: f64) -> Entity {
    Entity::Deal(Deal {
        id: id.into(),
        title: title.into(),
        description: None,
        value: Some(value),
        stage: None,
        probability: None,
        expected_close_date: None,
    })
}

fn make_rule(id: &str, priority: i32, target: &str, stop: bool) -> Rule {
    let mut rule = Rule::new("org-acme", id);
    rule.id = id.into();
    rule.priority = priority;
    rule.stop_on_first_match = stop;
    rule.conditions = vec![Condition::new("title", ConditionOperator::Contains, json!("report"))];
    rule.actions = vec![RuleAction::new(ActionType::MoveToStream, json!({ "streamId": target }))];
    rule
}

fn placed_in(h: &Harness, entity_id: &str) -> Option<String> {
    h.storage
        .get_placement(entity_id)
        .unwrap()
        .and_then(|p| p.stream_id)
}

fn count(h: &Harness, rule_id: &str) -> u64 {
    h.storage.get_rule(rule_id).unwrap().unwrap().execution_count
}

#[test]
fn higher_priority_rule_with_stop_wins_alone() {
    let h = make_harness();
    h.engine.save_rule(&make_rule("r-low", 5, "acme-someday", false)).unwrap();
    h.engine.save_rule(&make_rule("r-high", 10, "acme-next", true)).unwrap();

    let report = h.engine.execute("org-acme", &make_task("t1", "Weekly report")).unwrap();
    assert_eq!(report.executions.len(), 1);
    assert_eq!(report.executions[0].rule_id, "r-high");
    assert_eq!(report.stopped_by.as_deref(), Some("r-high"));
    assert_eq!(placed_in(&h, "t1").as_deref(), Some("acme-next"));
    assert_eq!(count(&h, "r-high"), 1);
    assert_eq!(count(&h, "r-low"), 0);
}

#[test]
fn without_stop_every_matching_rule_runs_in_order() {
    let h = make_harness();
    h.engine.save_rule(&make_rule("r-low", 5, "acme-someday", false)).unwrap();
    h.engine.save_rule(&make_rule("r-high", 10, "acme-next", false)).unwrap();

    let report = h.engine.execute("org-acme", &make_task("t1", "Weekly report")).unwrap();
    let order: Vec<&str> = report.executions.iter().map(|e| e.rule_id.as_str()).collect();
    assert_eq!(order, vec!["r-high", "r-low"]);
    assert!(report.stopped_by.is_none());
    assert_eq!(placed_in(&h, "t1").as_deref(), Some("acme-someday"));
}

#[test]
fn equal_priority_ties_break_by_id() {
    let h = make_harness();
    h.engine.save_rule(&make_rule("r-b", 1, "acme-someday", false)).unwrap();
    h.engine.save_rule(&make_rule("r-a", 1, "acme-next", false)).unwrap();
    let report = h.engine.execute("org-acme", &make_task("t1", "report")).unwrap();
    assert_eq!(report.executions[0].rule_id, "r-a");
}

#[test]
fn failed_stop_rule_does_not_stop_the_pass() {
    let h = make_harness();
    h.engine.save_rule(&make_rule("r-high", 10, "no-such-stream", true)).unwrap();
    h.engine.save_rule(&make_rule("r-low", 5, "acme-someday", false)).unwrap();

    let report = h.engine.execute("org-acme", &make_task("t1", "report")).unwrap();
    assert_eq!(report.executions.len(), 2);
    assert_eq!(report.executions[0].state, ExecutionState::Failure);
    assert_eq!(placed_in(&h, "t1").as_deref(), Some("acme-someday"));
}

#[test]
fn total_failure_still_counts_once() {
    let h = make_harness();
    h.engine.save_rule(&make_rule("r-broken", 1, "no-such-stream", false)).unwrap();

    let report = h.engine.execute("org-acme", &make_task("t1", "report")).unwrap();
    let execution = &report.executions[0];
    assert_eq!(execution.state, ExecutionState::Failure);
    assert!(execution.outcomes[0].error.is_some());

    let rule = h.storage.get_rule("r-broken").unwrap().unwrap();
    assert_eq!(rule.execution_count, 1);
    assert!(rule.last_executed.is_some());
    let log = h.storage.executions_for("r-broken").unwrap();
    assert_eq!(log.len(), 1);
    assert!(!log[0].success);
}

#[test]
fn mixed_outcomes_are_partial_failure() {
    let h = make_harness();
    let mut rule = make_rule("r-mixed", 1, "acme-next", false);
    rule.actions.push(RuleAction::new(ActionType::MoveToStream, json!({"streamId": "gone"})));
    h.engine.save_rule(&rule).unwrap();

    let execution = h.engine.run_rule("r-mixed", &make_task("t1", "report")).unwrap();
    assert_eq!(execution.state, ExecutionState::PartialFailure);
    assert_eq!(
        execution.transitions,
        vec![
            ExecutionState::Pending,
            ExecutionState::ConditionsEvaluated,
            ExecutionState::ActionsRunning,
            ExecutionState::PartialFailure
        ]
    );
}

#[test]
fn unmatched_rule_is_skipped_and_not_counted() {
    let h = make_harness();
    h.engine.save_rule(&make_rule("r-1", 1, "acme-next", false)).unwrap();
    let report = h.engine.execute("org-acme", &make_task("t1", "Groceries")).unwrap();
    let execution = &report.executions[0];
    assert_eq!(execution.state, ExecutionState::Skipped);
    assert_eq!(execution.transitions.last(), Some(&ExecutionState::Skipped));
    assert_eq!(report.fired().count(), 0);
    assert_eq!(count(&h, "r-1"), 0);
    assert!(h.storage.executions_for("r-1").unwrap().is_empty());
}

#[test]
fn authored_rules_apply_by_resource_type() {
    let h = make_harness();
    let rules: Vec<Rule> = load_fixture("rules/acme_rules.json");
    for rule in &rules {
        h.engine.save_rule(rule).unwrap();
    }

    let report = h
        .engine
        .execute("org-acme", &make_task("t1", "Pay the Invoice from Globex"))
        .unwrap();
    assert_eq!(report.stopped_by.as_deref(), Some("rule-invoices"));
    let placement = h.storage.get_placement("t1").unwrap().unwrap();
    assert_eq!(placement.stream_id.as_deref(), Some("acme-finance"));
    assert_eq!(placement.priority, Some(Priority::High));

    let deal = make_deal("d1", "Initech renewal", 120_000.0);
    let report = h.engine.execute("org-acme", &deal).unwrap();
    assert_eq!(report.fired().count(), 1);
    assert_eq!(placed_in(&h, "d1").as_deref(), Some("acme-sales"));
    let delivered = h.sink.delivered.lock().unwrap().clone();
    assert_eq!(
        delivered,
        vec![("sales".to_string(), "Large deal: Initech renewal".to_string(), "d1".to_string())]
    );
}

#[test]
fn disabled_rules_only_run_explicitly() {
    let h = make_harness();
    let rules: Vec<Rule> = load_fixture("rules/acme_rules.json");
    for rule in &rules {
        h.engine.save_rule(rule).unwrap();
    }
    let task = make_task("t9", "Read article");
    assert_eq!(h.engine.execute("org-acme", &task).unwrap().fired().count(), 0);

    let execution = h.engine.run_rule("rule-disabled", &task).unwrap();
    assert!(execution.succeeded());
    assert_eq!(placed_in(&h, "t9").as_deref(), Some("acme-reference"));

    assert!(matches!(
        h.engine.run_rule("nope", &task),
        Err(StrataError::NotFound { .. })
    ));
}

#[test]
fn dry_run_writes_nothing() {
    let h = make_harness();
    let rule = make_rule("r-dry", 1, "acme-next", false);
    h.engine.save_rule(&rule).unwrap();

    let dry = h.engine.test_rule(&rule, &make_task("t1", "Sales report"));
    assert!(dry.applies && dry.satisfied);
    assert_eq!(dry.actions_to_run.len(), 1);
    assert_eq!(dry.conditions[0].actual, Some(json!("Sales report")));
    assert!(h.storage.get_placement("t1").unwrap().is_none());
    assert_eq!(count(&h, "r-dry"), 0);

    let miss = h.engine.test_rule(&rule, &make_task("t2", "Other"));
    assert!(!miss.satisfied);
    assert!(miss.actions_to_run.is_empty());
}

#[test]
fn batch_processes_each_entity() {
    let h = make_harness();
    h.engine.save_rule(&make_rule("r-1", 1, "acme-next", false)).unwrap();
    let entities: Vec<Entity> = (0..16)
        .map(|i| make_task(&format!("t{i}"), &format!("report {i}")))
        .collect();

    let reports = h.engine.execute_batch("org-acme", &entities);
    assert_eq!(reports.len(), 16);
    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.as_ref().unwrap().entity_id, format!("t{i}"));
    }
    assert_eq!(count(&h, "r-1"), 16);
}

#[test]
fn derived_items_and_missing_sink() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    load_organization("acme").seed(storage.as_ref()).unwrap();
    let executor = StoreActionExecutor::new(storage.clone(), storage.clone());
    let engine = RuleEngine::new(storage.clone(), Arc::new(executor));

    let mut rule = Rule::new("org-acme", "follow up");
    rule.actions = vec![
        RuleAction::new(ActionType::CreateTask, json!({"title": "Follow up: {label}", "streamId": "acme-next"})),
        RuleAction::new(ActionType::SendNotification, json!({"message": "hi"})),
    ];
    engine.save_rule(&rule).unwrap();

    let execution = engine.run_rule(&rule.id, &make_task("t1", "Lunch with Ana")).unwrap();
    assert_eq!(execution.state, ExecutionState::PartialFailure);
    let derived = storage.derived_from("t1").unwrap();
    assert_eq!(derived.len(), 1);
    assert_eq!(derived[0].title, "Follow up: Lunch with Ana");
    assert_eq!(derived[0].kind, DerivedKind::Task);
    assert!(execution.outcomes[1]
        .error
        .as_deref()
        .unwrap()
        .contains("notifications"));
}

#[test]
fn invalid_rule_is_not_saved() {
    let h = make_harness();
    let mut rule = make_rule("r-bad", 1, "acme-next", false);
    rule.conditions.push(Condition::new("value", ConditionOperator::In, json!(5)));
    let err = h.engine.save_rule(&rule).unwrap_err();
    assert_eq!(err.field_paths(), vec!["conditions[1].value"]);
    assert!(h.storage.get_rule("r-bad").unwrap().is_none());
}
