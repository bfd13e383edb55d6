//! HierarchyEngine against seeded in-memory storage.

use std::sync::Arc;

use serde_json::json;
use strata_core::config::HierarchyConfig;
use strata_core::models::*;
use strata_core::traits::IGraphStorage;
use strata_core::StrataError;
use strata_hierarchy::{HierarchyEngine, IntegrityScope, Violation};
use strata_storage::StorageEngine;
use test_fixtures::load_organization;

fn make_engine(org: &str) -> (Arc<StorageEngine>, HierarchyEngine) {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    load_organization(org).seed(storage.as_ref()).unwrap();
    let engine = HierarchyEngine::new(storage.clone(), HierarchyConfig::default()).unwrap();
    (storage, engine)
}

fn ids(nodes: &[strata_hierarchy::TraversalNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.stream_id.as_str()).collect()
}

fn edge_snapshot(storage: &StorageEngine) -> Vec<(String, String)> {
    let mut edges: Vec<(String, String)> = storage
        .active_relations()
        .unwrap()
        .into_iter()
        .map(|r| (r.parent_id, r.child_id))
        .collect();
    edges.sort();
    edges
}

// --- Traversal ---

#[test]
fn diamond_ancestors_are_nearest_first_and_unique() {
    let (_, engine) = make_engine("diamond");
    let ancestors = engine.get_ancestors("c", None).unwrap();
    assert_eq!(ids(&ancestors), vec!["b", "a", "d"]);
    assert_eq!(ancestors[0].depth, 1);
    assert!(ancestors[1..].iter().all(|n| n.depth == 2));
}

#[test]
fn diamond_descendants_list_each_node_once() {
    let (_, engine) = make_engine("diamond");
    assert_eq!(ids(&engine.get_descendants("a", None).unwrap()), vec!["b", "c"]);
    assert_eq!(ids(&engine.get_descendants("d", None).unwrap()), vec!["b", "e", "c"]);
}

#[test]
fn max_depth_limits_hops() {
    let (_, engine) = make_engine("diamond");
    assert_eq!(ids(&engine.get_ancestors("c", Some(1)).unwrap()), vec!["b"]);
    assert!(engine.get_descendants("a", Some(0)).unwrap().is_empty());
}

#[test]
fn traversal_of_unknown_stream_is_not_found() {
    let (_, engine) = make_engine("diamond");
    assert!(matches!(
        engine.get_ancestors("nope", None),
        Err(StrataError::NotFound { .. })
    ));
    assert!(matches!(engine.get_path("nope"), Err(StrataError::NotFound { .. })));
}

#[test]
fn path_follows_primary_parent() {
    let (_, engine) = make_engine("diamond");
    let path = engine.get_path("c").unwrap();
    assert_eq!(path.stream_ids, vec!["a", "b", "c"]);
    assert_eq!(path.breadcrumb, "A / B / C");
    assert_eq!(engine.primary_parent("b").unwrap().unwrap().id, "a");
}

#[test]
fn siblings_share_any_parent() {
    let (_, engine) = make_engine("diamond");
    let siblings: Vec<String> = engine
        .get_siblings("b")
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(siblings, vec!["e"]);
    assert!(engine.get_siblings("a").unwrap().is_empty());
}

#[test]
fn common_ancestor_includes_the_nodes_themselves() {
    let (_, engine) = make_engine("diamond");
    assert_eq!(engine.find_common_ancestor("c", "e").unwrap().unwrap().id, "d");
    assert_eq!(engine.find_common_ancestor("b", "c").unwrap().unwrap().id, "b");
    assert!(engine.find_common_ancestor("a", "e").unwrap().is_none());
}

// --- Moves and cycles ---

#[test]
fn move_under_descendant_is_rejected_without_change() {
    let (storage, engine) = make_engine("diamond");
    let before = edge_snapshot(&storage);
    let stats_before = engine.stats().unwrap();

    let err = engine.move_node("a", Some("c"), "admin").unwrap_err();
    assert!(matches!(err, StrataError::CycleDetected { .. }));
    let err = engine.move_node("b", Some("b"), "admin").unwrap_err();
    assert!(matches!(err, StrataError::CycleDetected { .. }));

    assert_eq!(edge_snapshot(&storage), before);
    assert_eq!(engine.stats().unwrap(), stats_before);
}

#[test]
fn move_replaces_every_parent_edge() {
    let (storage, engine) = make_engine("diamond");
    let relation = engine.move_node("b", Some("e"), "admin").unwrap().unwrap();
    assert_eq!(relation.parent_id, "e");

    let parents: Vec<String> = storage
        .parents_of("b")
        .unwrap()
        .into_iter()
        .map(|r| r.parent_id)
        .collect();
    assert_eq!(parents, vec!["e"]);
    assert_eq!(engine.get_path("c").unwrap().breadcrumb, "D / E / B / C");

    let audit = storage.audit_log("b").unwrap();
    assert_eq!(audit.last().unwrap().operation, AuditOperation::Move);
}

#[test]
fn move_to_root_detaches_all_parents() {
    let (_, engine) = make_engine("diamond");
    assert!(engine.move_node("b", None, "admin").unwrap().is_none());
    assert!(engine.get_ancestors("b", None).unwrap().is_empty());
    assert_eq!(engine.get_path("c").unwrap().breadcrumb, "B / C");
}

#[test]
fn attach_rejects_cycles_and_duplicates() {
    let (_, engine) = make_engine("diamond");
    let err = engine
        .attach("c", "a", RelationType::Owns, InheritanceRule::InheritDown, "admin")
        .unwrap_err();
    assert!(matches!(err, StrataError::CycleDetected { .. }));

    let err = engine
        .attach("a", "b", RelationType::Owns, InheritanceRule::InheritDown, "admin")
        .unwrap_err();
    assert_eq!(err.field_paths(), vec!["parentId"]);
}

#[test]
fn detach_removes_edge_from_arena_and_store() {
    let (storage, engine) = make_engine("diamond");
    assert_eq!(engine.detach("d", "b", "admin").unwrap(), 1);
    assert_eq!(ids(&engine.get_ancestors("b", None).unwrap()), vec!["a"]);
    assert_eq!(storage.parents_of("b").unwrap().len(), 1);
    assert!(matches!(
        engine.detach("d", "b", "admin"),
        Err(StrataError::NotFound { .. })
    ));
}

// --- Creation, role policy, deletion ---

#[test]
fn create_under_parent_links_and_persists() {
    let (storage, engine) = make_engine("acme");
    let stream = engine
        .create_stream(
            NewStream::new("org-acme", "Mobile app").with_type_tag("PROJECT"),
            Some("acme-projects"),
            "admin",
        )
        .unwrap();
    assert!(storage.get_stream(&stream.id).unwrap().is_some());
    assert_eq!(
        engine.get_path(&stream.id).unwrap().breadcrumb,
        "Acme / Projects / Mobile app"
    );
}

#[test]
fn role_policy_rejects_bad_placement() {
    let (storage, engine) = make_engine("acme");
    let before = storage.list_streams(Some("org-acme")).unwrap().len();

    let err = engine
        .create_stream(NewStream::new("org-acme", "Errands"), Some("acme-contexts"), "admin")
        .unwrap_err();
    assert_eq!(err.field_paths(), vec!["typeTag"]);

    let err = engine
        .create_stream(
            NewStream::new("org-acme", "Second inbox").with_role(StreamRole::Inbox),
            Some("acme-next"),
            "admin",
        )
        .unwrap_err();
    assert_eq!(err.field_paths(), vec!["role"]);

    let err = engine
        .create_stream(
            NewStream::new("org-acme", "Odd")
                .with_role(StreamRole::Projects)
                .with_type_tag("PROJECT"),
            None,
            "admin",
        )
        .unwrap_err();
    assert_eq!(err.field_paths(), vec!["typeTag"]);

    assert_eq!(storage.list_streams(Some("org-acme")).unwrap().len(), before);
}

#[test]
fn delete_with_active_children_is_rejected() {
    let (storage, engine) = make_engine("acme");
    let err = engine.delete_stream("acme-areas", "admin").unwrap_err();
    assert!(matches!(err, StrataError::HasChildren { children: 1, .. }));
    assert!(storage.get_stream("acme-areas").unwrap().is_some());

    engine.delete_stream("acme-finance", "admin").unwrap();
    assert!(matches!(
        engine.get_stream("acme-finance"),
        Err(StrataError::NotFound { .. })
    ));
    engine.delete_stream("acme-areas", "admin").unwrap();
}

#[test]
fn delete_keeps_edge_history_in_the_audit_log() {
    let (storage, engine) = make_engine("acme");
    engine.move_node("acme-finance", Some("acme-root"), "admin").unwrap();
    engine.delete_stream("acme-finance", "admin").unwrap();

    let audit = storage.audit_log("acme-finance").unwrap();
    let delete = audit
        .iter()
        .find(|e| e.operation == AuditOperation::Delete)
        .unwrap();
    let relations = delete.details["relations"].as_array().unwrap();
    assert_eq!(relations.len(), 2);
    let parents: Vec<(&str, bool)> = relations
        .iter()
        .map(|r| (r["parentId"].as_str().unwrap(), r["active"].as_bool().unwrap()))
        .collect();
    assert!(parents.contains(&("acme-areas", false)));
    assert!(parents.contains(&("acme-root", true)));
}

// --- Freeze ---

#[test]
fn freeze_is_idempotent_and_skips_archived() {
    let (_, engine) = make_engine("acme");
    engine.archive_stream("acme-website", "admin").unwrap();

    let first = engine.freeze_subtree("acme-projects", "admin").unwrap();
    assert_eq!(first, vec!["acme-projects".to_string()]);
    let second = engine.freeze_subtree("acme-projects", "admin").unwrap();
    assert!(second.is_empty());

    assert_eq!(engine.get_stream("acme-projects").unwrap().status, StreamStatus::Frozen);
    assert_eq!(engine.get_stream("acme-website").unwrap().status, StreamStatus::Archived);
}

#[test]
fn unfreeze_reactivates_frozen_ancestors() {
    let (storage, engine) = make_engine("acme");
    let frozen = engine.freeze_subtree("acme-areas", "admin").unwrap();
    assert_eq!(frozen.len(), 2);

    let changed = engine.unfreeze_subtree("acme-finance", "admin").unwrap();
    assert_eq!(changed, vec!["acme-finance".to_string(), "acme-areas".to_string()]);
    assert_eq!(
        storage.get_stream("acme-areas").unwrap().unwrap().status,
        StreamStatus::Active
    );
    assert!(engine.unfreeze_subtree("acme-finance", "admin").unwrap().is_empty());
}

#[test]
fn stream_created_under_frozen_parent_starts_frozen() {
    let (storage, engine) = make_engine("acme");
    engine.freeze_subtree("acme-sales", "admin").unwrap();

    let child = engine
        .create_stream(NewStream::new("org-acme", "Renewals"), Some("acme-sales"), "admin")
        .unwrap();
    assert_eq!(child.status, StreamStatus::Frozen);
    assert_eq!(
        storage.get_stream(&child.id).unwrap().unwrap().status,
        StreamStatus::Frozen
    );

    let changed = engine.unfreeze_subtree(&child.id, "admin").unwrap();
    assert_eq!(changed, vec![child.id.clone(), "acme-sales".to_string()]);
}

#[test]
fn active_stream_cannot_join_a_frozen_parent() {
    let (storage, engine) = make_engine("acme");
    engine.freeze_subtree("acme-sales", "admin").unwrap();
    let before = edge_snapshot(&storage);

    let err = engine
        .move_node("acme-website", Some("acme-sales"), "admin")
        .unwrap_err();
    assert_eq!(err.field_paths(), vec!["parentId"]);

    let err = engine
        .attach(
            "acme-sales",
            "acme-inbox",
            RelationType::default(),
            InheritanceRule::default(),
            "admin",
        )
        .unwrap_err();
    assert_eq!(err.field_paths(), vec!["parentId"]);

    assert_eq!(edge_snapshot(&storage), before);
    assert_eq!(
        engine.primary_parent("acme-website").unwrap().unwrap().id,
        "acme-projects"
    );
}

#[test]
fn unfreeze_of_active_stream_changes_nothing() {
    let (storage, engine) = make_engine("acme");
    storage
        .set_statuses(&[("acme-areas".to_string(), StreamStatus::Frozen)])
        .unwrap();
    engine.hydrate().unwrap();

    assert!(engine.unfreeze_subtree("acme-finance", "admin").unwrap().is_empty());
    assert_eq!(engine.get_stream("acme-areas").unwrap().status, StreamStatus::Frozen);
    assert!(storage.audit_log("acme-finance").unwrap().is_empty());

    let report = engine
        .validate_hierarchy_integrity(&IntegrityScope::Organization("org-acme".into()))
        .unwrap();
    assert!(report.violations.iter().any(|v| matches!(
        v,
        Violation::ActiveUnderFrozen { parent_id, child_id }
            if parent_id == "acme-areas" && child_id == "acme-finance"
    )));
}

// --- Lookups and cache ---

#[test]
fn find_by_role_sees_changes_after_mutation() {
    let (_, engine) = make_engine("acme");
    let next = engine
        .find_by_role("org-acme", StreamRole::NextActions)
        .unwrap()
        .unwrap();
    assert_eq!(next.id, "acme-next");
    assert!(engine.find_by_role("org-acme", StreamRole::Custom).unwrap().is_none());

    let custom = engine
        .create_stream(
            NewStream::new("org-acme", "Board").with_role(StreamRole::Custom),
            Some("acme-root"),
            "admin",
        )
        .unwrap();
    assert_eq!(
        engine.find_by_role("org-acme", StreamRole::Custom).unwrap().unwrap().id,
        custom.id
    );
}

#[test]
fn cached_role_lookup_reflects_moves() {
    let (_, engine) = make_engine("acme");
    engine.find_by_role("org-acme", StreamRole::Reference).unwrap();
    engine.move_node("acme-reference", Some("acme-sales"), "admin").unwrap();
    let reference = engine
        .find_by_role("org-acme", StreamRole::Reference)
        .unwrap()
        .unwrap();
    assert_eq!(engine.get_path(&reference.id).unwrap().breadcrumb, "Acme / Sales pipeline / Reference");
}

#[test]
fn find_by_type_tag_is_case_insensitive() {
    let (_, engine) = make_engine("acme");
    let found = engine.find_by_type_tag("org-acme", "MESSAGES").unwrap().unwrap();
    assert_eq!(found.id, "acme-messages");
    assert!(engine.find_by_type_tag("org-acme", "deals").unwrap().is_none());
}

#[test]
fn inheritance_parent_skips_non_inheriting_edges() {
    let (_, engine) = make_engine("acme");
    assert!(engine.inheritance_parent("acme-messages").unwrap().is_none());
    assert_eq!(
        engine.inheritance_parent("acme-finance").unwrap().unwrap().id,
        "acme-areas"
    );
}

// --- Integrity and permissions ---

#[test]
fn seeded_organizations_are_clean() {
    let (_, engine) = make_engine("acme");
    let report = engine
        .validate_hierarchy_integrity(&IntegrityScope::Organization("org-acme".into()))
        .unwrap();
    assert!(report.is_clean(), "{:?}", report.violations);
    assert_eq!(report.checked_streams, 15);
}

#[test]
fn integrity_reports_orphans_and_policy_breaks() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let contexts = NewStream::new("org-x", "Contexts")
        .with_role(StreamRole::Contexts)
        .into_stream();
    let stray = NewStream::new("org-x", "Stray").into_stream();
    let orphan = NewStream::new("org-x", "@home").with_type_tag("CONTEXT").into_stream();
    for s in [&contexts, &stray, &orphan] {
        storage.create_stream(s).unwrap();
    }
    storage
        .add_relation(&Relation::new(&contexts.id, &stray.id, "import"))
        .unwrap();

    let engine = HierarchyEngine::new(storage.clone(), HierarchyConfig::default()).unwrap();
    let report = engine.validate_hierarchy_integrity(&IntegrityScope::All).unwrap();
    assert_eq!(report.violations.len(), 2);
    assert!(report.violations.iter().any(|v| matches!(
        v,
        Violation::Orphan { stream_id, .. } if *stream_id == orphan.id
    )));
    assert!(report.violations.iter().any(|v| matches!(
        v,
        Violation::ChildPolicy { child_id, .. } if *child_id == stray.id
    )));

    let scoped = engine
        .validate_hierarchy_integrity(&IntegrityScope::Subtree(orphan.id.clone()))
        .unwrap();
    assert_eq!(scoped.checked_streams, 1);
    assert_eq!(scoped.violations.len(), 1);
}

#[test]
fn permissions_are_open_by_default() {
    let (_, engine) = make_engine("diamond");
    assert!(engine.is_permitted("a->b", "tasks", "read").unwrap());
    engine
        .set_permission(
            "a->b",
            &Permission {
                data_scope: "tasks".into(),
                action: "read".into(),
                granted: false,
            },
        )
        .unwrap();
    assert!(!engine.is_permitted("a->b", "tasks", "read").unwrap());
    assert!(engine.is_permitted("a->b", "tasks", "write").unwrap());
}

#[test]
fn replace_config_updates_arena_and_store() {
    let (storage, engine) = make_engine("diamond");
    engine.replace_config("e", json!({"maxItems": 5}), "admin").unwrap();
    assert_eq!(engine.get_stream("e").unwrap().config, json!({"maxItems": 5}));
    assert_eq!(storage.get_stream("e").unwrap().unwrap().config, json!({"maxItems": 5}));
}

#[test]
fn hydrate_picks_up_external_writes() {
    let (storage, engine) = make_engine("diamond");
    let extra = NewStream::new("org-diamond", "F").into_stream();
    storage.create_stream(&extra).unwrap();
    storage.add_relation(&Relation::new("e", &extra.id, "import")).unwrap();
    assert!(engine.get_stream(&extra.id).is_err());

    engine.hydrate().unwrap();
    assert_eq!(ids(&engine.get_ancestors(&extra.id, None).unwrap()), vec!["e", "d"]);
    assert_eq!(engine.stats().unwrap().streams, 6);
}
