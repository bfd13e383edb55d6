use strata_core::config::*;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = StrataConfig::from_toml("").unwrap();

    assert_eq!(config.storage.db_path, "strata.db");
    assert!(config.storage.wal_mode);
    assert_eq!(config.storage.busy_timeout_ms, 5_000);
    assert_eq!(config.storage.read_pool_size, 4);

    assert_eq!(config.hierarchy.max_traversal_depth, 10);

    assert_eq!(config.routing.confidence_threshold, 0.5);
    assert_eq!(config.routing.custom_rule_confidence, 0.95);
    assert_eq!(config.routing.default_confidence, 0.9);
    assert_eq!(config.routing.similarity_timeout_ms, 3_000);
    assert_eq!(config.routing.quick_task_max_hours, 0.1);
    assert_eq!(config.routing.confidences.quick_task, 0.9);
    assert_eq!(config.routing.confidences.generic_fallback, 0.45);
    assert_eq!(config.routing.urgency_keywords.get("urgent"), Some(&0.5));

    assert_eq!(config.embedding.provider, "tfidf");
    assert_eq!(config.embedding.dimensions, 256);
    assert_eq!(config.embedding.worker_threads, 2);
    assert_eq!(config.embedding.max_pending, 16);

    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[storage]
db_path = "/custom/strata.db"

[routing]
confidence_threshold = 0.6

[routing.confidences]
quick_task = 0.8
"#;
    let config = StrataConfig::from_toml(toml).unwrap();
    assert_eq!(config.storage.db_path, "/custom/strata.db");
    assert!(config.storage.wal_mode);
    assert_eq!(config.routing.confidence_threshold, 0.6);
    assert_eq!(config.routing.confidences.quick_task, 0.8);
    assert_eq!(config.routing.confidences.urgent, 0.85);
}

#[test]
fn config_rejects_threshold_outside_unit_interval() {
    let err = StrataConfig::from_toml("[routing]\nconfidence_threshold = 1.5\n").unwrap_err();
    assert!(err.to_string().contains("confidence_threshold"));
}

#[test]
fn config_rejects_zero_traversal_depth() {
    assert!(StrataConfig::from_toml("[hierarchy]\nmax_traversal_depth = 0\n").is_err());
}

#[test]
fn config_rejects_unbounded_or_empty_embedding_workers() {
    let err = StrataConfig::from_toml("[embedding]\nworker_threads = 0\n").unwrap_err();
    assert!(err.to_string().contains("embedding.worker_threads"));
    let err = StrataConfig::from_toml("[embedding]\nmax_pending = 0\n").unwrap_err();
    assert!(err.to_string().contains("embedding.max_pending"));
}

#[test]
fn config_rejects_malformed_toml() {
    assert!(StrataConfig::from_toml("[storage\n").is_err());
}

#[test]
fn config_survives_toml_roundtrip() {
    let config = StrataConfig::default();
    let text = config.to_toml().unwrap();
    let back = StrataConfig::from_toml(&text).unwrap();
    assert_eq!(back.routing.similarity_top_k, config.routing.similarity_top_k);
    assert_eq!(back.routing.urgency_keywords, config.routing.urgency_keywords);
}

#[test]
fn config_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strata.toml");
    std::fs::write(&path, "[embedding]\ndimensions = 64\n").unwrap();
    let config = StrataConfig::from_file(&path).unwrap();
    assert_eq!(config.embedding.dimensions, 64);
}

#[test]
fn config_from_missing_file_is_config_error() {
    let err = StrataConfig::from_file(std::path::Path::new("/nonexistent/strata.toml")).unwrap_err();
    assert!(matches!(err, strata_core::StrataError::ConfigError(_)));
}
