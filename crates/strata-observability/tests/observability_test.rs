use strata_core::config::ObservabilityConfig;
use strata_observability::{events, init_tracing_from_config};

#[test]
fn second_init_reports_existing_subscriber() {
    let config = ObservabilityConfig {
        log_level: "debug".to_string(),
        json_output: false,
    };
    let first = init_tracing_from_config(&config);
    let second = init_tracing_from_config(&config);
    assert!(first);
    assert!(!second);

    // Events must not panic with or without optional fields.
    events::stream_moved("s1", 1, None, "admin");
    events::routing_decided("e1", "s1", "DEFAULT", 0.9, true);
    events::similarity_degraded("e1", "timeout after 3000ms");
}
