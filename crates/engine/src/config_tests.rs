use super::*;

#[test]
fn defaults_are_sane() {
    let config = KernelConfig::default();
    assert!(config.port_range.0 < config.port_range.1);
    assert!(config.claim_retries > 0);
    assert!(config.staleness.stale_after_ms < config.staleness.dead_after_ms);
    assert_eq!(config.max_payload_bytes, 10 * 1024);
}

#[test]
fn port_allowed_respects_range_and_reserved() {
    let config = KernelConfig {
        port_range: (4000, 4010),
        reserved_ports: vec![4005],
        ..Default::default()
    };
    assert!(config.port_allowed(4000));
    assert!(config.port_allowed(4010));
    assert!(!config.port_allowed(3999));
    assert!(!config.port_allowed(4011));
    assert!(!config.port_allowed(4005));
}
