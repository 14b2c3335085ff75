use doh_relay_domain::config::{CliOverrides, Config};

#[test]
fn test_defaults() {
    let config = Config::default();

    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.server.port, 5300);
    assert!(config.server.udp);
    assert!(config.server.tcp);

    assert_eq!(config.upstream.endpoint, "https://dns.google/resolve");
    assert!(config.upstream.endpoint_ips.is_empty());
    assert!(config.upstream.padding);
    assert!(config.upstream.verify_tls);

    assert_eq!(config.logging.level, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_toml_parse() {
    let toml = r#"
        [server]
        bind_address = "127.0.0.1"
        port = 5353
        tcp = false

        [upstream]
        endpoint = "https://dns.quad9.net:5053/dns-query"
        endpoint_ips = ["9.9.9.9", "2620:fe::fe"]
        dns_servers = ["8.8.8.8", "1.1.1.1:5353"]
        padding = false

        [logging]
        level = "debug"
    "#;

    let config: Config = toml::from_str(toml).unwrap();

    assert_eq!(config.server.bind_address, "127.0.0.1");
    assert_eq!(config.server.port, 5353);
    assert!(config.server.udp, "udp stays at its default");
    assert!(!config.server.tcp);

    assert_eq!(config.upstream.endpoint_ips.len(), 2);
    assert!(!config.upstream.padding);
    assert!(config.upstream.verify_tls, "verify_tls stays at its default");
    assert_eq!(config.logging.level, "debug");

    assert!(config.validate().is_ok());
}

#[test]
fn test_cli_overrides_take_precedence() {
    let overrides = CliOverrides {
        listen: Some(":9953".to_string()),
        endpoint: Some("https://doh.example/resolve".to_string()),
        endpoint_ips: vec!["203.0.113.7".parse().unwrap()],
        no_pad: true,
        insecure: true,
        log_level: Some("trace".to_string()),
        ..Default::default()
    };

    let config = Config::load(None, overrides).unwrap();

    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.server.port, 9953);
    assert_eq!(config.upstream.endpoint, "https://doh.example/resolve");
    assert_eq!(config.upstream.endpoint_ips.len(), 1);
    assert!(!config.upstream.padding);
    assert!(!config.upstream.verify_tls);
    assert_eq!(config.logging.level, "trace");
}

#[test]
fn test_invalid_listen_override_rejected() {
    let overrides = CliOverrides {
        listen: Some("nonsense".to_string()),
        ..Default::default()
    };

    assert!(Config::load(None, overrides).is_err());
}
