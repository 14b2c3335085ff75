use doh_relay_domain::UpstreamConfig;
use doh_relay_infrastructure::doh::EndpointResolver;
use std::net::IpAddr;
use std::sync::Arc;

#[tokio::test]
async fn test_static_addresses_returned_verbatim() {
    let config = UpstreamConfig {
        endpoint_ips: vec!["8.8.8.8".parse().unwrap(), "8.8.4.4".parse().unwrap()],
        // Pointing lookups at a black hole proves none happen.
        dns_servers: vec!["192.0.2.1".to_string()],
        bootstrap_timeout_ms: 50,
        ..Default::default()
    };

    let resolver = EndpointResolver::new("dns.google", 443, &config).unwrap();
    let addrs = resolver.resolve().await.unwrap();

    let expected: Vec<IpAddr> = vec!["8.8.8.8".parse().unwrap(), "8.8.4.4".parse().unwrap()];
    assert_eq!(*addrs, expected);
}

#[tokio::test]
async fn test_system_lookup_is_cached() {
    // localhost resolves without any network, exercising the system path.
    let config = UpstreamConfig::default();
    let resolver = EndpointResolver::new("localhost", 443, &config).unwrap();

    let first = resolver.resolve().await.unwrap();
    let second = resolver.resolve().await.unwrap();

    assert!(!first.is_empty());
    assert!(
        Arc::ptr_eq(&first, &second),
        "second call must observe the cached set, not a fresh lookup"
    );
}

#[tokio::test]
async fn test_concurrent_first_use_yields_one_shared_set() {
    let config = UpstreamConfig::default();
    let resolver = Arc::new(EndpointResolver::new("localhost", 443, &config).unwrap());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve().await.unwrap() })
        })
        .collect();

    let mut sets = Vec::new();
    for task in tasks {
        sets.push(task.await.unwrap());
    }

    for set in &sets[1..] {
        assert_eq!(**set, *sets[0], "all concurrent callers see the same set");
    }
}

#[tokio::test]
async fn test_unreachable_bootstrap_servers_fail_closed() {
    let config = UpstreamConfig {
        // TEST-NET-1, nothing listens there.
        dns_servers: vec!["192.0.2.1".to_string(), "192.0.2.2:5353".to_string()],
        bootstrap_timeout_ms: 100,
        ..Default::default()
    };

    let resolver = EndpointResolver::new("dns.google", 443, &config).unwrap();
    let err = resolver.resolve().await.unwrap_err();

    assert!(matches!(
        err,
        doh_relay_domain::RelayError::EndpointUnresolvable(_)
    ));
}

#[test]
fn test_invalid_bootstrap_server_rejected_at_construction() {
    let config = UpstreamConfig {
        dns_servers: vec!["not-an-ip".to_string()],
        ..Default::default()
    };

    assert!(EndpointResolver::new("dns.google", 443, &config).is_err());
}
